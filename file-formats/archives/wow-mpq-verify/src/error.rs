//! Error types for MPQ verification

use std::io;
use thiserror::Error;

/// Result type alias for verification operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while gathering the data needed for verification.
///
/// These never leave the public verification entry points directly: they are
/// folded into [`VerificationResult::VerifyFailed`](crate::VerificationResult)
/// or the matching [`FileVerifyResult`](crate::FileVerifyResult) flag.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid MPQ format or corrupted archive
    #[error("Invalid MPQ format: {0}")]
    InvalidFormat(String),

    /// File not found in archive
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The underlying stream ended before the requested range was read
    #[error("Short read at offset 0x{offset:X}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Absolute offset of the read
        offset: u64,
        /// Requested length
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// A sector failed its stored checksum while streaming a member
    #[error("Sector {sector} checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    SectorChecksum {
        /// Zero-based sector index
        sector: usize,
        /// Stored checksum
        expected: u32,
        /// Computed checksum
        actual: u32,
    },

    /// A compiled-in public key could not be decoded
    #[error("Invalid public key {label}: {reason}")]
    InvalidKey {
        /// Registry label of the key
        label: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Cryptographic primitive failure
    #[error("Cryptography error: {0}")]
    Crypto(String),
}

impl Error {
    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a new Crypto error
    pub fn crypto<S: Into<String>>(msg: S) -> Self {
        Self::Crypto(msg.into())
    }

    /// Check if this error indicates the archive is corrupted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_) | Self::ShortRead { .. } | Self::SectorChecksum { .. }
        )
    }
}
