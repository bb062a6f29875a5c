//! # wow_mpq_verify - MPQ Signature and Integrity Verification
//!
//! StormLib-compatible verification of MPQ (Mo'PaQ) archives used by Blizzard
//! Entertainment games: archive digital signatures and per-file checksums.
//!
//! ## Features
//!
//! - Weak signatures (512-bit RSA over MD5, stored in `(signature)`)
//! - Strong signatures (2048-bit RSA over SHA-1, appended after the archive)
//!   checked against every known Blizzard public key
//! - Warcraft III map headers signed together with the archive
//! - Per-file sector checksum, CRC32 and MD5 verification
//! - StormLib result codes and flag values
//!
//! The crate does not parse archives itself. Any reader that implements
//! [`ArchiveSource`] can be verified; [`MemoryArchive`] is an implementation
//! over a byte buffer with a caller-declared layout.
//!
//! ## Examples
//!
//! ```
//! use wow_mpq_verify::{
//!     FileVerifyResult, MemoryArchive, MemoryMember, TableLayout, VerificationResult,
//!     VerifyFlags, verify_archive, verify_file,
//! };
//!
//! let mut archive = MemoryArchive::builder()
//!     .archive_offset(0x200)
//!     .image_size(0x1110)
//!     .tables(TableLayout {
//!         hash_table_pos: 0x1000,
//!         hash_table_entries: 16,
//!         block_table_pos: 0x1100,
//!         block_table_entries: 1,
//!         hi_block_table_pos: None,
//!     })
//!     .member(MemoryMember::new("war3map.j", 0x20, b"function main".to_vec()).with_attributes())
//!     .build();
//!
//! assert_eq!(verify_archive(&mut archive), VerificationResult::NoSignature);
//!
//! let result = verify_file(&mut archive, "war3map.j", VerifyFlags::ALL);
//! assert!(!result.has_errors());
//! assert!(result.contains(FileVerifyResult::HAS_MD5));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod digest;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod memory;
pub mod range;
pub mod signature;
pub mod verify;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use archive::{ArchiveSource, MemberInfo, MemberStream, TableLayout};
pub use digest::{StrongDigests, calculate_mpq_hash_md5, calculate_mpq_hash_sha1};
pub use error::{Error, Result};
pub use integrity::{FileVerifyResult, VerifyFlags, verify_file};
pub use keys::{KeyId, KeyRegistry, PublicKeyEntry};
pub use memory::{MemoryArchive, MemoryArchiveBuilder, MemoryMember};
pub use range::{ArchiveRange, calculate_archive_range};
pub use signature::{SignatureInfo, SignatureType, query_signature_info};
pub use verify::{ResultClass, VerificationResult, verify_archive};
