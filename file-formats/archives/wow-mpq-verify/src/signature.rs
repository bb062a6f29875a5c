//! Locating weak and strong signatures
//!
//! MPQ archives can carry two kinds of digital signature:
//! - Weak signatures (v1+): 512-bit RSA over MD5, stored in the `(signature)` file
//! - Strong signatures (v2+): 2048-bit RSA over SHA-1, appended after the archive

use crate::archive::ArchiveSource;
use crate::range::{ArchiveRange, calculate_archive_range};
use crate::{Error, Result};

/// Name of the member holding a weak signature
pub const SIGNATURE_FILE_NAME: &str = "(signature)";

/// Weak signature size (512-bit RSA)
pub const WEAK_SIGNATURE_SIZE: usize = 64; // 512 bits / 8

/// Weak signature file size (signature + 8 byte header)
pub const WEAK_SIGNATURE_FILE_SIZE: usize = WEAK_SIGNATURE_SIZE + 8; // 72 bytes total

/// Offset of the signature inside the `(signature)` file
pub const WEAK_SIGNATURE_OFFSET: usize = 8;

/// Strong signature size (2048-bit RSA)
pub const STRONG_SIGNATURE_SIZE: usize = 256; // 2048 bits / 8

/// Strong signature header
pub const STRONG_SIGNATURE_HEADER: [u8; 4] = *b"NGIS"; // "SIGN" reversed

/// Strong signature block size (header + signature)
pub const STRONG_SIGNATURE_BLOCK_SIZE: usize = STRONG_SIGNATURE_HEADER.len() + STRONG_SIGNATURE_SIZE;

/// Capacity of the raw signature buffer
pub const SIGNATURE_BUFFER_SIZE: usize = STRONG_SIGNATURE_SIZE + 0x10;

/// Signature type found in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SignatureType {
    /// No signature
    #[default]
    None,
    /// Weak signature (512-bit RSA with MD5)
    Weak,
    /// Strong signature (2048-bit RSA with SHA-1)
    Strong,
}

/// Everything needed to hash and verify one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// File offset where the hashing starts
    pub begin_mpq_data: u64,
    /// Begin of the excluded area (the `(signature)` file's stored data)
    pub begin_exclude: u64,
    /// End of the excluded area
    pub end_exclude: u64,
    /// File offset where the hashing ends
    pub end_mpq_data: u64,
    /// Size of the entire file
    pub end_of_file: u64,
    /// Raw signature bytes as read from the archive
    pub signature: Vec<u8>,
    /// Number of signature bytes actually read
    pub signature_size: usize,
    /// Kind of signature found
    pub signature_type: SignatureType,
}

impl SignatureInfo {
    /// Signature info for an archive range with nothing located yet
    pub fn unsigned(range: ArchiveRange) -> Self {
        Self {
            begin_mpq_data: range.begin_mpq_data,
            begin_exclude: 0,
            end_exclude: 0,
            end_mpq_data: range.end_mpq_data,
            end_of_file: range.end_of_file,
            signature: Vec::new(),
            signature_size: 0,
            signature_type: SignatureType::None,
        }
    }

    /// Whether an exclusion zone has been recorded
    pub fn has_exclusion(&self) -> bool {
        self.end_exclude > self.begin_exclude
    }

    /// The 64 weak signature bytes, skipping the 8-byte file header
    pub fn weak_signature(&self) -> Result<&[u8]> {
        self.signature
            .get(WEAK_SIGNATURE_OFFSET..WEAK_SIGNATURE_FILE_SIZE)
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "Weak signature file too small: {} bytes, expected {}",
                    self.signature.len(),
                    WEAK_SIGNATURE_FILE_SIZE
                ))
            })
    }

    /// The 256 strong signature bytes following the "NGIS" header
    pub fn strong_signature(&self) -> Result<&[u8]> {
        self.signature
            .get(STRONG_SIGNATURE_HEADER.len()..STRONG_SIGNATURE_BLOCK_SIZE)
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "Strong signature too small: {} bytes, expected {}",
                    self.signature.len(),
                    STRONG_SIGNATURE_BLOCK_SIZE
                ))
            })
    }
}

/// Compute the signed range and locate the archive's signature, if any.
///
/// Returns an error for I/O failures and for a `(signature)` file whose
/// declared size is not exactly [`WEAK_SIGNATURE_FILE_SIZE`].
pub fn query_signature_info<A: ArchiveSource + ?Sized>(archive: &mut A) -> Result<SignatureInfo> {
    let range = calculate_archive_range(archive)?;
    let mut info = SignatureInfo::unsigned(range);

    if locate_weak_signature(archive, &mut info)? {
        return Ok(info);
    }

    locate_strong_signature(archive, &mut info)?;
    Ok(info)
}

/// Fill in a weak signature from the `(signature)` file, if the archive has one
fn locate_weak_signature<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &mut SignatureInfo,
) -> Result<bool> {
    let archive_offset = archive.archive_offset();
    let mut member = match archive.open_member(SIGNATURE_FILE_NAME) {
        Ok(member) => member,
        Err(Error::FileNotFound(_)) => return Ok(false),
        Err(e) => return Err(e),
    };

    let mut buffer = vec![0u8; SIGNATURE_BUFFER_SIZE];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = member.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);

    let block = member.info();
    info.begin_exclude = archive_offset.checked_add(block.file_pos).ok_or_else(|| {
        Error::invalid_format(format!(
            "Signature file position 0x{:X} overflows archive offset 0x{archive_offset:X}",
            block.file_pos
        ))
    })?;
    info.end_exclude = info
        .begin_exclude
        .checked_add(block.compressed_size)
        .ok_or_else(|| {
            Error::invalid_format(format!(
                "Signature file size 0x{:X} overflows its position",
                block.compressed_size
            ))
        })?;
    let declared_size = block.file_size;

    info.signature = buffer;
    info.signature_size = filled;
    info.signature_type = SignatureType::Weak;

    log::debug!(
        "Weak signature file at 0x{:X}-0x{:X}, declared size {}",
        info.begin_exclude,
        info.end_exclude,
        declared_size
    );

    if declared_size != WEAK_SIGNATURE_FILE_SIZE as u64 {
        return Err(Error::invalid_format(format!(
            "Weak signature file has size {declared_size}, expected {WEAK_SIGNATURE_FILE_SIZE}"
        )));
    }

    Ok(true)
}

/// Look for an "NGIS" block right after the archive data
fn locate_strong_signature<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &mut SignatureInfo,
) -> Result<()> {
    let extra = info.end_of_file.saturating_sub(info.end_mpq_data);
    if extra < STRONG_SIGNATURE_BLOCK_SIZE as u64 {
        log::debug!("{extra} trailing bytes, too few for a strong signature");
        return Ok(());
    }

    let mut block = vec![0u8; STRONG_SIGNATURE_BLOCK_SIZE];
    archive.read_at(info.end_mpq_data, &mut block)?;

    if block[..STRONG_SIGNATURE_HEADER.len()] != STRONG_SIGNATURE_HEADER {
        log::debug!(
            "Trailing data at 0x{:X} is not a strong signature (header {:02X?})",
            info.end_mpq_data,
            &block[..STRONG_SIGNATURE_HEADER.len()]
        );
        return Ok(());
    }

    log::debug!("Found strong signature at offset 0x{:X}", info.end_mpq_data);
    info.signature_size = block.len();
    info.signature = block;
    info.signature_type = SignatureType::Strong;
    Ok(())
}
