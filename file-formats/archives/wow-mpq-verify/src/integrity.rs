//! Per-file integrity checks
//!
//! A member is streamed once and checked against every reference value the
//! archive stores for it: per-sector Adler-32 checksums from the sector
//! offset table, and the CRC32 and MD5 entries from `(attributes)`.

use crate::Error;
use crate::archive::{ArchiveSource, MemberInfo};
use bitflags::bitflags;
use md5::{Digest, Md5};

/// Size of each read while streaming a member
pub const FILE_READ_SIZE: usize = 0x1000;

bitflags! {
    /// Outcome of verifying one archive member, using StormLib's bit values
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct FileVerifyResult: u32 {
        /// The member could not be opened
        const OPEN_ERROR = 0x0001;
        /// The member could not be read to its declared size
        const READ_ERROR = 0x0002;
        /// The member carries sector checksums
        const HAS_SECTOR_CHECKSUMS = 0x0004;
        /// A sector failed its checksum
        const SECTOR_CHECKSUM_ERROR = 0x0008;
        /// A CRC32 reference value exists
        const HAS_FILE_CHECKSUM = 0x0010;
        /// The CRC32 of the content differs from the reference
        const FILE_CHECKSUM_ERROR = 0x0020;
        /// An MD5 reference value exists
        const HAS_MD5 = 0x0040;
        /// The MD5 of the content differs from the reference
        const MD5_ERROR = 0x0080;
    }
}

bitflags! {
    /// Which whole-file checks [`verify_file`] performs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct VerifyFlags: u32 {
        /// Compare against the stored CRC32
        const CRC32 = 0x0001;
        /// Compare against the stored MD5
        const MD5 = 0x0004;
        /// Every supported check
        const ALL = Self::CRC32.bits() | Self::MD5.bits();
    }
}

impl FileVerifyResult {
    /// Bits that report a failure rather than the presence of a checksum
    pub const ERRORS: Self = Self::OPEN_ERROR
        .union(Self::READ_ERROR)
        .union(Self::SECTOR_CHECKSUM_ERROR)
        .union(Self::FILE_CHECKSUM_ERROR)
        .union(Self::MD5_ERROR);

    /// Whether any error bit is set
    pub fn has_errors(self) -> bool {
        self.intersects(Self::ERRORS)
    }
}

impl Default for VerifyFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Verify one member of an archive.
///
/// Sector checksums are always checked when the member has them; `flags`
/// selects the whole-file checks. The member is read until its stream ends,
/// and any difference from the declared size is a read error. Whole-file
/// checksums are only compared when exactly the declared content was read,
/// so a read failure never also reports a checksum mismatch.
pub fn verify_file<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    name: &str,
    flags: VerifyFlags,
) -> FileVerifyResult {
    let mut result = FileVerifyResult::empty();

    let mut member = match archive.open_member(name) {
        Ok(member) => member,
        Err(e) => {
            log::warn!("Failed to open {name} for verification: {e}");
            return FileVerifyResult::OPEN_ERROR;
        }
    };

    member.set_sector_verification(true);

    let mut crc = flags.contains(VerifyFlags::CRC32).then(crc32fast::Hasher::new);
    let mut md5 = flags.contains(VerifyFlags::MD5).then(Md5::new);

    let mut buffer = vec![0u8; FILE_READ_SIZE];
    let mut bytes_read = 0u64;

    // Read to the end of the stream so an overrun is seen as well
    loop {
        match member.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                let chunk = &buffer[..n];
                if let Some(crc) = crc.as_mut() {
                    crc.update(chunk);
                }
                if let Some(md5) = md5.as_mut() {
                    md5.update(chunk);
                }
                bytes_read = bytes_read.saturating_add(n as u64);
            }
            Err(Error::SectorChecksum { sector, .. }) => {
                log::warn!("{name}: sector {sector} failed its checksum");
                result |= FileVerifyResult::SECTOR_CHECKSUM_ERROR;
                break;
            }
            Err(e) => {
                log::warn!("{name}: read failed: {e}");
                break;
            }
        }
    }

    let info = member.info();
    if info.has_sector_checksums() {
        result |= FileVerifyResult::HAS_SECTOR_CHECKSUMS;
    }

    if bytes_read != info.file_size {
        log::debug!(
            "{name}: read {bytes_read} bytes, declared size is {}",
            info.file_size
        );
        return result | FileVerifyResult::READ_ERROR;
    }

    if let Some(crc) = crc {
        result |= check_crc32(info, crc.finalize());
    }
    if let Some(md5) = md5 {
        result |= check_md5(info, md5.finalize().into());
    }

    log::debug!("{name}: {result:?}");
    result
}

fn check_crc32(info: &MemberInfo, actual: u32) -> FileVerifyResult {
    match info.crc32 {
        Some(expected) if expected != 0 => {
            if actual == expected {
                FileVerifyResult::HAS_FILE_CHECKSUM
            } else {
                log::debug!("CRC32 mismatch: expected 0x{expected:08X}, got 0x{actual:08X}");
                FileVerifyResult::HAS_FILE_CHECKSUM | FileVerifyResult::FILE_CHECKSUM_ERROR
            }
        }
        _ => FileVerifyResult::empty(),
    }
}

fn check_md5(info: &MemberInfo, actual: [u8; 16]) -> FileVerifyResult {
    match info.md5 {
        Some(expected) if expected != [0; 16] => {
            if actual == expected {
                FileVerifyResult::HAS_MD5
            } else {
                log::debug!("MD5 mismatch");
                FileVerifyResult::HAS_MD5 | FileVerifyResult::MD5_ERROR
            }
        }
        _ => FileVerifyResult::empty(),
    }
}
