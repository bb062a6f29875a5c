//! Per-file verification through the public entry point

use crate::common::{archive_builder, init_logging};
use pretty_assertions::assert_eq;
use wow_mpq_verify::{FileVerifyResult, MemoryMember, VerifyFlags, verify_file};

#[test]
fn test_intact_file() {
    init_logging();
    let mut archive = archive_builder().build();

    assert_eq!(
        verify_file(&mut archive, "war3map.j", VerifyFlags::ALL),
        FileVerifyResult::HAS_SECTOR_CHECKSUMS
            | FileVerifyResult::HAS_FILE_CHECKSUM
            | FileVerifyResult::HAS_MD5
    );
}

#[test]
fn test_file_without_checksums() {
    let mut archive = archive_builder().build();
    let result = verify_file(&mut archive, "WAR3MAP.W3I", VerifyFlags::ALL);
    assert_eq!(result, FileVerifyResult::empty());
    assert!(!result.has_errors());
}

#[test]
fn test_missing_file() {
    let mut archive = archive_builder().build();
    let result = verify_file(&mut archive, "war3map.wts", VerifyFlags::ALL);
    assert_eq!(result, FileVerifyResult::OPEN_ERROR);
    assert!(result.has_errors());
}

#[test]
fn test_corrupted_sector() {
    let data = vec![0x61u8; 2000];
    let mut table: Vec<u32> = data.chunks(512).map(adler2::adler32_slice).collect();
    table[3] = 0x0BAD_F00D;

    let mut archive = archive_builder()
        .member(
            MemoryMember::new("war3map.wtg", 0x2A00, data)
                .sector_shift(0)
                .with_sector_checksum_table(table)
                .with_attributes(),
        )
        .build();

    let result = verify_file(&mut archive, "war3map.wtg", VerifyFlags::ALL);
    assert_eq!(
        result,
        FileVerifyResult::HAS_SECTOR_CHECKSUMS
            | FileVerifyResult::SECTOR_CHECKSUM_ERROR
            | FileVerifyResult::READ_ERROR
    );
}

#[test]
fn test_modified_content() {
    let mut archive = archive_builder()
        .member(
            MemoryMember::new("war3map.wts", 0x2A00, b"STRING 1 { Hello }".to_vec())
                .with_crc32(crc32fast::hash(b"STRING 1 { Hallo }")),
        )
        .build();

    assert_eq!(
        verify_file(&mut archive, "war3map.wts", VerifyFlags::CRC32),
        FileVerifyResult::HAS_FILE_CHECKSUM | FileVerifyResult::FILE_CHECKSUM_ERROR
    );
    // MD5 was not requested and no MD5 is stored
    assert_eq!(
        verify_file(&mut archive, "war3map.wts", VerifyFlags::MD5),
        FileVerifyResult::empty()
    );
}
