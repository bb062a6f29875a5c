//! Signature location and digests

use crate::common::{ARCHIVE_END, ARCHIVE_OFFSET, archive_builder};
use sha1::{Digest, Sha1};
use wow_mpq_verify::signature::{
    SIGNATURE_FILE_NAME, STRONG_SIGNATURE_BLOCK_SIZE, STRONG_SIGNATURE_HEADER,
    WEAK_SIGNATURE_FILE_SIZE,
};
use wow_mpq_verify::{
    MemoryMember, SignatureType, calculate_mpq_hash_md5, calculate_mpq_hash_sha1,
    query_signature_info,
};

#[test]
fn test_unsigned_archive_info() {
    let mut archive = archive_builder().build();

    let info = query_signature_info(&mut archive).unwrap();
    assert_eq!(info.signature_type, SignatureType::None);
    assert_eq!(info.begin_mpq_data, ARCHIVE_OFFSET);
    assert_eq!(info.end_mpq_data, ARCHIVE_END);
    assert!(!info.has_exclusion());
}

#[test]
fn test_weak_signature_exclusion_zone() {
    let mut archive = archive_builder()
        .member(MemoryMember::new(
            SIGNATURE_FILE_NAME,
            0x2800,
            vec![0x5A; WEAK_SIGNATURE_FILE_SIZE],
        ))
        .build();

    let info = query_signature_info(&mut archive).unwrap();
    assert_eq!(info.signature_type, SignatureType::Weak);
    assert_eq!(info.begin_exclude, ARCHIVE_OFFSET + 0x2800);
    assert_eq!(info.end_exclude, ARCHIVE_OFFSET + 0x2800 + 72);
    assert!(info.begin_mpq_data <= info.begin_exclude);
    assert!(info.end_exclude <= info.end_mpq_data);
    assert!(info.end_mpq_data <= info.end_of_file);
}

#[test]
fn test_weak_digest_ignores_signature_content() {
    let signed = |fill: u8| {
        archive_builder()
            .member(MemoryMember::new(
                SIGNATURE_FILE_NAME,
                0x2800,
                vec![fill; WEAK_SIGNATURE_FILE_SIZE],
            ))
            .build()
    };

    let mut first = signed(0x00);
    let mut second = signed(0xFF);
    let info = query_signature_info(&mut first).unwrap();

    assert_eq!(
        calculate_mpq_hash_md5(&mut first, &info).unwrap(),
        calculate_mpq_hash_md5(&mut second, &info).unwrap()
    );
}

#[test]
fn test_strong_signature_block() {
    let mut archive = archive_builder().build();
    let mut block = STRONG_SIGNATURE_HEADER.to_vec();
    block.extend([0x42; 256]);
    archive.append(&block);

    let info = query_signature_info(&mut archive).unwrap();
    assert_eq!(info.signature_type, SignatureType::Strong);
    assert_eq!(info.end_mpq_data, ARCHIVE_END);
    assert_eq!(info.end_of_file, ARCHIVE_END + STRONG_SIGNATURE_BLOCK_SIZE as u64);
    assert_eq!(info.strong_signature().unwrap(), &[0x42; 256][..]);
}

#[test]
fn test_strong_digest_tails() {
    let mut archive = archive_builder().build();
    archive.append(&[0u8; STRONG_SIGNATURE_BLOCK_SIZE]);
    let info = query_signature_info(&mut archive).unwrap();

    let digests = calculate_mpq_hash_sha1(&mut archive, &info).unwrap();

    let signed = &archive.image()[ARCHIVE_OFFSET as usize..ARCHIVE_END as usize];
    let plain: [u8; 20] = Sha1::digest(signed).into();
    let mut hasher = Sha1::new();
    hasher.update(signed);
    hasher.update(b"TEST.W3X");
    let with_name: [u8; 20] = hasher.finalize().into();

    assert_eq!(digests.tail0, plain);
    assert_eq!(digests.tail1, with_name);
    assert_ne!(digests.tail2, plain);
}
