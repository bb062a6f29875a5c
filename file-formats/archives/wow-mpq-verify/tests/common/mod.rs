//! Shared helpers for building test archives

use wow_mpq_verify::{MemoryArchive, MemoryArchiveBuilder, MemoryMember, TableLayout};

/// Offset of the MPQ header inside every test image
pub const ARCHIVE_OFFSET: u64 = 0x200;

/// Absolute end of the block table, which is also the end of the archive data
pub const ARCHIVE_END: u64 = ARCHIVE_OFFSET + 0x3140;

/// Enable log output when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn tables() -> TableLayout {
    TableLayout {
        hash_table_pos: ARCHIVE_OFFSET + 0x3000,
        hash_table_entries: 16,
        block_table_pos: ARCHIVE_OFFSET + 0x3100,
        block_table_entries: 4,
        hi_block_table_pos: None,
    }
}

/// A small archive with two ordinary members and no signature
pub fn archive_builder() -> MemoryArchiveBuilder {
    let script: Vec<u8> = (0..0x2000u32).map(|i| (i * 13 % 251) as u8).collect();
    MemoryArchive::builder()
        .display_name("Maps/Test.w3x")
        .archive_offset(ARCHIVE_OFFSET)
        .image_size(ARCHIVE_END as usize)
        .tables(tables())
        .member(
            MemoryMember::new("war3map.j", 0x100, script)
                .sector_shift(0)
                .with_sector_checksums()
                .with_attributes(),
        )
        .member(MemoryMember::new("war3map.w3i", 0x2200, b"map info".to_vec()))
}
