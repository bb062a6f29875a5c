//! Archive access consumed by the verification engine.
//!
//! Opening archives, walking the hash and block tables and decompressing
//! stored files all live outside this crate. The verifier only needs the
//! narrow view described by [`ArchiveSource`]: positional reads from the
//! underlying file, the archive's table layout and a way to stream a single
//! member by name.

use crate::{Error, Result};

/// Size of one classic hash table entry in bytes
pub const HASH_ENTRY_SIZE: u64 = 16;

/// Size of one classic block table entry in bytes
pub const BLOCK_ENTRY_SIZE: u64 = 16;

/// Size of one hi-block table entry (upper 16 bits of the file position)
pub const HI_BLOCK_ENTRY_SIZE: u64 = 2;

/// Positions and sizes of the archive's metadata tables.
///
/// All positions are absolute offsets in the underlying file, so for an
/// archive embedded at a non-zero offset they already include that offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Absolute offset of the hash table
    pub hash_table_pos: u64,
    /// Number of hash table entries
    pub hash_table_entries: u32,
    /// Absolute offset of the block table
    pub block_table_pos: u64,
    /// Number of block table entries
    pub block_table_entries: u32,
    /// Absolute offset of the hi-block table, if the archive has one
    pub hi_block_table_pos: Option<u64>,
}

impl TableLayout {
    /// End offset of the hash table
    pub fn hash_table_end(&self) -> Result<u64> {
        table_end("hash", self.hash_table_pos, self.hash_table_entries, HASH_ENTRY_SIZE)
    }

    /// End offset of the block table
    pub fn block_table_end(&self) -> Result<u64> {
        table_end("block", self.block_table_pos, self.block_table_entries, BLOCK_ENTRY_SIZE)
    }

    /// End offset of the hi-block table. It holds one entry per block.
    pub fn hi_block_table_end(&self) -> Result<Option<u64>> {
        self.hi_block_table_pos
            .map(|pos| table_end("hi-block", pos, self.block_table_entries, HI_BLOCK_ENTRY_SIZE))
            .transpose()
    }
}

fn table_end(table: &str, pos: u64, entries: u32, entry_size: u64) -> Result<u64> {
    (entries as u64)
        .checked_mul(entry_size)
        .and_then(|size| pos.checked_add(size))
        .ok_or_else(|| {
            Error::invalid_format(format!(
                "{table} table at 0x{pos:X} with {entries} entries ends past the addressable range"
            ))
        })
}
