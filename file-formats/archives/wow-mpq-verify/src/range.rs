//! Byte range covered by an archive signature

use crate::Result;
use crate::archive::ArchiveSource;

/// Warcraft III map header magic ('HM3W')
pub const MAP_HEADER_MAGIC: [u8; 4] = *b"HM3W";

/// The part of the underlying file that a signature covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRange {
    /// Absolute offset where hashing starts
    pub begin_mpq_data: u64,
    /// Absolute offset where hashing stops
    pub end_mpq_data: u64,
    /// Size of the entire underlying file
    pub end_of_file: u64,
}

impl ArchiveRange {
    /// Bytes between the end of the archive data and the end of the file
    pub fn trailing_bytes(&self) -> u64 {
        self.end_of_file.saturating_sub(self.end_mpq_data)
    }
}

/// Calculate begin and end of the signed data.
///
/// Hashing starts at the MPQ header, except for Warcraft III maps whose
/// `HM3W` header is signed together with the archive. It ends at the
/// furthest of the last allocated file byte and the ends of the hash, block
/// and hi-block tables, which leaves anything appended after the archive
/// (such as a strong signature) outside the range.
pub fn calculate_archive_range<A: ArchiveSource + ?Sized>(archive: &mut A) -> Result<ArchiveRange> {
    let mut begin_mpq_data = archive.archive_offset();
    let end_of_file = archive.file_size()?;

    if end_of_file >= MAP_HEADER_MAGIC.len() as u64 {
        let mut magic = [0u8; 4];
        archive.read_at(0, &mut magic)?;
        if magic == MAP_HEADER_MAGIC {
            log::debug!("Map header found, hashing from file start");
            begin_mpq_data = 0;
        }
    }

    let layout = archive.table_layout()?;
    let end_mpq_data = [
        Some(archive.free_space_offset()?),
        Some(layout.hash_table_end()?),
        Some(layout.block_table_end()?),
        layout.hi_block_table_end()?,
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(begin_mpq_data);

    log::debug!(
        "Archive range 0x{:X}-0x{:X}, file size 0x{:X}",
        begin_mpq_data,
        end_mpq_data,
        end_of_file
    );

    Ok(ArchiveRange {
        begin_mpq_data,
        end_mpq_data,
        end_of_file,
    })
}
