//! In-memory archive source
//!
//! [`MemoryArchive`] serves a caller-declared layout over an owned byte image.
//! It does not parse MPQ structures: the table positions, free space offset
//! and members are whatever the builder says they are. This makes it useful
//! for checking signatures of archives whose layout is already known, and for
//! exercising the verifier without a full archive reader.
//!
//! Members are stored uncompressed, so their content is exactly the bytes
//! written into the image.

use crate::archive::{ArchiveSource, MemberInfo, MemberStream, TableLayout};
use crate::{Error, Result};
use md5::{Digest, Md5};

/// Default sector size shift (512 << 3 = 4096 bytes)
pub const DEFAULT_SECTOR_SHIFT: u16 = 3;

/// A member declared in a [`MemoryArchive`]
#[derive(Debug, Clone)]
pub struct MemoryMember {
    name: String,
    file_pos: u64,
    data: Vec<u8>,
    file_size: Option<u64>,
    crc32: Option<u32>,
    md5: Option<[u8; 16]>,
    sector_checksums: Option<Vec<u32>>,
    sector_size: usize,
    readable_len: Option<usize>,
}

impl MemoryMember {
    /// A member stored at `file_pos` (relative to the archive start)
    pub fn new<S: Into<String>>(name: S, file_pos: u64, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_pos,
            data,
            file_size: None,
            crc32: None,
            md5: None,
            sector_checksums: None,
            sector_size: 512 << DEFAULT_SECTOR_SHIFT,
            readable_len: None,
        }
    }

    /// Override the declared uncompressed size
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    /// Store a CRC32 reference value
    pub fn with_crc32(mut self, crc32: u32) -> Self {
        self.crc32 = Some(crc32);
        self
    }

    /// Store an MD5 reference value
    pub fn with_md5(mut self, md5: [u8; 16]) -> Self {
        self.md5 = Some(md5);
        self
    }

    /// Store CRC32 and MD5 reference values matching the content
    pub fn with_attributes(self) -> Self {
        let crc32 = crc32fast::hash(&self.data);
        let md5 = Md5::digest(&self.data).into();
        self.with_crc32(crc32).with_md5(md5)
    }

    /// Set the sector size as an MPQ shift (`512 << shift`)
    pub fn sector_shift(mut self, shift: u16) -> Self {
        self.sector_size = 512 << shift;
        self
    }

    /// Store Adler-32 sector checksums matching the content
    pub fn with_sector_checksums(mut self) -> Self {
        let checksums = self
            .data
            .chunks(self.sector_size)
            .map(adler2::adler32_slice)
            .collect();
        self.sector_checksums = Some(checksums);
        self
    }

    /// Store an explicit sector checksum table
    pub fn with_sector_checksum_table(mut self, checksums: Vec<u32>) -> Self {
        self.sector_checksums = Some(checksums);
        self
    }

    /// Make reads stop after `len` bytes, as if the stream ended early
    pub fn truncated_at(mut self, len: usize) -> Self {
        self.readable_len = Some(len);
        self
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> MemberInfo {
        MemberInfo {
            file_pos: self.file_pos,
            compressed_size: self.data.len() as u64,
            file_size: self.file_size.unwrap_or(self.data.len() as u64),
            has_sector_crc: self.sector_checksums.is_some(),
            sector_checksums: self.sector_checksums.clone(),
            crc32: self.crc32,
            md5: self.md5,
        }
    }
}

/// Builder for [`MemoryArchive`]
#[derive(Debug, Clone, Default)]
pub struct MemoryArchiveBuilder {
    display_name: Option<String>,
    archive_offset: u64,
    image_size: usize,
    tables: TableLayout,
    free_space_offset: Option<u64>,
    members: Vec<MemoryMember>,
}

impl MemoryArchiveBuilder {
    /// Name reported as the stream name, used by the file name digest tail
    pub fn display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Offset of the MPQ header within the image
    pub fn archive_offset(mut self, offset: u64) -> Self {
        self.archive_offset = offset;
        self
    }

    /// Minimum image size; the image is zero filled
    pub fn image_size(mut self, size: usize) -> Self {
        self.image_size = size;
        self
    }

    /// Table positions (absolute offsets)
    pub fn tables(mut self, tables: TableLayout) -> Self {
        self.tables = tables;
        self
    }

    /// Absolute end of allocated space.
    ///
    /// Defaults to the end of the furthest member, or the archive offset.
    pub fn free_space_offset(mut self, offset: u64) -> Self {
        self.free_space_offset = Some(offset);
        self
    }

    /// Add a member; its bytes are written into the image
    pub fn member(mut self, member: MemoryMember) -> Self {
        self.members.push(member);
        self
    }

    /// Assemble the image
    pub fn build(self) -> MemoryArchive {
        let mut image = vec![0u8; self.image_size];
        let mut data_end = self.archive_offset;

        for member in &self.members {
            let start = (self.archive_offset + member.file_pos) as usize;
            let end = start + member.data.len();
            if image.len() < end {
                image.resize(end, 0);
            }
            image[start..end].copy_from_slice(&member.data);
            data_end = data_end.max(end as u64);
        }

        MemoryArchive {
            display_name: self.display_name.unwrap_or_else(|| "memory.mpq".to_string()),
            archive_offset: self.archive_offset,
            image,
            tables: self.tables,
            free_space_offset: self.free_space_offset.unwrap_or(data_end),
            members: self.members,
        }
    }
}

/// An [`ArchiveSource`] backed by a byte buffer
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    display_name: String,
    archive_offset: u64,
    image: Vec<u8>,
    tables: TableLayout,
    free_space_offset: u64,
    members: Vec<MemoryMember>,
}

impl MemoryArchive {
    /// Start building an archive
    pub fn builder() -> MemoryArchiveBuilder {
        MemoryArchiveBuilder::default()
    }

    /// The underlying file contents
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Append bytes to the end of the image, returning their offset
    pub fn append(&mut self, data: &[u8]) -> u64 {
        let offset = self.image.len() as u64;
        self.image.extend_from_slice(data);
        offset
    }

    /// Overwrite bytes at an absolute offset, growing the image if needed.
    ///
    /// Bytes belonging to a member are changed in the image only; the
    /// member's content as returned by [`ArchiveSource::open_member`] is not.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) {
        let start = offset as usize;
        let end = start + data.len();
        if self.image.len() < end {
            self.image.resize(end, 0);
        }
        self.image[start..end].copy_from_slice(data);
    }

    fn find_member(&self, name: &str) -> Option<&MemoryMember> {
        self.members
            .iter()
            .find(|member| member.name.eq_ignore_ascii_case(name))
    }
}

impl ArchiveSource for MemoryArchive {
    fn archive_offset(&self) -> u64 {
        self.archive_offset
    }

    fn file_size(&mut self) -> Result<u64> {
        Ok(self.image.len() as u64)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let available = self.image.len().saturating_sub(offset as usize);
        if available < buf.len() {
            return Err(Error::ShortRead {
                offset,
                expected: buf.len(),
                actual: available,
            });
        }

        let start = offset as usize;
        buf.copy_from_slice(&self.image[start..start + buf.len()]);
        Ok(())
    }

    fn free_space_offset(&mut self) -> Result<u64> {
        Ok(self.free_space_offset)
    }

    fn table_layout(&self) -> Result<TableLayout> {
        Ok(self.tables)
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn open_member(&mut self, name: &str) -> Result<Box<dyn MemberStream + '_>> {
        let member = self
            .find_member(name)
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;

        Ok(Box::new(MemoryMemberStream {
            info: member.info(),
            data: &member.data,
            readable_len: member.readable_len.unwrap_or(member.data.len()).min(member.data.len()),
            sector_size: member.sector_size,
            position: 0,
            verify_sectors: false,
        }))
    }
}

/// Reader over a [`MemoryMember`]
#[derive(Debug)]
struct MemoryMemberStream<'a> {
    info: MemberInfo,
    data: &'a [u8],
    readable_len: usize,
    sector_size: usize,
    position: usize,
    verify_sectors: bool,
}

impl MemoryMemberStream<'_> {
    fn verify_sector(&self, sector: usize) -> Result<()> {
        let Some(expected) = self
            .info
            .sector_checksums
            .as_deref()
            .and_then(|table| table.get(sector).copied())
        else {
            return Ok(());
        };

        // A zero checksum means the sector was written without one
        if expected == 0 {
            return Ok(());
        }

        let start = sector * self.sector_size;
        let end = (start + self.sector_size).min(self.data.len());
        let actual = adler2::adler32_slice(&self.data[start..end]);
        if actual != expected {
            log::debug!("Sector {sector} failed verification");
            return Err(Error::SectorChecksum {
                sector,
                expected,
                actual,
            });
        }

        Ok(())
    }
}

impl MemberStream for MemoryMemberStream<'_> {
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    fn set_sector_verification(&mut self, enabled: bool) {
        self.verify_sectors = enabled;
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.position >= self.readable_len || buf.is_empty() {
            return Ok(0);
        }

        // Never cross a sector boundary in one read so each sector is
        // verified before any of its bytes are handed out
        let sector = self.position / self.sector_size;
        if self.verify_sectors && self.position % self.sector_size == 0 {
            self.verify_sector(sector)?;
        }

        let sector_end = (sector + 1) * self.sector_size;
        let end = sector_end
            .min(self.readable_len)
            .min(self.position + buf.len());
        let n = end - self.position;
        buf[..n].copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        Ok(n)
    }
}
