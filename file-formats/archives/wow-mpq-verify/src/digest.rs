//! Archive digests for signature verification
//!
//! Both digests are computed over `[begin_mpq_data, end_mpq_data)` in units of
//! [`DIGEST_UNIT_SIZE`] bytes, the same chunking StormLib uses.

use crate::Result;
use crate::archive::ArchiveSource;
use crate::signature::SignatureInfo;
use md5::{Digest, Md5};
use sha1::Sha1;

/// Hash digest unit size for chunked processing
pub const DIGEST_UNIT_SIZE: usize = 0x10000; // 65536 bytes

/// Tail appended for the WoW patch signature variant
pub const ARCHIVE_TAIL: &str = "ARCHIVE";

/// MD5 digest of the signed range
pub type Md5Digest = [u8; 16];

/// SHA-1 digest of the signed range
pub type Sha1Digest = [u8; 20];

/// The three SHA-1 variants used by strong signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrongDigests {
    /// Plain digest of the range
    pub tail0: Sha1Digest,
    /// Digest with the uppercased plain file name appended
    pub tail1: Sha1Digest,
    /// Digest with "ARCHIVE" appended
    pub tail2: Sha1Digest,
}

/// Which SHA-1 variant a strong signature was made over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestTail {
    /// No tail
    None,
    /// The archive's plain file name
    FileName,
    /// The literal "ARCHIVE"
    Archive,
}

impl StrongDigests {
    /// Select one variant
    pub fn get(&self, tail: DigestTail) -> &Sha1Digest {
        match tail {
            DigestTail::None => &self.tail0,
            DigestTail::FileName => &self.tail1,
            DigestTail::Archive => &self.tail2,
        }
    }
}

/// Feed `[begin, end)` of the underlying file to `process`, one unit at a time.
///
/// The callback receives the absolute offset of the chunk and a mutable view
/// of it, so callers can blank parts before hashing.
fn for_each_unit<A, F>(archive: &mut A, begin: u64, end: u64, mut process: F) -> Result<()>
where
    A: ArchiveSource + ?Sized,
    F: FnMut(u64, &mut [u8]),
{
    let mut buffer = vec![0u8; DIGEST_UNIT_SIZE];
    let mut current_pos = begin;

    while current_pos < end {
        let to_read = (end - current_pos).min(DIGEST_UNIT_SIZE as u64) as usize;
        let chunk = &mut buffer[..to_read];
        archive.read_at(current_pos, chunk)?;
        log::trace!("Digest unit 0x{:X}+0x{:X}", current_pos, to_read);

        process(current_pos, chunk);
        current_pos += to_read as u64;
    }

    Ok(())
}

/// Zero the part of `chunk` (starting at absolute `chunk_pos`) that lies in
/// `[begin_exclude, end_exclude)`
fn blank_excluded(chunk: &mut [u8], chunk_pos: u64, begin_exclude: u64, end_exclude: u64) {
    let chunk_end = chunk_pos + chunk.len() as u64;
    if begin_exclude >= end_exclude || chunk_pos >= end_exclude || chunk_end <= begin_exclude {
        return;
    }

    let start = begin_exclude.saturating_sub(chunk_pos) as usize;
    let stop = (end_exclude.min(chunk_end) - chunk_pos) as usize;
    chunk[start..stop].fill(0);

    log::debug!(
        "Chunk 0x{:X}-0x{:X}: zeroed signature bytes [{}-{}]",
        chunk_pos,
        chunk_end,
        start,
        stop
    );
}

/// Calculate the MD5 digest for weak signature verification.
///
/// Bytes of the `(signature)` file inside the range are replaced by zeros
/// rather than skipped, so offsets stay aligned and the digest does not depend
/// on the signature's own content.
pub fn calculate_mpq_hash_md5<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &SignatureInfo,
) -> Result<Md5Digest> {
    let mut hasher = Md5::new();

    log::debug!(
        "MD5 over 0x{:X}-0x{:X}, exclude 0x{:X}-0x{:X}",
        info.begin_mpq_data,
        info.end_mpq_data,
        info.begin_exclude,
        info.end_exclude
    );

    for_each_unit(archive, info.begin_mpq_data, info.end_mpq_data, |pos, chunk| {
        blank_excluded(chunk, pos, info.begin_exclude, info.end_exclude);
        hasher.update(&*chunk);
    })?;

    Ok(hasher.finalize().into())
}

/// Calculate the three SHA-1 digests for strong signature verification
pub fn calculate_mpq_hash_sha1<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &SignatureInfo,
) -> Result<StrongDigests> {
    let mut hasher = Sha1::new();

    log::debug!(
        "SHA-1 over 0x{:X}-0x{:X}",
        info.begin_mpq_data,
        info.end_mpq_data
    );

    for_each_unit(archive, info.begin_mpq_data, info.end_mpq_data, |_, chunk| {
        hasher.update(&*chunk);
    })?;

    let file_name = plain_file_name(archive.display_name());
    Ok(StrongDigests {
        tail0: hasher.clone().finalize().into(),
        tail1: finalize_with_tail(hasher.clone(), file_name),
        tail2: finalize_with_tail(hasher, ARCHIVE_TAIL),
    })
}

fn finalize_with_tail(mut hasher: Sha1, tail: &str) -> Sha1Digest {
    let upper: Vec<u8> = tail.bytes().map(|b| b.to_ascii_uppercase()).collect();
    hasher.update(&upper);
    hasher.finalize().into()
}

/// Last component of a path, accepting both separators
pub fn plain_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
