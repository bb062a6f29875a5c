//! Archive signature verification
//!
//! Weak signatures are checked with PKCS#1 v1.5 against the Blizzard weak key.
//! Strong signatures use a legacy scheme: the signature is decrypted with raw
//! RSA and compared byte for byte against a digest padded with `0x0B` followed
//! by `0xBB` bytes. Several keys and digest tails are in use, so a strong
//! signature is tried against an ordered policy of (key, tail) pairs.
//!
//! All signature bytes are stored little-endian in the archive and reversed
//! before any RSA operation, as are the SHA-1 digests placed in the padded
//! buffer.

use crate::archive::ArchiveSource;
use crate::digest::{
    DigestTail, Sha1Digest, StrongDigests, calculate_mpq_hash_md5, calculate_mpq_hash_sha1,
};
use crate::keys::{KeyId, KeyRegistry};
use crate::signature::{STRONG_SIGNATURE_SIZE, SignatureInfo, SignatureType, query_signature_info};
use crate::{Error, Result};
use md5::Md5;
use num_bigint::BigUint;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use std::fmt;

/// First byte of a decrypted strong signature
pub const STRONG_PADDING_TYPE: u8 = 0x0B;

/// Filler byte of a decrypted strong signature
pub const STRONG_PADDING_BYTE: u8 = 0xBB;

/// Outcome of verifying an archive's signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VerificationResult {
    /// The archive is readable and carries no signature
    NoSignature,
    /// The archive could not be read, or its signature data is malformed
    VerifyFailed,
    /// Weak signature present and valid
    WeakSignatureOk,
    /// Weak signature present but invalid
    WeakSignatureError,
    /// Strong signature present and valid
    StrongSignatureOk,
    /// Strong signature present but invalid
    StrongSignatureError,
}

/// Broad category of a [`VerificationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResultClass {
    /// Nothing to verify
    Unsigned,
    /// A signature was checked; the result says whether it holds
    Cryptographic,
    /// Structural or I/O fault before a verdict could be reached
    Fault,
}

impl VerificationResult {
    /// StormLib `ERROR_*` code for this result
    pub fn code(self) -> u32 {
        match self {
            Self::NoSignature => 0,
            Self::VerifyFailed => 1,
            Self::WeakSignatureOk => 2,
            Self::WeakSignatureError => 3,
            Self::StrongSignatureOk => 4,
            Self::StrongSignatureError => 5,
        }
    }

    /// Which of the three outcome classes this belongs to
    pub fn class(self) -> ResultClass {
        match self {
            Self::NoSignature => ResultClass::Unsigned,
            Self::VerifyFailed => ResultClass::Fault,
            Self::WeakSignatureOk
            | Self::WeakSignatureError
            | Self::StrongSignatureOk
            | Self::StrongSignatureError => ResultClass::Cryptographic,
        }
    }

    /// Whether a signature was present and verified successfully
    pub fn is_valid(self) -> bool {
        matches!(self, Self::WeakSignatureOk | Self::StrongSignatureOk)
    }

    /// Kind of signature the result is about, if one was checked
    pub fn signature_type(self) -> Option<SignatureType> {
        match self {
            Self::WeakSignatureOk | Self::WeakSignatureError => Some(SignatureType::Weak),
            Self::StrongSignatureOk | Self::StrongSignatureError => Some(SignatureType::Strong),
            Self::NoSignature | Self::VerifyFailed => None,
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoSignature => "no signature",
            Self::VerifyFailed => "verification failed",
            Self::WeakSignatureOk => "weak signature is valid",
            Self::WeakSignatureError => "weak signature is invalid",
            Self::StrongSignatureOk => "strong signature is valid",
            Self::StrongSignatureError => "strong signature is invalid",
        };
        f.write_str(text)
    }
}

/// One (key, digest tail) pair a strong signature may have been made with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrongCandidate {
    /// Key to decrypt with
    pub key: KeyId,
    /// Digest variant the signer used
    pub tail: DigestTail,
}

/// Strong signature candidates, in the order they are tried
pub const STRONG_SIGNATURE_POLICY: [StrongCandidate; 5] = [
    StrongCandidate {
        key: KeyId::BlizzardStrong,
        tail: DigestTail::None,
    },
    StrongCandidate {
        key: KeyId::Warcraft3Map,
        tail: DigestTail::FileName,
    },
    StrongCandidate {
        key: KeyId::WowPatch,
        tail: DigestTail::Archive,
    },
    StrongCandidate {
        key: KeyId::WowSurvey,
        tail: DigestTail::None,
    },
    StrongCandidate {
        key: KeyId::Starcraft2Map,
        tail: DigestTail::None,
    },
];

/// Verify the digital signature of an archive against the builtin keys.
///
/// Every fault is reported as [`VerificationResult::VerifyFailed`]; use
/// [`query_signature_info`] to find out what was located.
pub fn verify_archive<A: ArchiveSource + ?Sized>(archive: &mut A) -> VerificationResult {
    verify_archive_with_keys(archive, KeyRegistry::builtin())
}

pub(crate) fn verify_archive_with_keys<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    keys: &KeyRegistry,
) -> VerificationResult {
    match try_verify_archive(archive, keys) {
        Ok(result) => {
            log::debug!("Archive {}: {result}", archive.display_name());
            result
        }
        Err(e) => {
            log::warn!(
                "Failed to verify archive {} ({}): {e}",
                archive.display_name(),
                fault_kind(&e)
            );
            VerificationResult::VerifyFailed
        }
    }
}

/// Short description of why verification could not reach a verdict
fn fault_kind(error: &Error) -> &'static str {
    if error.is_corruption() {
        "archive is corrupted"
    } else {
        "archive could not be checked"
    }
}

fn try_verify_archive<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    keys: &KeyRegistry,
) -> Result<VerificationResult> {
    let info = query_signature_info(archive)?;
    log::debug!("Signature type: {:?}", info.signature_type);

    match info.signature_type {
        SignatureType::None => Ok(VerificationResult::NoSignature),
        SignatureType::Weak => verify_weak_signature(archive, &info, keys),
        SignatureType::Strong => verify_strong_signature(archive, &info, keys),
    }
}

/// Check a weak signature located by [`query_signature_info`]
fn verify_weak_signature<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &SignatureInfo,
    keys: &KeyRegistry,
) -> Result<VerificationResult> {
    let digest = calculate_mpq_hash_md5(archive, info)?;
    let key = keys.decode(KeyId::BlizzardWeak)?;
    let signature = reverse_bytes(info.weak_signature()?);

    match key.verify(Pkcs1v15Sign::new::<Md5>(), &digest, &signature) {
        Ok(()) => Ok(VerificationResult::WeakSignatureOk),
        Err(e) => {
            log::debug!("Weak signature rejected: {e}");
            Ok(VerificationResult::WeakSignatureError)
        }
    }
}

/// Check a strong signature located by [`query_signature_info`]
fn verify_strong_signature<A: ArchiveSource + ?Sized>(
    archive: &mut A,
    info: &SignatureInfo,
    keys: &KeyRegistry,
) -> Result<VerificationResult> {
    let digests = calculate_mpq_hash_sha1(archive, info)?;
    let signature = reverse_bytes(info.strong_signature()?);

    let matched = first_match(&STRONG_SIGNATURE_POLICY, |candidate| {
        check_strong_candidate(keys, candidate, &signature, &digests)
    })?;

    Ok(match matched {
        Some(candidate) => {
            log::debug!("Strong signature matches {:?}", candidate);
            VerificationResult::StrongSignatureOk
        }
        None => VerificationResult::StrongSignatureError,
    })
}

/// Return the first candidate for which `check` holds, stopping at errors
fn first_match<T, F>(candidates: &[T], mut check: F) -> Result<Option<&T>>
where
    F: FnMut(&T) -> Result<bool>,
{
    for candidate in candidates {
        if check(candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn check_strong_candidate(
    keys: &KeyRegistry,
    candidate: &StrongCandidate,
    signature: &[u8],
    digests: &StrongDigests,
) -> Result<bool> {
    let key = keys.decode(candidate.key)?;
    let expected = padded_digest(digests.get(candidate.tail));
    let matched = raw_signature_matches(&key, signature, &expected)?;

    log::debug!(
        "Strong candidate {:?}/{:?}: {}",
        candidate.key,
        candidate.tail,
        if matched { "match" } else { "no match" }
    );
    Ok(matched)
}

/// The buffer a strong signature decrypts to for `digest`
pub fn padded_digest(digest: &Sha1Digest) -> [u8; STRONG_SIGNATURE_SIZE] {
    let mut padded = [STRONG_PADDING_BYTE; STRONG_SIGNATURE_SIZE];
    padded[0] = STRONG_PADDING_TYPE;

    let digest_offset = STRONG_SIGNATURE_SIZE - digest.len();
    padded[digest_offset..].copy_from_slice(digest);
    padded[digest_offset..].reverse();
    padded
}

/// Decrypt a big-endian signature with raw RSA and compare it to `expected`.
///
/// A signature that is not smaller than the modulus cannot have been produced
/// by the key and does not match.
fn raw_signature_matches(
    key: &RsaPublicKey,
    signature: &[u8],
    expected: &[u8; STRONG_SIGNATURE_SIZE],
) -> Result<bool> {
    if key.size() != STRONG_SIGNATURE_SIZE || signature.len() != STRONG_SIGNATURE_SIZE {
        return Err(Error::crypto(format!(
            "Strong signature needs a {STRONG_SIGNATURE_SIZE}-byte key and signature, got {} and {}",
            key.size(),
            signature.len()
        )));
    }

    let n = BigUint::from_bytes_be(&key.n().to_bytes_be());
    let e = BigUint::from_bytes_be(&key.e().to_bytes_be());
    let s = BigUint::from_bytes_be(signature);
    if s >= n {
        log::debug!("Strong signature is out of range for this key");
        return Ok(false);
    }

    // Perform RSA operation: signature^e mod n
    let decrypted = s.modpow(&e, &n).to_bytes_be();
    let mut block = [0u8; STRONG_SIGNATURE_SIZE];
    block[STRONG_SIGNATURE_SIZE - decrypted.len()..].copy_from_slice(&decrypted);

    Ok(block == *expected)
}

/// Reverse byte order (little-endian to big-endian conversion)
fn reverse_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().rev().copied().collect()
}
