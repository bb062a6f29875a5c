//! Known Blizzard public keys
//!
//! The trust roots are fixed: one 512-bit key for weak signatures and five
//! 2048-bit keys for the strong signature variants used by different titles.
//! Keys are kept as PEM text and decoded every time they are needed.

use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;

const PEM_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_END: &str = "-----END PUBLIC KEY-----";

/// Identifies one of the compiled-in keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum KeyId {
    /// Blizzard weak signature key (512-bit)
    BlizzardWeak,
    /// Blizzard generic strong signature key
    BlizzardStrong,
    /// Warcraft III map signing key
    Warcraft3Map,
    /// World of Warcraft patch key
    WowPatch,
    /// World of Warcraft survey key
    WowSurvey,
    /// StarCraft II map signing key
    Starcraft2Map,
}

/// A compiled-in public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyEntry {
    /// Which key this is
    pub id: KeyId,
    /// Human readable label, used in logs and errors
    pub label: &'static str,
    /// PEM encoded SubjectPublicKeyInfo
    pub pem: &'static str,
}

impl PublicKeyEntry {
    /// Decode the PEM text into an RSA public key
    pub fn decode(&self) -> Result<RsaPublicKey> {
        decode_public_key(self.label, self.pem)
    }
}

/// The immutable, ordered set of trusted keys
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    entries: [PublicKeyEntry; 6],
}

static BUILTIN: KeyRegistry = KeyRegistry {
    entries: [
        PublicKeyEntry {
            id: KeyId::BlizzardWeak,
            label: "Blizzard weak",
            pem: BLIZZARD_WEAK_PUBLIC_KEY,
        },
        PublicKeyEntry {
            id: KeyId::BlizzardStrong,
            label: "Blizzard strong",
            pem: BLIZZARD_STRONG_PUBLIC_KEY,
        },
        PublicKeyEntry {
            id: KeyId::Warcraft3Map,
            label: "Warcraft III map",
            pem: WARCRAFT3_MAP_PUBLIC_KEY,
        },
        PublicKeyEntry {
            id: KeyId::WowPatch,
            label: "WoW patch",
            pem: WOW_PATCH_PUBLIC_KEY,
        },
        PublicKeyEntry {
            id: KeyId::WowSurvey,
            label: "WoW survey",
            pem: WOW_SURVEY_PUBLIC_KEY,
        },
        PublicKeyEntry {
            id: KeyId::Starcraft2Map,
            label: "StarCraft II map",
            pem: STARCRAFT2_MAP_PUBLIC_KEY,
        },
    ],
};

impl KeyRegistry {
    /// The compiled-in registry
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Look up a key by id
    pub fn get(&self, id: KeyId) -> &PublicKeyEntry {
        // Every id has exactly one slot, see BUILTIN
        &self.entries[id as usize]
    }

    /// Decode a key by id
    pub fn decode(&self, id: KeyId) -> Result<RsaPublicKey> {
        self.get(id).decode()
    }

    /// All entries in registry order
    pub fn entries(&self) -> &[PublicKeyEntry] {
        &self.entries
    }

    /// Copy of this registry with one slot pointing at different PEM text
    #[cfg(test)]
    pub(crate) fn with_key(&self, id: KeyId, pem: &'static str) -> Self {
        let mut registry = self.clone();
        registry.entries[id as usize].pem = pem;
        registry
    }
}

/// Decode a `-----BEGIN PUBLIC KEY-----` block into an RSA public key.
///
/// The markers are mandatory; whitespace between them is ignored so both the
/// single-line form used for the compiled-in keys and regular multi-line PEM
/// are accepted.
pub fn decode_public_key(label: &'static str, pem: &str) -> Result<RsaPublicKey> {
    let invalid = |reason: String| Error::InvalidKey { label, reason };

    let body = pem
        .trim()
        .strip_prefix(PEM_BEGIN)
        .ok_or_else(|| invalid("missing BEGIN marker".to_string()))?
        .strip_suffix(PEM_END)
        .ok_or_else(|| invalid("missing END marker".to_string()))?;

    let base64: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let der = BASE64
        .decode(base64.as_bytes())
        .map_err(|e| invalid(format!("invalid base64: {e}")))?;

    RsaPublicKey::from_public_key_der(&der).map_err(|e| invalid(format!("invalid DER: {e}")))
}

/// Blizzard weak signature public key (512-bit)
pub const BLIZZARD_WEAK_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MFwwDQYJKoZIhvcNAQEBBQADSwAwSAJBAJJidwS/uILMBSO5DLGsBFknIXWWjQJe",
    "2kfdfEk3G/j66w4KkhZ1V61Rt4zLaMVCYpDun7FLwRjkMDSepO1q2DcCAwEAAQ==",
    "-----END PUBLIC KEY-----",
);

/// Blizzard strong signature public key (2048-bit)
pub const BLIZZARD_STRONG_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAsQZ+ziT2h8h+J/iMQpgd",
    "tH1HaJzOBE3agjU4yMPcrixaPOZoA4t8bwfey7qczfWywocYo3pleytFF+IuD4HD",
    "Fl9OXN1SFyupSgMx1EGZlgbFAomnbq9MQJyMqQtMhRAjFgg4TndS7YNb+JMSAEKp",
    "kXNqY28n/EVBHD5TsMuVCL579gIenbr61dI92DDEdy790IzIG0VKWLh/KOTcTJfm",
    "Ds/7HQTkGouVW+WUsfekuqNQo7ND9DBnhLjLjptxeFE2AZqYcA1ao3S9LN3GL1tW",
    "lVXFIX9c7fWqaVTQlZ2oNsI/ARVApOK3grNgqvwH6YoVYVXjNJEo5sQJsPsdV/hk",
    "dwIDAQAB",
    "-----END PUBLIC KEY-----",
);

/// Warcraft III map signing key, used with the file name tail
pub const WARCRAFT3_MAP_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA1BwklUUQ3UvjizOBRoF5",
    "yyOVc7KD+oGOQH5i6eUk1yfs0luCC70kNucNrfqhmviywVtahRse1JtXCPrx2bd3",
    "iN8Dx91fbkxjYIOGTsjYoHKTp0BbaFkJih776fcHgnFSb+7mJcDuJVvJOXxEH6w0",
    "1vo6VtujCqj1arqbyoal+xtAaczF3us5cOEp45sR1zAWTn1+7omN7VWV4QqJPaDS",
    "gBSESc0l1grO0i1VUSumayk7yBKIkb+LBvcG6WnYZHCi7VdLmaxER5m8oZfER66b",
    "heHoiSQIZf9PAY6Guw2DT5BTc54j/AaLQAKf2qcRSgQLVo5kQaddF3rCpsXoB/74",
    "6QIDAQAB",
    "-----END PUBLIC KEY-----",
);

/// World of Warcraft patch key, used with the "ARCHIVE" tail
pub const WOW_PATCH_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAwOsMV0LagAWPEtEQM6b9",
    "6FHFkUyGbbyda2/Dfc9dyl21E9QvX+Yw7qKRMAKPzA2TlQQLZKvXpnKXF/YIK5xa",
    "5uwg9CEHCEAYolLG4xn0FUOE0E/0PuuytI0p0ICe6rk00PifZzTr8na2wI/l/GnQ",
    "bvnIVF1ck6cslATpQJ5JJVMXzoFlUABS19WESw4MXuJAS3AbMhxNWdEhVv7eO51c",
    "yGjRLy9QjogZODZTY0fSEksgBqQxNCoYVJYI/sF5K2flDsGqrIp0OdJ6teJlzg1Y",
    "UjYnb6bKjlidXoHEXI2TgA/mD6O3XFIt08I9s3crOCTgICq7cgX35qrZiIVWZdRv",
    "TwIDAQAB",
    "-----END PUBLIC KEY-----",
);

/// World of Warcraft survey key
pub const WOW_SURVEY_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAnIt1DR6nRyyKsy2qahHe",
    "MKLtacatn/KxieHcwH87wLBxKy+jZ0gycTmJ7SaTdBAEMDs/V5IPIXEtoqYnid2c",
    "63TmfGDU92oc3Ph1PWUZ2PWxBhT06HYxRdbrgHw9/I29pNPi/607x+lzPORITOgU",
    "BR6MR8au8HsQP4bn4vkJNgnSgojh48/XQOB/cAln7As1neP61NmVimoLR4Bwi3zt",
    "zfgrZaUpyeNCUrOYJmH09YIjbBySTtXOUidoPHjFrMsCWpr6xs8xbETbs7MJFL6a",
    "vcUfTT67qfIZ9RsuKfnXJTIrV0kwDSjjuNXiPTmWAehSsiHIsrUXX5RNcwsSjClr",
    "nQIDAQAB",
    "-----END PUBLIC KEY-----",
);

/// StarCraft II map signing key
pub const STARCRAFT2_MAP_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAmk4GT8zb+ICC25a17KZB",
    "q/ygKGJ2VSO6IT5PGHJlm1KfnHBA4B6SH3xMlJ4c6eG2k7QevZv+FOhjsAHubyWq",
    "2VKqWbrIFKv2ILc2RfMn8J9EDVRxvcxh6slRrVL69D0w1tfVGjMiKq2Fym5yGoRT",
    "E7CRgDqbAbXP9LBsCNWHiJLwfxMGzHbk8pIl9oia5pvM7ofZamSHchxlpy6xa4GJ",
    "7xKN01YCNvklTL1D7uol3wkwcHc7vrF8QwuJizuA5bSg4poEGtH62BZOYi+UL/z0",
    "31YK+k9CbQyM0X0pJoJoYz1TK+Y5J7vBnXCZtfcTYQ/ZzN6UcxTa57dJaiOlCh9z",
    "nQIDAQAB",
    "-----END PUBLIC KEY-----",
);
