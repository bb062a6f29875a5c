//! Signing helpers for unit tests.
//!
//! The Blizzard private keys are not available, so tests sign with these
//! throwaway key pairs and swap the matching public key into a copy of the
//! builtin registry.

use crate::digest::{Md5Digest, Sha1Digest};
use crate::signature::{STRONG_SIGNATURE_HEADER, STRONG_SIGNATURE_SIZE, WEAK_SIGNATURE_SIZE};
use num_bigint::BigUint;
use num_traits::Num;

/// 512-bit test key, public half
pub(crate) const TEST_WEAK_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MFwwDQYJKoZIhvcNAQEBBQADSwAwSAJBAO5lHFDZFZzGEuZf/ZW1bAxpVwaAqTW0",
    "wQV1zN9I3Qfg9XoDtp8SCtsUfw0t4jTkGuJBI5+gU8Wf00YThxgHpUUCAwEAAQ==",
    "-----END PUBLIC KEY-----",
);

const TEST_WEAK_N: &str = concat!(
    "EE651C50D9159CC612E65FFD95B56C0C69570680A935B4C10575CCDF48DD07E0",
    "F57A03B69F120ADB147F0D2DE234E41AE241239FA053C59FD34613871807A545",
);

const TEST_WEAK_D: &str = concat!(
    "716024D74E66B8E87A9495924460C3C223570000B0789A3E321A94149CD281AB",
    "D00E8EF5C96651A79305C051E353FCD371A0B546CB0438A9F4EA12D7BABEC81",
);

/// 2048-bit test key, public half
pub(crate) const TEST_STRONG_PUBLIC_KEY: &str = concat!(
    "-----BEGIN PUBLIC KEY-----",
    "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAsvtLe7/fqX3AMRcxrZU+",
    "RubeRbYvDiVYqemFJsteUqNkxL1mEDi2TUqf1VCRT9+oEq6o0AQVn/823r3TY+VI",
    "itY3tBWnw7HzNQzS7W1jn7f6OEwGFSR2Of7uxxXaLWP94muGRD/Q4WLkk4BXoefF",
    "A032/+GqNHVIbBC8WixyBZx9RG/Q6U5KhUP+My3aSimggpFBhngYqOT5C/n+vpNJ",
    "ulZwr4Xs865LRhOJQW7xkQa3jPz4vzVTduz7B9mMPOkE81+JcsXzd0OdD+QpyJqc",
    "h0e068R9NU6H862L4iQ1sddEqsbSfgQaHcx9YB3YcPLyd310iYNrIbaMn11MG1Gt",
    "BwIDAQAB",
    "-----END PUBLIC KEY-----",
);

const TEST_STRONG_N: &str = concat!(
    "B2FB4B7BBFDFA97DC0311731AD953E46E6DE45B62F0E2558A9E98526CB5E52A3",
    "64C4BD661038B64D4A9FD550914FDFA812AEA8D004159FFF36DEBDD363E5488A",
    "D637B415A7C3B1F3350CD2ED6D639FB7FA384C0615247639FEEEC715DA2D63FD",
    "E26B86443FD0E162E4938057A1E7C5034DF6FFE1AA3475486C10BC5A2C72059C",
    "7D446FD0E94E4A8543FE332DDA4A29A0829141867818A8E4F90BF9FEBE9349BA",
    "5670AF85ECF3AE4B461389416EF19106B78CFCF8BF355376ECFB07D98C3CE904",
    "F35F8972C5F377439D0FE429C89A9C8747B4EBC47D354E87F3AD8BE22435B1D7",
    "44AAC6D27E041A1DCC7D601DD870F2F2777D7489836B21B68C9F5D4C1B51AD07",
);

const TEST_STRONG_D: &str = concat!(
    "324559E8BAB6500D5577945BAC3530864A9F20B67096091053BD16DC941F7C97",
    "8F1CA153F2F772E0D7B677FC46AC48161595402E190F97DE5FA3856EC3EEA906",
    "F1EF386222BA5917860D818B157FF762FDE1651D0A403102CE237400A3C4BF02",
    "96DF7B995CD14714F73DA4BD3868F8519ACAE70913BCE33A41BC1BA33A3B966E",
    "6AC8A27DA2A8A91B963B4A738C6DFEB6C989A61851EEC30663371D08F851E172",
    "646BC0892EF807834FD7EF74BCCB4599DDD40A8E7A7C5058605722A89006E21E",
    "636A8C3695CA303A4449DE2CB5F731198B5836A6CCD8B1E2020BAEF7AC7EA9D1",
    "BF0623E8ED2D7E66DAACC68EA81F96C61C88BBEB7AB1846F8F6C32FE5085B5B9",
);

/// DER prefix of an MD5 DigestInfo
const MD5_DIGEST_INFO: [u8; 18] = [
    0x30, 0x20, 0x30, 0x0C, 0x06, 0x08, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x02, 0x05, 0x05,
    0x00, 0x04, 0x10,
];

/// Raw RSA private operation, returned little-endian as stored in archives
fn sign_raw(message: &[u8], n_hex: &str, d_hex: &str, size: usize) -> Vec<u8> {
    let n = BigUint::from_str_radix(n_hex, 16).unwrap();
    let d = BigUint::from_str_radix(d_hex, 16).unwrap();
    let m = BigUint::from_bytes_be(message);
    assert!(m < n);

    let s = m.modpow(&d, &n).to_bytes_be();
    let mut signature = vec![0u8; size - s.len()];
    signature.extend_from_slice(&s);
    signature.reverse();
    signature
}

/// Sign an MD5 digest with PKCS#1 v1.5 using the 512-bit test key
pub(crate) fn sign_weak(digest: &Md5Digest) -> Vec<u8> {
    let padding = WEAK_SIGNATURE_SIZE - 3 - MD5_DIGEST_INFO.len() - digest.len();
    let mut em = vec![0x00, 0x01];
    em.extend(std::iter::repeat_n(0xFF, padding));
    em.push(0x00);
    em.extend_from_slice(&MD5_DIGEST_INFO);
    em.extend_from_slice(digest);

    sign_raw(&em, TEST_WEAK_N, TEST_WEAK_D, WEAK_SIGNATURE_SIZE)
}

/// Sign a SHA-1 digest with the legacy 0x0B/0xBB padding using the 2048-bit test key
pub(crate) fn sign_strong(digest: &Sha1Digest) -> Vec<u8> {
    let mut em = vec![0xBB; STRONG_SIGNATURE_SIZE];
    em[0] = 0x0B;
    let mut reversed = *digest;
    reversed.reverse();
    em[STRONG_SIGNATURE_SIZE - reversed.len()..].copy_from_slice(&reversed);

    sign_raw(&em, TEST_STRONG_N, TEST_STRONG_D, STRONG_SIGNATURE_SIZE)
}

/// Content of a `(signature)` file: 8-byte header followed by the signature
pub(crate) fn weak_signature_file(signature: &[u8]) -> Vec<u8> {
    let mut file = vec![0u8; 8];
    file.extend_from_slice(signature);
    file
}

/// "NGIS" block appended after the archive
pub(crate) fn strong_signature_block(signature: &[u8]) -> Vec<u8> {
    let mut block = STRONG_SIGNATURE_HEADER.to_vec();
    block.extend_from_slice(signature);
    block
}
