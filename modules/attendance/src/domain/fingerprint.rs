//! Same-day pseudo identity derived from the client address and user agent.

use sha2::{Digest, Sha256};

pub const DEFAULT_FINGERPRINT_LEN: usize = 32;
pub const MIN_FINGERPRINT_LEN: usize = 8;
/// Hex length of a full SHA-256 digest.
pub const MAX_FINGERPRINT_LEN: usize = 64;

/// Hex SHA-256 of `"{ip}_{user_agent}"`, cut to `len` characters.
///
/// `len` is clamped to `[MIN_FINGERPRINT_LEN, MAX_FINGERPRINT_LEN]`.
pub fn fingerprint(ip: &str, user_agent: &str, len: usize) -> String {
    let len = len.clamp(MIN_FINGERPRINT_LEN, MAX_FINGERPRINT_LEN);
    let digest = Sha256::digest(format!("{ip}_{user_agent}").as_bytes());
    let mut out = hex::encode(digest);
    out.truncate(len);
    out
}
