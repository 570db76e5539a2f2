//! Short code generation.
//!
//! A short code is the first 8 hex characters of
//! `SHA-256(original_url ++ decimal(seed))`, where `seed` is a fresh
//! non-negative 63-bit integer from the operating system's CSPRNG. The URL is
//! hashed as-is, so empty, very long and non-ASCII inputs are all accepted.
//!
//! 8 hex characters is a 32-bit code space. Collisions are not detected: a
//! colliding save overwrites the earlier record in the store.

use sha2::{Digest, Sha256};

/// Length of a generated short code in hex characters.
pub const CODE_LENGTH: usize = 8;

/// Generates a fresh short code for `original_url`.
///
/// Repeated calls with the same input return different codes with
/// overwhelming probability, because every call draws a new seed.
///
/// # Panics
///
/// Panics if the system random number generator fails. There is no degraded
/// mode: a record must never be persisted without a code.
///
/// # Examples
///
/// ```
/// use shortener_service::utils::code_generator::generate_code;
///
/// let code = generate_code("https://example.com");
/// assert_eq!(code.len(), 8);
/// assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
/// ```
pub fn generate_code(original_url: &str) -> String {
    let mut buffer = [0u8; 8];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    code_from_seed(original_url, seed_from_bytes(buffer))
}

/// Derives the short code for a given URL and seed.
///
/// Deterministic: the same `(original_url, seed)` pair always yields the same code.
pub fn code_from_seed(original_url: &str, seed: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_url.as_bytes());
    hasher.update(seed.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut code = hex::encode(digest);
    code.truncate(CODE_LENGTH);
    code
}

/// Returns true if `code` has the shape of a generated short code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Maps 8 random bytes uniformly onto `0..=i64::MAX`.
fn seed_from_bytes(bytes: [u8; 8]) -> i64 {
    (u64::from_le_bytes(bytes) >> 1) as i64
}
