//! Credential helpers: random replacement secrets and salted digests.

use rand::seq::SliceRandom;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Wide alphabet for generated secrets: letters, digits, punctuation.
const ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*-_=+";

pub const GENERATED_LENGTH: usize = 12;

/// Generate a random replacement secret. Returned to the caller once and
/// never persisted in the clear.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_LENGTH)
        .map(|_| *ALPHABET.choose(&mut rng).unwrap_or(&b'x') as char)
        .collect()
}

/// Salted SHA-256 digest, hex encoded as `{salt}${hex}`.
pub fn hash(password: &str) -> String {
    let salt: u64 = rand::thread_rng().gen();
    hash_with_salt(password, &format!("{:016x}", salt))
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}${:x}", salt, hasher.finalize())
}

pub fn verify(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_with_salt(password, salt) == stored,
        None => false,
    }
}
