//! Record ids and timestamps.

use rand::Rng;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated record ids.
pub const ID_LENGTH: usize = 15;

/// Generate a random record id (15 lowercase alphanumerics).
pub fn new_id() -> String {
    random_string(ID_LENGTH)
}

/// Generate a random lowercase alphanumeric string.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Current UTC time in the store's timestamp format (`2025-05-08 12:00:00.000Z`).
pub fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.3fZ")
        .to_string()
}
