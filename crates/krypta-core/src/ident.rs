//! Random identifier generation
//!
//! Entity ids are 16 characters over `[0-9a-zA-Z]`; API keys use the same
//! alphabet at a configurable length (128 by default). Both draw from the
//! operating system CSPRNG.

use rand::rngs::OsRng;
use rand::Rng;

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of every entity identifier.
pub const ENTITY_ID_LEN: usize = 16;

/// Generate a fresh 16-character entity id.
pub fn new_id() -> String {
    random_string(ENTITY_ID_LEN)
}

/// Generate a fresh API key of the given length.
pub fn new_api_key(length: usize) -> String {
    random_string(length)
}

/// Whether `value` is a well-formed entity id (16 alphanumeric chars).
pub fn is_valid_id(value: &str) -> bool {
    value.len() == ENTITY_ID_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn random_string(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_length_and_charset() {
        let id = new_id();
        assert_eq!(id.len(), 16);
        assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_api_key_length() {
        assert_eq!(new_api_key(128).len(), 128);
        assert_eq!(new_api_key(64).len(), 64);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("a1B2c3D4e5F6g7H8"));
        assert!(!is_valid_id("short"));
        assert!(!is_valid_id("a1B2c3D4e5F6g7H!"));
        assert!(!is_valid_id("a1B2c3D4e5F6g7H89"));
    }

    #[test]
    fn test_generated_ids_validate() {
        for _ in 0..32 {
            assert!(is_valid_id(&new_id()));
        }
    }
}
