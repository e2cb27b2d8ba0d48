//! Argon2id password hashing
//!
//! Parameters come from configuration so deployments can tune cost. Hash
//! and salt are stored as separate base64 strings. Verification recomputes
//! the hash and compares in constant time.

use crate::error::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Argon2id cost parameters.
#[derive(Clone, Debug)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
    /// Salt length in bytes
    pub salt_length: u32,
    /// Output key length in bytes
    pub key_length: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
            salt_length: 16,
            key_length: 32,
        }
    }
}

fn hasher(cfg: &Argon2Config) -> Result<Argon2<'static>> {
    let params = Params::new(
        cfg.memory_kib,
        cfg.iterations,
        cfg.parallelism,
        Some(cfg.key_length as usize),
    )
    .map_err(|e| Error::developer("PASSWORD_HASHING_FAILED", e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password with a fresh random salt.
///
/// Returns `(hash_base64, salt_base64)`.
pub fn hash_password(password: &str, cfg: &Argon2Config) -> Result<(String, String)> {
    if password.is_empty() {
        return Err(Error::developer(
            "PASSWORD_HASHING_FAILED",
            "password must not be empty",
        ));
    }

    let mut salt = vec![0u8; cfg.salt_length as usize];
    OsRng.fill_bytes(&mut salt);

    let mut hash = vec![0u8; cfg.key_length as usize];
    hasher(cfg)?
        .hash_password_into(password.as_bytes(), &salt, &mut hash)
        .map_err(|e| Error::developer("PASSWORD_HASHING_FAILED", e.to_string()))?;

    Ok((BASE64.encode(&hash), BASE64.encode(&salt)))
}

/// Verify a plaintext password against a stored hash and salt.
pub fn verify_password(
    password: &str,
    encoded_hash: &str,
    encoded_salt: &str,
    cfg: &Argon2Config,
) -> Result<bool> {
    if password.is_empty() || encoded_hash.is_empty() || encoded_salt.is_empty() {
        return Err(Error::developer(
            "PASSWORD_VERIFICATION_FAILED",
            "password, hash, and salt must be non-empty",
        ));
    }

    let stored = BASE64
        .decode(encoded_hash)
        .map_err(|e| Error::developer("PASSWORD_VERIFICATION_FAILED", e.to_string()))?;
    let salt = BASE64
        .decode(encoded_salt)
        .map_err(|e| Error::developer("PASSWORD_VERIFICATION_FAILED", e.to_string()))?;

    // A stored hash of the wrong length can never match.
    if stored.len() != cfg.key_length as usize {
        return Ok(false);
    }

    let mut computed = vec![0u8; cfg.key_length as usize];
    hasher(cfg)?
        .hash_password_into(password.as_bytes(), &salt, &mut computed)
        .map_err(|e| Error::developer("PASSWORD_VERIFICATION_FAILED", e.to_string()))?;

    Ok(computed.ct_eq(&stored).into())
}

/// Off-thread variant of [`hash_password`] for request paths; Argon2 is
/// CPU-bound and would otherwise stall the async executor.
pub async fn hash_password_off_thread(
    password: String,
    cfg: Argon2Config,
) -> Result<(String, String)> {
    tokio::task::spawn_blocking(move || hash_password(&password, &cfg))
        .await
        .map_err(|e| Error::developer("PASSWORD_HASHING_FAILED", e.to_string()))?
}

/// Off-thread variant of [`verify_password`].
pub async fn verify_password_off_thread(
    password: String,
    encoded_hash: String,
    encoded_salt: String,
    cfg: Argon2Config,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        verify_password(&password, &encoded_hash, &encoded_salt, &cfg)
    })
    .await
    .map_err(|e| Error::developer("PASSWORD_VERIFICATION_FAILED", e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Argon2Config {
        // Low-cost parameters keep the test suite fast.
        Argon2Config {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let cfg = test_config();
        let (hash, salt) = hash_password("correct horse battery staple", &cfg).unwrap();
        assert!(verify_password("correct horse battery staple", &hash, &salt, &cfg).unwrap());
    }

    #[test]
    fn test_wrong_password_fails() {
        let cfg = test_config();
        let (hash, salt) = hash_password("hunter22hunter22", &cfg).unwrap();
        assert!(!verify_password("hunter23hunter23", &hash, &salt, &cfg).unwrap());
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let cfg = test_config();
        let (hash_a, salt_a) = hash_password("same password", &cfg).unwrap();
        let (hash_b, salt_b) = hash_password("same password", &cfg).unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let cfg = test_config();
        assert!(hash_password("", &cfg).is_err());
        assert!(verify_password("", "aGFzaA==", "c2FsdA==", &cfg).is_err());
        assert!(verify_password("pw", "", "c2FsdA==", &cfg).is_err());
        assert!(verify_password("pw", "aGFzaA==", "", &cfg).is_err());
    }

    #[test]
    fn test_tampered_hash_fails() {
        let cfg = test_config();
        let (hash, salt) = hash_password("a strong password", &cfg).unwrap();
        let mut tampered = BASE64.decode(&hash).unwrap();
        tampered[0] ^= 0xff;
        let tampered = BASE64.encode(&tampered);
        assert!(!verify_password("a strong password", &tampered, &salt, &cfg).unwrap());
    }
}
