use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::constants::SESSION_TOKEN_BYTES;

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2id parameters: 19 MiB, 2 passes, 1 lane (OWASP baseline)
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

fn argon2_config() -> Result<Argon2<'static>, password_hash::Error> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with Argon2id and return the PHC string
///
/// The PHC string embeds the salt and parameters, so it is all that
/// needs to be stored.
pub fn hash_password(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = argon2_config()?;
    Ok(argon2.hash_password(plaintext.as_bytes(), &salt)?.to_string())
}

/// Verify a plaintext password against a stored PHC string
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(_) => {
            tracing::error!("Stored password hash is not a valid PHC string");
            return false;
        }
    };

    match argon2_config() {
        Ok(argon2) => argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Generate a random hex session token
pub fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of a token, used as the server-side session key
///
/// Plaintext tokens only ever live in the client's cookie.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Password Tests
    // =========================================================================

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("abcd123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("abcd123!", &hash));
        assert!(!verify_password("abcd123?", &hash));
    }

    #[test]
    fn test_hash_password_salts_each_hash() {
        let first = hash_password("abcd123!").unwrap();
        let second = hash_password("abcd123!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        assert!(!verify_password("abcd123!", "not-a-phc-string"));
    }

    // =========================================================================
    // Token Tests
    // =========================================================================

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), SESSION_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_token_deterministic() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        assert_eq!(hash_token(&token).len(), 64);
    }
}
