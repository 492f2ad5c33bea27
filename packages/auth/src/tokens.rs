// ABOUTME: Opaque session token generation, hashing, and verification
// ABOUTME: Only SHA-256 digests of tokens are ever stored

use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token
/// Returns a base64-encoded 32-byte token
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Hash a token using SHA-256
/// This is what gets stored in the database
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Verify a token against a stored hash using constant-time comparison
/// This prevents timing attacks
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);

    use subtle::ConstantTimeEq;
    computed_hash
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_produces_unique_values() {
        let token1 = generate_token();
        let token2 = generate_token();

        assert_ne!(token1, token2);
        assert!(token1.len() > 32); // Base64 of 32 bytes is 43 chars
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = "test-token-123";
        let hash1 = hash_token(token);
        let hash2 = hash_token(token);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex chars
    }

    #[test]
    fn test_hash_token_different_inputs_produce_different_hashes() {
        assert_ne!(hash_token("test-token-1"), hash_token("test-token-2"));
    }

    #[test]
    fn test_verify_token_hash() {
        let token = "test-token-123";
        let hash = hash_token(token);

        assert!(verify_token_hash(token, &hash));
        assert!(!verify_token_hash("test-token-456", &hash));
    }
}
