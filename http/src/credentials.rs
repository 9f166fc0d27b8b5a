//! Password hashing and token minting
//!
//! Argon2id with a per-password random salt for storage, HS256 JSON Web
//! Tokens for the session credential handed back by login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskd_core::error::{Result, TaskError};

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Returns
/// * `Ok(String)` - PHC-format hash string safe to store
/// * `Err(TaskError::Internal)` - If hashing fails
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TaskError::internal(format!("Password hashing failed: {e}")))
}

/// Verify a password against a stored PHC-format hash.
///
/// An unparseable stored hash counts as a mismatch; the caller only ever
/// learns that the credentials did not verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash failed to parse");
            false
        }
    }
}

/// JWT claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject, the authenticated username
    pub sub: String,
    /// Username again, for handlers that log it
    pub username: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration time (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    pub fn new(username: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Symmetric signing keys plus the token lifetime
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            token_ttl,
        }
    }

    /// Mint a signed access token for a username.
    ///
    /// # Returns
    /// * `Ok(String)` - Encoded HS256 token
    /// * `Err(TaskError::Internal)` - If signing fails
    pub fn mint(&self, username: &str) -> Result<String> {
        let claims = Claims::new(username, self.token_ttl);
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TaskError::internal(format!("Token minting failed: {e}")))
    }

    /// Decode and validate a token, including its expiry
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").expect("hash");
        let second = hash_password("same password").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not a phc string"));
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let keys = JwtKeys::new(b"test-secret", Duration::hours(1));
        let token = keys.mint("henry").expect("mint");

        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "henry");
        assert_eq!(claims.username, "henry");
        assert!(claims.exp > claims.iat);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let keys = JwtKeys::new(b"secret-one", Duration::hours(1));
        let other = JwtKeys::new(b"secret-two", Duration::hours(1));

        let token = keys.mint("iris").expect("mint");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_fails_verification() {
        // Issued far enough in the past to clear the default decode leeway
        let keys = JwtKeys::new(b"test-secret", Duration::seconds(-3600));
        let token = keys.mint("jan").expect("mint");
        assert!(keys.verify(&token).is_err());
    }
}
