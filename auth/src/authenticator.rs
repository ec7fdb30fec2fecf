use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Built once per process from the signing secret and shared read-only
/// between request handlers.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// What an access token issued on successful login should say.
#[derive(Debug, Clone)]
pub struct AccessGrant<'a> {
    pub subject: &'a str,
    pub role: &'a str,
    pub permissions: Vec<String>,
    pub ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with the default password hasher.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_hasher(jwt_secret, PasswordHasher::new())
    }

    /// Create an authenticator with a preconfigured password hasher.
    pub fn with_hasher(jwt_secret: &[u8], password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            token_codec: TokenCodec::new(jwt_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `grant` - Claims to embed in the issued token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        grant: AccessGrant<'_>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_codec.issue_access_token(
            grant.subject,
            grant.ttl,
            grant.role,
            grant.permissions,
        )?;

        Ok(AuthenticationResult { access_token })
    }

    /// Token codec sharing this authenticator's secret.
    pub fn tokens(&self) -> &TokenCodec {
        &self.token_codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(subject: &str) -> AccessGrant<'_> {
        AccessGrant {
            subject,
            role: "user",
            permissions: vec!["document:read".to_string()],
            ttl: Duration::minutes(30),
        }
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, grant("alice@troy.edu"))
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let decoded = authenticator
            .tokens()
            .decode_access(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, "alice@troy.edu");
        assert_eq!(decoded.role.as_deref(), Some("user"));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, grant("alice@troy.edu"));
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let result = authenticator.authenticate("my_password", "not-a-phc-string", grant("a@troy.edu"));
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_tokens_share_secret() {
        let first = Authenticator::new(b"test_secret_key_at_least_32_bytes!");
        let second = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let token = first
            .tokens()
            .issue_verification_token("bob@troy.edu", Duration::hours(1))
            .unwrap();

        assert!(second.tokens().decode_verification(&token).is_ok());
    }
}
