//! Authentication utilities library
//!
//! Provides the credential and token primitives for account services:
//! - Password hashing (Argon2id)
//! - Access and email verification tokens (HS256 JWT)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec
//!     .issue_access_token("alice@troy.edu", Duration::minutes(30), "user", vec![])
//!     .unwrap();
//! let claims = codec.decode_access(&token).unwrap();
//! assert_eq!(claims.sub, "alice@troy.edu");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{AccessGrant, Authenticator};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let grant = AccessGrant {
//!     subject: "alice@troy.edu",
//!     role: "user",
//!     permissions: vec!["document:read".to_string()],
//!     ttl: Duration::minutes(30),
//! };
//! let result = auth.authenticate("password123", &hash, grant).unwrap();
//!
//! // Validate token
//! let claims = auth.tokens().decode_access(&result.access_token).unwrap();
//! assert_eq!(claims.role.as_deref(), Some("user"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AccessGrant;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
