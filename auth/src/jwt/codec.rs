use chrono::Duration;

use super::claims::Claims;
use super::claims::TokenKind;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Issues and decodes the two token kinds used for accounts.
///
/// Both kinds are signed with the same secret. Decoding for one purpose
/// rejects claims tagged for the other.
pub struct TokenCodec {
    handler: JwtHandler,
}

impl TokenCodec {
    /// Create a codec signing with `secret`.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            handler: JwtHandler::new(secret),
        }
    }

    /// Issue an access token embedding a role and permission snapshot.
    ///
    /// # Arguments
    /// * `subject` - Account email
    /// * `ttl` - Validity window
    /// * `role` - Role name at issuance
    /// * `permissions` - Permissions at issuance
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access_token(
        &self,
        subject: &str,
        ttl: Duration,
        role: &str,
        permissions: Vec<String>,
    ) -> Result<String, JwtError> {
        self.handler
            .encode(&Claims::access(subject, ttl, role, permissions))
    }

    /// Issue a single-purpose email verification token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_verification_token(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.handler
            .encode(&Claims::email_verification(subject, ttl))
    }

    /// Decode and validate any token signed with this codec's secret.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.handler.decode(token)
    }

    /// Decode a token presented as a bearer credential.
    ///
    /// # Errors
    /// * `WrongKind` - Token is tagged or shaped as an email verification token
    /// * any error from [`TokenCodec::decode`]
    pub fn decode_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_as(token, TokenKind::Access)
    }

    /// Decode a token presented to the email verification flow.
    ///
    /// # Errors
    /// * `WrongKind` - Token is tagged or shaped as an access token
    /// * any error from [`TokenCodec::decode`]
    pub fn decode_verification(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_as(token, TokenKind::EmailVerification)
    }

    fn decode_as(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;

        if claims.is_usable_as(kind) {
            Ok(claims)
        } else {
            Err(JwtError::WrongKind)
        }
    }
}
