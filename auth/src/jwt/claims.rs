use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Purpose a token was issued for.
///
/// Serialized into the `typ` claim so a verification token can never stand
/// in for an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    EmailVerification,
}

/// JWT claim set shared by access and email-verification tokens.
///
/// Access tokens carry `role` and `permissions` as a snapshot taken at
/// issuance. Verification tokens carry `nbf` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Role at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Permission set at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    /// Token purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<TokenKind>,
}

impl Claims {
    /// Create access token claims expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Account email
    /// * `ttl` - Validity window
    /// * `role` - Role name snapshot
    /// * `permissions` - Permission snapshot
    pub fn access(
        subject: impl ToString,
        ttl: Duration,
        role: impl ToString,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
            nbf: None,
            role: Some(role.to_string()),
            permissions: Some(permissions),
            typ: Some(TokenKind::Access),
        }
    }

    /// Create email verification claims valid from now until `ttl` elapses.
    pub fn email_verification(subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            nbf: Some(now.timestamp()),
            role: None,
            permissions: None,
            typ: Some(TokenKind::EmailVerification),
        }
    }

    /// Purpose of these claims.
    ///
    /// Claim sets without a `typ` are classified by shape:
    /// * `role` or `permissions` present - access
    /// * `nbf` present without either - email verification
    /// * `{sub, exp}` only - access
    pub fn kind(&self) -> TokenKind {
        match self.typ {
            Some(typ) => typ,
            None if self.role.is_some() || self.permissions.is_some() => TokenKind::Access,
            None if self.nbf.is_some() => TokenKind::EmailVerification,
            None => TokenKind::Access,
        }
    }

    /// Check whether these claims may be used for the given purpose.
    pub fn is_usable_as(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }
}
