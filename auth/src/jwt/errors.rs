use thiserror::Error;

/// Error type for JWT operations.
///
/// Decode failures keep their cause for server-side logging. Callers facing
/// the token bearer collapse them into one generic outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,

    #[error("Token was not issued for this purpose")]
    WrongKind,
}
