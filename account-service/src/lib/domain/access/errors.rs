use thiserror::Error;

/// Reason a request was refused by an access gate.
///
/// Token decoding failures are deliberately collapsed into
/// `Unauthenticated`; the specific cause is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("User not found")]
    UserNotFound,

    #[error("Inactive user")]
    Inactive,

    #[error("User has not verified email.")]
    Unverified,

    #[error("You do not have sufficient permissions.")]
    Forbidden,

    #[error("Access check failed: {0}")]
    Internal(String),
}
