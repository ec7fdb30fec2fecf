use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for SecondaryId validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecondaryIdError {
    #[error("Secondary id must not be empty")]
    Empty,

    #[error("Secondary id too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Secondary id contains invalid characters (only ASCII letters and digits allowed)")]
    InvalidCharacters,
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0} (expected user, admin1, or admin2)")]
    Unknown(String),
}

/// Error for outbound mail dispatch
#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("Outbound email is not configured")]
    Disabled,

    #[error("Failed to reach mail provider: {0}")]
    ConnectionFailed(String),

    #[error("Mail provider rejected message: {0}")]
    Rejected(String),
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid secondary id: {0}")]
    InvalidSecondaryId(#[from] SecondaryIdError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Registration
    #[error("Registration is only allowed with a {0} email address.")]
    DomainRejected(String),

    #[error("The user with this email already exists in the system.")]
    EmailAlreadyExists(String),

    #[error("Secondary id already exists: {0}")]
    SecondaryIdAlreadyExists(String),

    // Lookup and login
    #[error("User not found")]
    NotFound(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    Inactive,

    #[error("Account not verified. Please check your email.")]
    Unverified,

    // Email verification
    #[error("Invalid or expired verification token")]
    InvalidOrExpiredToken,

    #[error("Email already verified")]
    AlreadyVerified,

    // Outbound mail
    #[error("{0}")]
    MailDelivery(#[from] MailError),

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

}

