use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::RoleError;
use crate::user::errors::SecondaryIdError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account. The password is only ever held as an
/// Argon2 PHC hash.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub id_troy: SecondaryId,
    pub name: String,
    pub email: EmailAddress,
    pub password_hash: String,
    pub major: Option<String>,
    pub class: Option<String>,
    pub role: Role,
    pub permissions: Permissions,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account bypasses permission checks.
    pub fn is_superuser(&self) -> bool {
        self.role == Role::Admin2
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Human-facing unique account number (`id_troy`).
///
/// Self-registered accounts get either the digits found in their email or a
/// random six digit number. Seeded accounts may use any short alphanumeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecondaryId(String);

impl SecondaryId {
    const MAX_LENGTH: usize = 32;
    const GENERATED_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

    /// Create a validated secondary id.
    ///
    /// # Errors
    /// * `Empty` - Value is empty
    /// * `TooLong` - Value exceeds 32 characters
    /// * `InvalidCharacters` - Value contains anything but ASCII letters and digits
    pub fn new(value: String) -> Result<Self, SecondaryIdError> {
        if value.is_empty() {
            return Err(SecondaryIdError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(SecondaryIdError::TooLong {
                max: Self::MAX_LENGTH,
                actual: value.len(),
            });
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SecondaryIdError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Take the first run of digits in the email's local part, if any.
    ///
    /// `jdoe42x7@troy.edu` yields `42`.
    pub fn from_email(email: &EmailAddress) -> Option<Self> {
        let digits: String = email
            .local_part()
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        Self::new(digits).ok()
    }

    /// Draw a random six digit id.
    pub fn generate() -> Self {
        let value = rand::thread_rng().gen_range(Self::GENERATED_RANGE);
        Self(value.to_string())
    }

    /// Whether this id has the shape produced by [`SecondaryId::generate`].
    pub fn is_generated_format(&self) -> bool {
        self.0
            .parse::<u32>()
            .map_or(false, |n| self.0.len() == 6 && Self::GENERATED_RANGE.contains(&n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecondaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Whether the address ends with `suffix` (e.g. `@troy.edu`).
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    /// Part before the final `@`.
    pub fn local_part(&self) -> &str {
        self.0.rsplit_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account role tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin1,
    /// Superuser: passes every permission check
    Admin2,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin1 => "admin1",
            Role::Admin2 => "admin2",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin1" => Ok(Role::Admin1),
            "admin2" => Ok(Role::Admin2),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unordered set of permission strings such as `document:read`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every permission in `required` is held.
    pub fn contains_all(&self, required: &Permissions) -> bool {
        required.0.is_subset(&self.0)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Add every permission from `other`.
    pub fn grant(&mut self, other: &Permissions) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Command to self-register a new account
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub email: EmailAddress,
    pub password: String,
    pub name: String,
    pub major: Option<String>,
    pub class: Option<String>,
}

/// Command to create a pre-verified account at startup
#[derive(Debug)]
pub struct SeedUserCommand {
    pub email: EmailAddress,
    pub password: String,
    pub name: String,
    pub id_troy: SecondaryId,
    pub role: Role,
}

/// Command to update profile fields of an existing account.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub password: Option<String>,
    pub name: Option<String>,
    pub major: Option<String>,
    pub class: Option<String>,
}

/// Command to change the role and/or permission set of an account.
#[derive(Debug, Default)]
pub struct UpdateAccessCommand {
    pub role: Option<Role>,
    pub permissions: Option<Permissions>,
}

/// Profile columns to overwrite; `None` leaves the stored value untouched.
///
/// Carries an already hashed password, never the plaintext.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub major: Option<String>,
    pub class: Option<String>,
    pub password_hash: Option<String>,
}

/// Bearer token handed out on login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}
