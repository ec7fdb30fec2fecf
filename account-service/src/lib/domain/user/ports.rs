use async_trait::async_trait;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::SecondaryId;
use crate::domain::user::models::SeedUserCommand;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::MailError;
use crate::user::errors::UserError;

/// Port for account domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Self-register a new, unverified account.
    ///
    /// # Arguments
    /// * `command` - Validated email, password, and profile fields
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DomainRejected` - Email does not end with the institutional suffix
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Consume an email verification token.
    ///
    /// # Returns
    /// The verified user with baseline permissions granted
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token failed to decode for any reason
    /// * `NotFound` - Token subject has no account
    /// * `AlreadyVerified` - Account was verified before
    async fn verify_email(&self, token: &str) -> Result<User, UserError>;

    /// Check an email and password pair.
    ///
    /// # Returns
    /// The account if the password matches, `None` if the email is unknown
    /// or the password is wrong
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError>;

    /// Authenticate and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Inactive` - Account is deactivated
    /// * `Unverified` - Email has not been verified yet
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError>;

    /// Retrieve user by secondary id.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user_by_secondary_id(&self, id_troy: &SecondaryId) -> Result<User, UserError>;

    /// Update profile fields and/or password.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Replace role and/or permission set.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_access(
        &self,
        id: &UserId,
        command: UpdateAccessCommand,
    ) -> Result<User, UserError>;

    /// Count registered accounts.
    async fn count_users(&self) -> Result<i64, UserError>;

    /// Create a pre-verified account unless the email is already registered.
    ///
    /// # Returns
    /// `Some(user)` if created, `None` if it already existed
    async fn seed_user(&self, command: SeedUserCommand) -> Result<Option<User>, UserError>;

    /// Send a fixed message to check outbound mail delivery.
    ///
    /// # Errors
    /// * `MailDelivery` - Mail is disabled, the provider was unreachable,
    ///   or it refused the message
    async fn send_test_email(&self, email_to: &EmailAddress) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// Implementations enforce uniqueness of email and secondary id at the
/// storage layer; the service relies on these errors to settle races.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `SecondaryIdAlreadyExists` - Secondary id is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve user by secondary id.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_secondary_id(&self, id_troy: &SecondaryId)
        -> Result<Option<User>, UserError>;

    /// Mark an unverified account verified and grant `baseline`.
    ///
    /// Conditional on the stored flag, so of several concurrent calls for
    /// one account exactly one succeeds.
    ///
    /// # Errors
    /// * `AlreadyVerified` - Account was verified already
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn mark_verified(&self, id: &UserId, baseline: &Permissions)
        -> Result<User, UserError>;

    /// Overwrite the profile columns set in `update`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate)
        -> Result<User, UserError>;

    /// Overwrite role and/or permission set.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_access(
        &self,
        id: &UserId,
        command: UpdateAccessCommand,
    ) -> Result<User, UserError>;

    /// Count stored users.
    async fn count(&self) -> Result<i64, UserError>;
}

/// Outbound email delivery.
#[async_trait]
pub trait MailDispatcher: Send + Sync + 'static {
    /// Whether messages can be delivered at all.
    fn is_enabled(&self) -> bool;

    /// Deliver one HTML message.
    ///
    /// # Errors
    /// * `Disabled` - No provider is configured
    /// * `ConnectionFailed` - Provider could not be reached
    /// * `Rejected` - Provider refused the message
    async fn send(&self, to: &EmailAddress, subject: &str, html_body: &str)
        -> Result<(), MailError>;
}
