use std::sync::Arc;

use async_trait::async_trait;
use auth::AccessGrant;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::config::Config;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::SecondaryId;
use crate::domain::user::models::SeedUserCommand;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::notifications::verification_link;
use crate::domain::user::notifications::TestEmail;
use crate::domain::user::notifications::VerificationEmail;
use crate::user::errors::UserError;
use crate::user::ports::MailDispatcher;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Registration and token policy for the account service.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Required ending of self-registered emails, e.g. `@troy.edu`
    pub allowed_email_suffix: String,
    /// Granted when an account verifies its email
    pub baseline_permissions: Permissions,
    pub access_token_ttl: Duration,
    pub verification_token_ttl: Duration,
    /// Public base URL verification links point at
    pub server_host: String,
    pub project_name: String,
}

impl From<&Config> for AccountSettings {
    fn from(config: &Config) -> Self {
        Self {
            allowed_email_suffix: config.registration.allowed_email_suffix.clone(),
            baseline_permissions: config
                .registration
                .baseline_permissions
                .iter()
                .cloned()
                .collect(),
            access_token_ttl: Duration::minutes(config.jwt.access_token_expire_minutes),
            verification_token_ttl: Duration::hours(config.jwt.email_verification_expire_hours),
            server_host: config.email.server_host.clone(),
            project_name: config.email.project_name.clone(),
        }
    }
}

/// Domain service implementation for account operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, MD>
where
    UR: UserRepository,
    MD: MailDispatcher,
{
    repository: Arc<UR>,
    mailer: Arc<MD>,
    authenticator: Arc<Authenticator>,
    settings: AccountSettings,
}

impl<UR, MD> UserService<UR, MD>
where
    UR: UserRepository,
    MD: MailDispatcher,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `mailer` - Outbound email implementation
    /// * `authenticator` - Password hashing and token signing
    /// * `settings` - Registration and token policy
    pub fn new(
        repository: Arc<UR>,
        mailer: Arc<MD>,
        authenticator: Arc<Authenticator>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            repository,
            mailer,
            authenticator,
            settings,
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.authenticator
            .hash_password(password)
            .map_err(|e| UserError::PasswordHashing(e.to_string()))
    }

    /// Digits from the email if still free, otherwise a random unused id.
    async fn initial_secondary_id(&self, email: &EmailAddress) -> Result<SecondaryId, UserError> {
        if let Some(id_troy) = SecondaryId::from_email(email) {
            if self.repository.find_by_secondary_id(&id_troy).await?.is_none() {
                return Ok(id_troy);
            }
            tracing::debug!(
                id_troy = %id_troy,
                "Secondary id derived from email is taken, generating one"
            );
        }

        self.unused_secondary_id().await
    }

    /// Draw random ids until one is not in the store.
    ///
    /// The store's unique constraint still has the final say when two
    /// registrations draw the same value concurrently.
    async fn unused_secondary_id(&self) -> Result<SecondaryId, UserError> {
        loop {
            let candidate = SecondaryId::generate();
            if self
                .repository
                .find_by_secondary_id(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
    }

    /// Issue a verification token and send it without waiting for delivery.
    fn dispatch_verification_email(&self, user: &User) {
        let token = match self
            .authenticator
            .tokens()
            .issue_verification_token(user.email.as_str(), self.settings.verification_token_ttl)
        {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    "Failed to issue verification token"
                );
                return;
            }
        };

        let link = verification_link(&self.settings.server_host, &token);
        let email = VerificationEmail::new(
            &self.settings.project_name,
            &user.name,
            &link,
            self.settings.verification_token_ttl.num_hours(),
        );

        let mailer = Arc::clone(&self.mailer);
        let to = user.email.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            match mailer.send(&to, &email.subject, &email.html_body).await {
                Ok(()) => tracing::info!(user_id = %user_id, "Verification email sent"),
                Err(e) => tracing::error!(
                    "Failed to send verification email for user {}: {}",
                    user_id,
                    e
                ),
            }
        });
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR, MD> UserServicePort for UserService<UR, MD>
where
    UR: UserRepository,
    MD: MailDispatcher,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if !command.email.has_suffix(&self.settings.allowed_email_suffix) {
            return Err(UserError::DomainRejected(
                self.settings.allowed_email_suffix.clone(),
            ));
        }

        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash_password(&command.password)?;
        let mut id_troy = self.initial_secondary_id(&command.email).await?;

        let created_user = loop {
            let user = User {
                id: UserId::new(),
                id_troy: id_troy.clone(),
                name: command.name.clone(),
                email: command.email.clone(),
                password_hash: password_hash.clone(),
                major: command.major.clone(),
                class: command.class.clone(),
                role: Role::User,
                permissions: Permissions::new(),
                is_active: true,
                is_verified: false,
                created_at: Utc::now(),
            };

            match self.repository.create(user).await {
                Ok(user) => break user,
                Err(UserError::SecondaryIdAlreadyExists(taken)) => {
                    tracing::debug!(id_troy = %taken, "Secondary id collision, retrying");
                    id_troy = self.unused_secondary_id().await?;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            user_id = %created_user.id,
            id_troy = %created_user.id_troy,
            "Account registered"
        );

        if self.mailer.is_enabled() {
            self.dispatch_verification_email(&created_user);
        } else {
            tracing::warn!(
                user_id = %created_user.id,
                "Outbound email disabled, skipping verification email"
            );
        }

        Ok(created_user)
    }

    async fn verify_email(&self, token: &str) -> Result<User, UserError> {
        let claims = self
            .authenticator
            .tokens()
            .decode_verification(token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Email verification token rejected");
                UserError::InvalidOrExpiredToken
            })?;

        let user = self
            .repository
            .find_by_email(&claims.sub)
            .await?
            .ok_or(UserError::NotFound(claims.sub))?;

        if user.is_verified {
            return Err(UserError::AlreadyVerified);
        }

        // The store settles concurrent verifications of the same account
        let verified_user = self
            .repository
            .mark_verified(&user.id, &self.settings.baseline_permissions)
            .await?;
        tracing::info!(user_id = %verified_user.id, "Email verified");

        Ok(verified_user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            return Ok(None);
        };

        if self
            .authenticator
            .verify_password(password, &user.password_hash)
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        // Password first so account state is never revealed to a wrong password
        let grant = AccessGrant {
            subject: user.email.as_str(),
            role: user.role.as_str(),
            permissions: user.permissions.to_vec(),
            ttl: self.settings.access_token_ttl,
        };
        let result = self
            .authenticator
            .authenticate(password, &user.password_hash, grant)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                AuthenticationError::JwtError(err) => UserError::TokenIssuance(err.to_string()),
            })?;

        if !user.is_active {
            return Err(UserError::Inactive);
        }
        if !user.is_verified {
            return Err(UserError::Unverified);
        }

        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(AccessToken::bearer(result.access_token))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find_existing(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFound(email.to_string()))
    }

    async fn get_user_by_secondary_id(&self, id_troy: &SecondaryId) -> Result<User, UserError> {
        self.repository
            .find_by_secondary_id(id_troy)
            .await?
            .ok_or(UserError::NotFound(id_troy.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let password_hash = match command.password.filter(|p| !p.is_empty()) {
            Some(new_password) => Some(self.hash_password(&new_password)?),
            None => None,
        };

        let update = ProfileUpdate {
            name: command.name,
            major: command.major,
            class: command.class,
            password_hash,
        };

        self.repository.update_profile(id, update).await
    }

    async fn update_access(
        &self,
        id: &UserId,
        command: UpdateAccessCommand,
    ) -> Result<User, UserError> {
        let updated_user = self.repository.update_access(id, command).await?;
        tracing::info!(
            user_id = %updated_user.id,
            role = %updated_user.role,
            "Account access changed"
        );

        Ok(updated_user)
    }

    async fn count_users(&self) -> Result<i64, UserError> {
        self.repository.count().await
    }

    async fn seed_user(&self, command: SeedUserCommand) -> Result<Option<User>, UserError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let user = User {
            id: UserId::new(),
            id_troy: command.id_troy,
            name: command.name,
            email: command.email,
            password_hash: self.hash_password(&command.password)?,
            major: None,
            class: None,
            role: command.role,
            permissions: Permissions::new(),
            is_active: true,
            is_verified: true,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            role = %created_user.role,
            "Seed account created"
        );

        Ok(Some(created_user))
    }

    async fn send_test_email(&self, email_to: &EmailAddress) -> Result<(), UserError> {
        let email = TestEmail::new(&self.settings.project_name, email_to.as_str());

        self.mailer
            .send(email_to, &email.subject, &email.html_body)
            .await?;
        tracing::info!("Test email sent");

        Ok(())
    }
}
