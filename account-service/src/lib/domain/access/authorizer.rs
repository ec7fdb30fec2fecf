use std::sync::Arc;

use auth::Authenticator;

use crate::domain::access::errors::AccessError;
use crate::domain::access::gate::AccessGate;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// Resolves a bearer token to the current account and runs a gate on it.
///
/// The account is always re-read from storage so that role, permission
/// and status changes take effect before the token expires.
pub struct Authorizer<US>
where
    US: UserServicePort,
{
    user_service: Arc<US>,
    authenticator: Arc<Authenticator>,
}

impl<US> Clone for Authorizer<US>
where
    US: UserServicePort,
{
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl<US> Authorizer<US>
where
    US: UserServicePort,
{
    pub fn new(user_service: Arc<US>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            user_service,
            authenticator,
        }
    }

    /// Decode `token`, load its subject and evaluate `gate`.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is malformed, expired, badly signed or not an access token
    /// * `UserNotFound` - Token subject no longer has an account
    /// * Whatever the first failing check of `gate` returns
    pub async fn authorize(&self, token: &str, gate: &AccessGate) -> Result<User, AccessError> {
        let claims = self
            .authenticator
            .tokens()
            .decode_access(token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Access token rejected");
                AccessError::Unauthenticated
            })?;

        let user = self
            .user_service
            .get_user_by_email(&claims.sub)
            .await
            .map_err(|e| match e {
                UserError::NotFound(_) => AccessError::UserNotFound,
                other => {
                    tracing::error!(error = %other, "Failed to load token subject");
                    AccessError::Internal(other.to_string())
                }
            })?;

        gate.evaluate(&user)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::PasswordHasher;
    use chrono::Duration;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::access::checks::tests::user;
    use crate::domain::user::models::AccessToken;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::RegisterUserCommand;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::SecondaryId;
    use crate::domain::user::models::SeedUserCommand;
    use crate::domain::user::models::UpdateAccessCommand;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::UserId;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;
            async fn verify_email(&self, token: &str) -> Result<User, UserError>;
            async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError>;
            async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError>;
            async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
            async fn get_user_by_email(&self, email: &str) -> Result<User, UserError>;
            async fn get_user_by_secondary_id(&self, id_troy: &SecondaryId) -> Result<User, UserError>;
            async fn update_user(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError>;
            async fn update_access(&self, id: &UserId, command: UpdateAccessCommand) -> Result<User, UserError>;
            async fn count_users(&self) -> Result<i64, UserError>;
            async fn seed_user(&self, command: SeedUserCommand) -> Result<Option<User>, UserError>;
            async fn send_test_email(&self, email_to: &EmailAddress) -> Result<(), UserError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        Arc::new(Authenticator::with_hasher(SECRET, hasher))
    }

    fn access_token(authenticator: &Authenticator, subject: &str) -> String {
        authenticator
            .tokens()
            .issue_access_token(subject, Duration::minutes(5), "user", vec![])
            .unwrap()
    }

    #[tokio::test]
    async fn test_authorize_uses_stored_account() {
        let mut user_service = MockTestUserService::new();

        // Token carries no permissions; the stored account does
        let stored = user(Role::User, &["user:read"]);
        user_service
            .expect_get_user_by_email()
            .with(eq("jane@troy.edu"))
            .times(1)
            .returning(move |_| Ok(stored.clone()));

        let authenticator = authenticator();
        let authorizer = Authorizer::new(Arc::new(user_service), Arc::clone(&authenticator));
        let token = access_token(&authenticator, "jane@troy.edu");

        let gate = AccessGate::require_permissions(["user:read"].into_iter().collect());
        let user = authorizer.authorize(&token, &gate).await.unwrap();

        assert_eq!(user.email.as_str(), "jane@troy.edu");
    }

    #[tokio::test]
    async fn test_authorize_rejects_bad_tokens() {
        let mut user_service = MockTestUserService::new();
        user_service.expect_get_user_by_email().times(0);

        let authenticator = authenticator();
        let authorizer = Authorizer::new(Arc::new(user_service), Arc::clone(&authenticator));

        let expired = authenticator
            .tokens()
            .issue_access_token("jane@troy.edu", Duration::seconds(-1), "user", vec![])
            .unwrap();
        let verification = authenticator
            .tokens()
            .issue_verification_token("jane@troy.edu", Duration::hours(1))
            .unwrap();

        for token in [expired.as_str(), verification.as_str(), "not.a.jwt", ""] {
            let result = authorizer.authorize(token, &AccessGate::active()).await;
            assert_eq!(result.unwrap_err(), AccessError::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn test_authorize_unknown_subject() {
        let mut user_service = MockTestUserService::new();
        user_service
            .expect_get_user_by_email()
            .returning(|email| Err(UserError::NotFound(email.to_string())));

        let authenticator = authenticator();
        let authorizer = Authorizer::new(Arc::new(user_service), Arc::clone(&authenticator));
        let token = access_token(&authenticator, "ghost@troy.edu");

        let result = authorizer.authorize(&token, &AccessGate::active()).await;
        assert_eq!(result.unwrap_err(), AccessError::UserNotFound);
    }

    #[tokio::test]
    async fn test_authorize_runs_gate() {
        let mut user_service = MockTestUserService::new();

        let mut stored = user(Role::User, &[]);
        stored.is_verified = false;
        user_service
            .expect_get_user_by_email()
            .returning(move |_| Ok(stored.clone()));

        let authenticator = authenticator();
        let authorizer = Authorizer::new(Arc::new(user_service), Arc::clone(&authenticator));
        let token = access_token(&authenticator, "jane@troy.edu");

        assert!(authorizer.authorize(&token, &AccessGate::active()).await.is_ok());
        assert_eq!(
            authorizer
                .authorize(&token, &AccessGate::active_verified())
                .await
                .unwrap_err(),
            AccessError::Unverified
        );
    }
}
