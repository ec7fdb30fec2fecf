use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::Permissions;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::SecondaryId;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Uniqueness of email and secondary id is checked and the row inserted
/// under one write lock, so concurrent creates behave like the database
/// constraints.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }
        if users.values().any(|u| u.id_troy == user.id_troy) {
            return Err(UserError::SecondaryIdAlreadyExists(
                user.id_troy.as_str().to_string(),
            ));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn find_by_secondary_id(
        &self,
        id_troy: &SecondaryId,
    ) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.id_troy == id_troy)
            .cloned())
    }

    async fn mark_verified(
        &self,
        id: &UserId,
        baseline: &Permissions,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;

        if stored.is_verified {
            return Err(UserError::AlreadyVerified);
        }
        stored.is_verified = true;
        stored.permissions.grant(baseline);

        Ok(stored.clone())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(name) = update.name {
            stored.name = name;
        }
        if let Some(major) = update.major {
            stored.major = Some(major);
        }
        if let Some(class) = update.class {
            stored.class = Some(class);
        }
        if let Some(password_hash) = update.password_hash {
            stored.password_hash = password_hash;
        }

        Ok(stored.clone())
    }

    async fn update_access(
        &self,
        id: &UserId,
        command: UpdateAccessCommand,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(role) = command.role {
            stored.role = role;
        }
        if let Some(permissions) = command.permissions {
            stored.permissions = permissions;
        }

        Ok(stored.clone())
    }

    async fn count(&self) -> Result<i64, UserError> {
        Ok(self.users.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Role;

    fn user(email: &str, id_troy: &str) -> User {
        User {
            id: UserId::new(),
            id_troy: SecondaryId::new(id_troy.to_string()).unwrap(),
            name: "Jane Doe".to_string(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "hash".to_string(),
            major: None,
            class: None,
            role: Role::User,
            permissions: Permissions::new(),
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository
            .create(user("jane@troy.edu", "111111"))
            .await
            .unwrap();

        let by_id = repository.find_by_id(&created.id).await.unwrap();
        let by_email = repository.find_by_email("jane@troy.edu").await.unwrap();
        let by_secondary = repository
            .find_by_secondary_id(&created.id_troy)
            .await
            .unwrap();

        assert_eq!(by_id.as_ref(), Some(&created));
        assert_eq!(by_email.as_ref(), Some(&created));
        assert_eq!(by_secondary.as_ref(), Some(&created));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let repository = InMemoryUserRepository::new();
        repository
            .create(user("jane@troy.edu", "111111"))
            .await
            .unwrap();

        assert!(matches!(
            repository.create(user("jane@troy.edu", "222222")).await,
            Err(UserError::EmailAlreadyExists(_))
        ));
        assert!(matches!(
            repository.create(user("john@troy.edu", "111111")).await,
            Err(UserError::SecondaryIdAlreadyExists(_))
        ));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_same_email() {
        let repository = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move {
                    repository
                        .create(user("jane@troy.edu", &format!("{}", 100000 + i)))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repository = InMemoryUserRepository::new();
        let id = UserId::new();

        assert!(matches!(
            repository.update_profile(&id, ProfileUpdate::default()).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            repository
                .update_access(&id, UpdateAccessCommand::default())
                .await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            repository.mark_verified(&id, &Permissions::new()).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_verified_once() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let id = repository
            .create(user("jane@troy.edu", "111111"))
            .await
            .unwrap()
            .id;
        let baseline = Permissions::from_iter(["document:read"]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = Arc::clone(&repository);
                let baseline = baseline.clone();
                tokio::spawn(async move { repository.mark_verified(&id, &baseline).await })
            })
            .collect();

        let mut verified = 0;
        let mut already_verified = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(user) => {
                    assert!(user.is_verified);
                    assert!(user.permissions.contains("document:read"));
                    verified += 1;
                }
                Err(UserError::AlreadyVerified) => already_verified += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(verified, 1);
        assert_eq!(already_verified, 7);
    }

    #[tokio::test]
    async fn test_partial_updates_keep_other_columns() {
        let repository = InMemoryUserRepository::new();
        let created = repository
            .create(user("jane@troy.edu", "111111"))
            .await
            .unwrap();

        repository
            .update_access(
                &created.id,
                UpdateAccessCommand {
                    role: Some(Role::Admin1),
                    permissions: Some(Permissions::from_iter(["user:read"])),
                },
            )
            .await
            .unwrap();

        let verified = repository
            .mark_verified(&created.id, &Permissions::from_iter(["document:read"]))
            .await
            .unwrap();
        assert_eq!(verified.role, Role::Admin1);
        assert_eq!(verified.permissions.to_vec(), vec!["document:read", "user:read"]);

        let updated = repository
            .update_profile(
                &created.id,
                ProfileUpdate {
                    name: Some("Jane Q. Doe".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Jane Q. Doe");
        assert_eq!(updated.password_hash, "hash");
        assert_eq!(updated.role, Role::Admin1);
        assert!(updated.is_verified);
    }
}
