use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::SecondaryId;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, id_troy, name, email, password_hash, major, class, role, \
                            permissions, is_active, is_verified, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|r| user_from_row(&r)).transpose()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, UserError> {
    let role: String = row.try_get("role").map_err(database_error)?;
    let permissions: Vec<String> = row.try_get("permissions").map_err(database_error)?;

    Ok(User {
        id: UserId(row.try_get("id").map_err(database_error)?),
        id_troy: SecondaryId::new(row.try_get("id_troy").map_err(database_error)?)?,
        name: row.try_get("name").map_err(database_error)?,
        email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        major: row.try_get("major").map_err(database_error)?,
        class: row.try_get("class").map_err(database_error)?,
        role: role.parse()?,
        permissions: permissions.into_iter().collect::<Permissions>(),
        is_active: row.try_get("is_active").map_err(database_error)?,
        is_verified: row.try_get("is_verified").map_err(database_error)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
    })
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, id_troy, name, email, password_hash, major, class,
                               role, permissions, is_active, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(user.id_troy.as_str())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.major)
        .bind(&user.class)
        .bind(user.role.as_str())
        .bind(user.permissions.to_vec())
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_email_key") {
                        return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                    }
                    if db_err.constraint() == Some("users_id_troy_key") {
                        return UserError::SecondaryIdAlreadyExists(
                            user.id_troy.as_str().to_string(),
                        );
                    }
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.find_one("email", email).await
    }

    async fn find_by_secondary_id(
        &self,
        id_troy: &SecondaryId,
    ) -> Result<Option<User>, UserError> {
        self.find_one("id_troy", id_troy.as_str()).await
    }

    async fn mark_verified(
        &self,
        id: &UserId,
        baseline: &Permissions,
    ) -> Result<User, UserError> {
        let query = format!(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                permissions = ARRAY(SELECT DISTINCT unnest(permissions || $2::TEXT[]))
            WHERE id = $1 AND is_verified = FALSE
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id.0)
            .bind(baseline.to_vec())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        match row {
            Some(row) => user_from_row(&row),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(UserError::AlreadyVerified),
                None => Err(UserError::NotFound(id.to_string())),
            },
        }
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, UserError> {
        let query = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                major = COALESCE($3, major),
                class = COALESCE($4, class),
                password_hash = COALESCE($5, password_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id.0)
            .bind(update.name)
            .bind(update.major)
            .bind(update.class)
            .bind(update.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(|r| user_from_row(&r))
            .transpose()?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_access(
        &self,
        id: &UserId,
        command: UpdateAccessCommand,
    ) -> Result<User, UserError> {
        let query = format!(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                permissions = COALESCE($3, permissions)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id.0)
            .bind(command.role.map(|role| role.as_str()))
            .bind(command.permissions.map(|permissions| permissions.to_vec()))
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(|r| user_from_row(&r))
            .transpose()?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn count(&self) -> Result<i64, UserError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }
}
