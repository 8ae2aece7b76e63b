use crate::models::{ProfileUpdate, User, UserListing};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, birthday, \
                            profile_photo_url, is_admin, created_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    async fn list_user_listings(&self) -> RepositoryResult<Vec<UserListing>>;
    async fn update_profile(&self, id: i64, profile: &ProfileUpdate) -> RepositoryResult<User>;
    async fn update_photo_by_email(&self, email: &str, url: &str) -> RepositoryResult<User>;
    async fn set_admin_by_email(&self, email: &str, is_admin: bool) -> RepositoryResult<User>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::AlreadyExists
        }
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> RepositoryResult<User> {
        let result =
            sqlx::query("INSERT INTO users (email, password_hash, is_admin) VALUES (?, ?, ?)")
                .bind(email)
                .bind(password_hash)
                .bind(is_admin)
                .execute(&self.pool)
                .await
                .map_err(map_unique_violation)?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY last_name, first_name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn list_user_listings(&self) -> RepositoryResult<Vec<UserListing>> {
        // Store-default order: rowid, i.e. insertion order.
        let rows = sqlx::query_as::<_, UserListing>(
            "SELECT id, email, first_name, last_name, is_admin FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_profile(&self, id: i64, profile: &ProfileUpdate) -> RepositoryResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, birthday = ?, profile_photo_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.birthday)
        .bind(&profile.profile_photo_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn update_photo_by_email(&self, email: &str, url: &str) -> RepositoryResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET profile_photo_url = ? WHERE email = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(url)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    async fn set_admin_by_email(&self, email: &str, is_admin: bool) -> RepositoryResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_admin = ? WHERE email = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(is_admin)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(RepositoryError::NotFound)
    }
}
