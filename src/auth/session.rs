//! Session-backed identity resolution.
//!
//! Login handlers bind a user id to the session with [`establish`]. Every
//! gated page resolves it back to a store record with [`current_user`], so
//! role changes and removals take effect on the next request.

use crate::models::User;
use crate::services::{UserService, UserServiceError};
use tower_sessions::Session;

pub const USER_ID_KEY: &str = "user_id";
pub const AUTH_TIMESTAMP_KEY: &str = "auth_timestamp";

/// The identity and role of the user behind a request, as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Resolve the current user, or `None` when nobody is logged in.
///
/// A session that cannot be read, or whose user no longer exists, is
/// anonymous. Store failures propagate.
pub async fn current_user(
    session: &Session,
    users: &UserService,
) -> Result<Option<CurrentUser>, UserServiceError> {
    let user_id = match session.get::<i64>(USER_ID_KEY).await {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::warn!("Failed to read session identity: {}", e);
            return Ok(None);
        }
    };

    let Some(user) = users.find_user_by_id(user_id).await? else {
        tracing::debug!(user_id, "session refers to a user that no longer exists");
        return Ok(None);
    };

    Ok(Some(CurrentUser::from(&user)))
}

/// Bind `user_id` to the session, rotating the session id first.
pub async fn establish(
    session: &Session,
    user_id: i64,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    session
        .insert(AUTH_TIMESTAMP_KEY, chrono::Utc::now().timestamp())
        .await?;
    tracing::debug!(user_id, "session established");
    Ok(())
}

pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteUserRepository;
    use crate::test_utils::test_helpers;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn new_session() -> Session {
        let store = Arc::new(MemoryStore::default());
        Session::new(None, store, None)
    }

    async fn service() -> (UserService, sqlx::SqlitePool) {
        let pool = test_helpers::create_test_db().await.unwrap();
        let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        (UserService::new(repository), pool)
    }

    #[tokio::test]
    async fn empty_session_has_no_user() {
        let (users, _pool) = service().await;
        let session = new_session();
        assert_eq!(current_user(&session, &users).await.unwrap(), None);
    }

    #[tokio::test]
    async fn established_user_resolves_from_store() {
        let (users, pool) = service().await;
        let id = test_helpers::insert_test_user(&pool, "mum@example.com", "password123", true)
            .await
            .unwrap();
        let session = new_session();

        establish(&session, id).await.unwrap();

        assert_eq!(
            current_user(&session, &users).await.unwrap(),
            Some(CurrentUser {
                id,
                email: "mum@example.com".to_string(),
                is_admin: true,
            })
        );
        assert!(session
            .get::<i64>(AUTH_TIMESTAMP_KEY)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn role_changes_apply_to_live_sessions() {
        let (users, pool) = service().await;
        let id = test_helpers::insert_test_user(&pool, "mum@example.com", "password123", true)
            .await
            .unwrap();
        let session = new_session();
        establish(&session, id).await.unwrap();

        users.set_admin("mum@example.com", false).await.unwrap();

        let current = current_user(&session, &users).await.unwrap().unwrap();
        assert!(!current.is_admin);
    }

    #[tokio::test]
    async fn unknown_user_id_is_anonymous() {
        let (users, _pool) = service().await;
        let session = new_session();
        session.insert(USER_ID_KEY, 42_i64).await.unwrap();
        assert_eq!(current_user(&session, &users).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_logs_out() {
        let (users, pool) = service().await;
        let id = test_helpers::insert_test_user(&pool, "kid@example.com", "password123", false)
            .await
            .unwrap();
        let session = new_session();
        establish(&session, id).await.unwrap();

        clear(&session).await.unwrap();

        assert_eq!(current_user(&session, &users).await.unwrap(), None);
    }
}
