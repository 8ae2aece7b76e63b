use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::{normalize_email, verify_password};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Administrator access required")]
    NotAdmin,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] crate::repositories::user_repository::RepositoryError),
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Like `authenticate`, but only admits administrators.
    pub async fn authenticate_admin(
        &self,
        request: LoginRequest,
    ) -> Result<User, AuthServiceError> {
        let user = self.authenticate(request).await?;
        if !user.is_admin {
            tracing::warn!(user_id = user.id, "non-admin attempted admin login");
            return Err(AuthServiceError::NotAdmin);
        }
        Ok(user)
    }
}
