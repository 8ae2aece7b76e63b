use crate::models::{ProfileUpdate, User, UserListing};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use chrono::NaiveDate;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 100;
const MAX_URL_LEN: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password too weak (minimum 8 characters)")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("First and last name are required")]
    MissingName,
    #[error("Name is too long")]
    NameTooLong,
    #[error("Birthday must be a date in YYYY-MM-DD format")]
    InvalidBirthday,
    #[error("Photo URL must start with http://, https:// or /")]
    InvalidPhotoUrl,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: Option<String>,
    pub is_admin: bool,
}

/// Raw profile form input; blank optional fields mean "unset".
pub struct UpdateProfileRequest {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub profile_photo_url: String,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;

        if let Some(ref confirm) = request.password_confirm {
            if request.password != *confirm {
                return Err(UserServiceError::PasswordMismatch);
            }
        }

        validate_password(&request.password)?;
        let password_hash = hash_password(&request.password)?;

        match self
            .repository
            .create_user(&email, &password_hash, request.is_admin)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = user.id, "created user account");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Every member, ordered by surname for the directory.
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users().await?)
    }

    pub async fn list_user_listings(&self) -> Result<Vec<UserListing>, UserServiceError> {
        Ok(self.repository.list_user_listings().await?)
    }

    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> Result<User, UserServiceError> {
        let profile = validate_profile(&request)?;

        match self
            .repository
            .update_profile(request.user_id, &profile)
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn update_photo(&self, email: &str, url: &str) -> Result<User, UserServiceError> {
        let url = url.trim();
        if !is_acceptable_photo_url(url) {
            return Err(UserServiceError::InvalidPhotoUrl);
        }

        match self
            .repository
            .update_photo_by_email(&normalize_email(email), url)
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn set_admin(&self, email: &str, is_admin: bool) -> Result<User, UserServiceError> {
        match self
            .repository
            .set_admin_by_email(&normalize_email(email), is_admin)
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        verify_password(password, password_hash)
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if email.is_empty() || !email.contains('@') || email.len() > 255 {
        return Err(UserServiceError::InvalidEmail);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() < 8 {
        return Err(UserServiceError::WeakPassword);
    }
    Ok(())
}

fn validate_profile(request: &UpdateProfileRequest) -> Result<ProfileUpdate, UserServiceError> {
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(UserServiceError::MissingName);
    }
    if first_name.chars().count() > MAX_NAME_LEN || last_name.chars().count() > MAX_NAME_LEN {
        return Err(UserServiceError::NameTooLong);
    }

    let birthday = match request.birthday.trim() {
        "" => None,
        raw => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| UserServiceError::InvalidBirthday)?;
            Some(date.format("%Y-%m-%d").to_string())
        }
    };

    let profile_photo_url = match request.profile_photo_url.trim() {
        "" => None,
        url if is_acceptable_photo_url(url) => Some(url.to_string()),
        _ => return Err(UserServiceError::InvalidPhotoUrl),
    };

    Ok(ProfileUpdate {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        birthday,
        profile_photo_url,
    })
}

fn is_acceptable_photo_url(url: &str) -> bool {
    url.len() <= MAX_URL_LEN
        && (url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/'))
        && !url.chars().any(char::is_whitespace)
}

fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::HashingError(e.to_string()))
}

pub(crate) fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}
