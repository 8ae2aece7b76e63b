use famdir::{
    repositories::user_repository::SqliteUserRepository,
    services::{
        user_service::UserServiceError, AuthService, CreateUserRequest, LoginRequest,
        UpdateProfileRequest, UserService,
    },
    test_utils::test_helpers,
};
use std::sync::Arc;

fn create_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        password: "password123".to_string(),
        password_confirm: Some("password123".to_string()),
        is_admin: false,
    }
}

#[tokio::test]
async fn test_create_user_success() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    let user = service
        .create_user(create_request("test@example.com"))
        .await
        .unwrap();

    assert_eq!(user.email, "test@example.com");
    assert!(!user.is_admin);
    assert!(!user.has_joined());
    assert!(!user.created_at.is_empty());
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    service
        .create_user(create_request("duplicate@example.com"))
        .await
        .unwrap();

    // Emails are the lookup key, so case variants collide too.
    let result = service
        .create_user(create_request("Duplicate@Example.com"))
        .await;
    assert!(matches!(result, Err(UserServiceError::EmailTaken)));
}

#[tokio::test]
async fn test_update_profile_round_trip() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    let user = service
        .create_user(create_request("ada@example.com"))
        .await
        .unwrap();

    let updated = service
        .update_profile(UpdateProfileRequest {
            user_id: user.id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            birthday: "1815-12-10".to_string(),
            profile_photo_url: "https://photos.example.com/ada.jpg".to_string(),
        })
        .await
        .unwrap();

    assert!(updated.has_joined());
    assert_eq!(updated.birthday.as_deref(), Some("1815-12-10"));

    // Blank optional fields clear the stored values.
    let cleared = service
        .update_profile(UpdateProfileRequest {
            user_id: user.id,
            first_name: "Ada".to_string(),
            last_name: "King".to_string(),
            birthday: String::new(),
            profile_photo_url: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(cleared.last_name, "King");
    assert_eq!(cleared.birthday, None);
    assert_eq!(cleared.profile_photo_url, None);
}

#[tokio::test]
async fn test_update_profile_nonexistent_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    let result = service
        .update_profile(UpdateProfileRequest {
            user_id: 99999,
            first_name: "No".to_string(),
            last_name: "Body".to_string(),
            birthday: String::new(),
            profile_photo_url: String::new(),
        })
        .await;

    assert!(matches!(result, Err(UserServiceError::UserNotFound)));
}

#[tokio::test]
async fn test_list_users_sorted_by_surname() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_member(&pool, "zed@example.com", "Zed", "Young")
        .await
        .unwrap();
    test_helpers::insert_test_member(&pool, "amy@example.com", "Amy", "Adams")
        .await
        .unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    let names: Vec<String> = service
        .list_users()
        .await
        .unwrap()
        .iter()
        .map(|u| u.display_name())
        .collect();

    assert_eq!(names, vec!["Amy Adams", "Zed Young"]);
}

#[tokio::test]
async fn test_authenticate_against_store() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "admin@example.com", "password123", true)
        .await
        .unwrap();
    let auth = AuthService::new(Arc::new(SqliteUserRepository::new(pool)));

    let user = auth
        .authenticate_admin(LoginRequest {
            email: "ADMIN@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert!(user.is_admin);

    let result = auth
        .authenticate(LoginRequest {
            email: "admin@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;
    assert!(result.is_err());
}
