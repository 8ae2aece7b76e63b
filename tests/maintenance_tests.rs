use famdir::{
    db, maintenance,
    repositories::SqliteUserRepository,
    services::{UserService, UserServiceError},
    test_utils::test_helpers,
};
use std::{collections::BTreeSet, sync::Arc};

fn service_for(pool: sqlx::SqlitePool) -> UserService {
    UserService::new(Arc::new(SqliteUserRepository::new(pool)))
}

#[tokio::test]
async fn test_list_users_prints_selected_fields_in_store_order() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_member(&pool, "zed@example.com", "Zed", "Young")
        .await
        .unwrap();
    test_helpers::insert_test_member(&pool, "amy@example.com", "Amy", "Adams")
        .await
        .unwrap();
    test_helpers::insert_test_user(&pool, "admin@example.com", "password123", true)
        .await
        .unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    let count = maintenance::list_users(&service, &mut out).await.unwrap();
    assert_eq!(count, 3);

    let users: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_slice(&out).expect("output to be valid JSON");

    let emails: Vec<&str> = users
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(
        emails,
        vec!["zed@example.com", "amy@example.com", "admin@example.com"]
    );

    let expected: BTreeSet<&str> = ["id", "email", "first_name", "last_name", "is_admin"]
        .into_iter()
        .collect();
    for user in &users {
        let keys: BTreeSet<&str> = user.keys().map(String::as_str).collect();
        assert_eq!(keys, expected);
    }
    assert_eq!(users[2]["is_admin"], true);
}

#[tokio::test]
async fn test_list_users_on_empty_store_prints_empty_array() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    maintenance::list_users(&service, &mut out).await.unwrap();

    let users: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_update_photo_changes_exactly_one_record() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_member(&pool, "ada@example.com", "Ada", "Lovelace")
        .await
        .unwrap();
    test_helpers::insert_test_member(&pool, "alan@example.com", "Alan", "Turing")
        .await
        .unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    maintenance::update_photo(
        &service,
        "ada@example.com",
        "https://photos.example.com/ada.jpg",
        &mut out,
    )
    .await
    .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed.trim(), "Updated profile photo for Ada Lovelace");

    let ada = service
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        ada.profile_photo_url.as_deref(),
        Some("https://photos.example.com/ada.jpg")
    );

    let alan = service
        .find_user_by_email("alan@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alan.profile_photo_url, None);
}

#[tokio::test]
async fn test_update_photo_for_unknown_email_fails() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    let err = maintenance::update_photo(
        &service,
        "nobody@example.com",
        "https://photos.example.com/x.jpg",
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<UserServiceError>(),
        Some(UserServiceError::UserNotFound)
    ));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_show_user_reports_missing_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_member(&pool, "ada@example.com", "Ada", "Lovelace")
        .await
        .unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    assert!(maintenance::show_user(&service, "ada@example.com", &mut out)
        .await
        .unwrap());
    let fields: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(fields["last_name"], "Lovelace");
    assert!(fields.get("password_hash").is_none());

    let mut out = Vec::new();
    assert!(!maintenance::show_user(&service, "ghost@example.com", &mut out)
        .await
        .unwrap());
    assert!(String::from_utf8(out).unwrap().contains("No user"));
}

#[tokio::test]
async fn test_set_admin_and_create_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let mut out = Vec::new();
    maintenance::create_user(
        &service,
        "Mum@Example.com",
        "password123".to_string(),
        false,
        &mut out,
    )
    .await
    .unwrap();

    maintenance::set_admin(&service, "mum@example.com", true, &mut out)
        .await
        .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Created user mum@example.com"));
    assert!(printed.contains("Admin access granted to mum@example.com"));

    let mum = service
        .find_user_by_email("mum@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(mum.is_admin);
}

#[tokio::test]
async fn test_commands_run_inside_scoped_store() {
    let (database_url, _file) = test_helpers::create_test_db_file().await.unwrap();

    let created = db::with_store(&database_url, |pool| async move {
        let service = service_for(pool);
        let mut out = Vec::new();
        maintenance::create_user(
            &service,
            "ada@example.com",
            "password123".to_string(),
            false,
            &mut out,
        )
        .await
    })
    .await
    .unwrap();

    // A second, independent invocation sees the committed write.
    let count = db::with_store(&database_url, |pool| async move {
        let service = service_for(pool);
        let mut out = Vec::new();
        maintenance::list_users(&service, &mut out).await
    })
    .await
    .unwrap();

    assert_eq!(created, 1);
    assert_eq!(count, 1);
}
