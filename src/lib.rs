pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod maintenance;
pub mod manifest;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Shared fixtures for unit and integration tests.
pub mod test_utils;

use repositories::SqliteUserRepository;
use services::{AuthService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Wire the services over the given store handle.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool));

        Self {
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository)),
        }
    }
}
