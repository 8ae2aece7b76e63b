use crate::auth::{self, middleware::{require_admin, require_member}};
use crate::{handlers, middleware::add_security_headers, AppState};
use axum::{middleware, routing::{get, post}, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Every route of the web app. The caller wraps the result in a session layer.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let member_routes = Router::new()
        .route("/directory", get(handlers::directory_page))
        .route(
            "/profile/edit",
            get(handlers::edit_profile_page).post(handlers::update_profile_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_member));

    let admin_routes = Router::new()
        .route("/admin/dashboard", get(handlers::admin_dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/", get(auth::handlers::index_page))
        .route("/login", post(auth::handlers::login_handler))
        .route(
            "/admin-login",
            get(auth::handlers::admin_login_page).post(auth::handlers::admin_login_handler),
        )
        .route("/logout", get(auth::handlers::logout_handler))
        .route(
            "/join",
            get(handlers::join_page).post(handlers::join_submit_handler),
        )
        .route("/join/login", post(handlers::join_login_handler))
        .route("/api/manifest", get(handlers::manifest_handler))
        .merge(member_routes)
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
