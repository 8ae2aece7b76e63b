use super::gate::{decide, GateDecision, Requirement, ADMIN_DASHBOARD, DIRECTORY, HOME};
use super::session::{self, current_user, CurrentUser};
use crate::error::AppError;
use crate::manifest::HeadMetadata;
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::services::{AuthServiceError, LoginRequest};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

const BAD_CSRF: &str = "Your form expired. Please try again.";

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {
    head: HeadMetadata,
    error: Option<String>,
    csrf_token: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_login.html")]
struct AdminLoginTemplate {
    head: HeadMetadata,
    error: Option<String>,
    signed_in_as: Option<String>,
    csrf_token: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
    csrf_token: String,
}

async fn render_index(session: &Session, error: Option<&str>) -> Result<Response, AppError> {
    let template = IndexTemplate {
        head: HeadMetadata::default(),
        error: error.map(str::to_string),
        csrf_token: get_or_create_csrf_token(session).await?,
    };
    Ok(template.into_response())
}

async fn render_admin_login(
    session: &Session,
    current: Option<&CurrentUser>,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let template = AdminLoginTemplate {
        head: HeadMetadata::titled("Admin login"),
        error: error.map(str::to_string),
        signed_in_as: current.map(|user| user.email.clone()),
        csrf_token: get_or_create_csrf_token(session).await?,
    };
    Ok(template.into_response())
}

/// GET / - landing page with the member login form
pub async fn index_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let current = current_user(&session, &state.user_service).await?;
    if let GateDecision::RedirectTo(path) = decide(current.as_ref(), Requirement::Guest) {
        return Ok(Redirect::to(path).into_response());
    }

    render_index(&session, None).await
}

/// POST /login - member login
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return render_index(&session, Some(BAD_CSRF)).await;
    }

    let request = LoginRequest {
        email: form.email,
        password: form.password,
    };

    match state.auth_service.authenticate(request).await {
        Ok(user) => {
            session::establish(&session, user.id).await?;
            tracing::info!(user_id = user.id, "member logged in");
            Ok(Redirect::to(DIRECTORY).into_response())
        }
        Err(AuthServiceError::RepositoryError(e)) => Err(e.into()),
        Err(_) => render_index(&session, Some("Invalid email or password")).await,
    }
}

/// GET /admin-login
pub async fn admin_login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let current = current_user(&session, &state.user_service).await?;
    if let GateDecision::RedirectTo(path) = decide(current.as_ref(), Requirement::AdminLogin) {
        return Ok(Redirect::to(path).into_response());
    }

    render_admin_login(&session, current.as_ref(), None).await
}

/// POST /admin-login
pub async fn admin_login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let current = current_user(&session, &state.user_service).await?;
    if let GateDecision::RedirectTo(path) = decide(current.as_ref(), Requirement::AdminLogin) {
        return Ok(Redirect::to(path).into_response());
    }

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return render_admin_login(&session, current.as_ref(), Some(BAD_CSRF)).await;
    }

    let request = LoginRequest {
        email: form.email,
        password: form.password,
    };

    let error = match state.auth_service.authenticate_admin(request).await {
        Ok(user) => {
            session::establish(&session, user.id).await?;
            tracing::info!(user_id = user.id, "admin logged in");
            return Ok(Redirect::to(ADMIN_DASHBOARD).into_response());
        }
        Err(AuthServiceError::NotAdmin) => "That account does not have admin access",
        Err(AuthServiceError::InvalidCredentials) => "Invalid email or password",
        Err(AuthServiceError::RepositoryError(e)) => return Err(e.into()),
    };

    render_admin_login(&session, current.as_ref(), Some(error)).await
}

/// GET /logout
pub async fn logout_handler(session: Session) -> impl IntoResponse {
    if let Err(e) = session::clear(&session).await {
        tracing::warn!("Failed to clear session on logout: {}", e);
    }
    Redirect::to(HOME)
}
