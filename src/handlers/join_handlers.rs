use super::profile_handlers::{profile_error_message, ProfileFields};
use crate::auth::{
    current_user, decide,
    gate::{DIRECTORY, HOME},
    session, CurrentUser, GateDecision, Requirement,
};
use crate::error::AppError;
use crate::manifest::HeadMetadata;
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::services::{
    AuthServiceError, CreateUserRequest, LoginRequest, UserServiceError,
};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

/// Which half of the join page is showing.
///
/// This only drives what the page displays. Saving the join form is
/// authorized from the session, never from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStep {
    AwaitingLogin,
    Authenticated,
}

impl JoinStep {
    pub fn initial(current: Option<&CurrentUser>) -> Self {
        match current {
            Some(_) => JoinStep::Authenticated,
            None => JoinStep::AwaitingLogin,
        }
    }

    pub fn on_login_success(self) -> Self {
        JoinStep::Authenticated
    }

    pub fn is_awaiting_login(&self) -> bool {
        matches!(self, JoinStep::AwaitingLogin)
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "join.html")]
struct JoinTemplate {
    head: HeadMetadata,
    step: JoinStep,
    email: String,
    fields: ProfileFields,
    error: Option<String>,
    csrf_token: String,
}

#[derive(Deserialize)]
pub struct JoinLoginForm {
    email: String,
    password: String,
    csrf_token: String,
}

#[derive(Deserialize)]
pub struct JoinForm {
    #[serde(flatten)]
    fields: ProfileFields,
    csrf_token: String,
}

async fn render_join(
    session: &Session,
    step: JoinStep,
    email: String,
    fields: ProfileFields,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let template = JoinTemplate {
        head: HeadMetadata::titled("Join"),
        step,
        email,
        fields,
        error: error.map(str::to_string),
        csrf_token: get_or_create_csrf_token(session).await?,
    };
    Ok(template.into_response())
}

/// GET /join
pub async fn join_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let current = current_user(&session, &state.user_service).await?;
    let step = JoinStep::initial(current.as_ref());

    let (email, fields) = match &current {
        Some(identity) => {
            let record = state.user_service.find_user_by_id(identity.id).await?;
            let fields = record.as_ref().map(ProfileFields::from).unwrap_or_default();
            (identity.email.clone(), fields)
        }
        None => (String::new(), ProfileFields::default()),
    };

    render_join(&session, step, email, fields, None).await
}

/// POST /join/login - sign in, or create the account when the email is new
pub async fn join_login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<JoinLoginForm>,
) -> Result<Response, AppError> {
    let step = JoinStep::AwaitingLogin;
    let email = form.email.trim().to_string();

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return render_join(
            &session,
            step,
            email,
            ProfileFields::default(),
            Some("Your form expired. Please try again."),
        )
        .await;
    }

    let existing = state.user_service.find_user_by_email(&email).await?;

    let user = match existing {
        Some(_) => {
            let request = LoginRequest {
                email: email.clone(),
                password: form.password,
            };
            match state.auth_service.authenticate(request).await {
                Ok(user) => user,
                Err(AuthServiceError::RepositoryError(e)) => return Err(e.into()),
                Err(_) => {
                    return render_join(
                        &session,
                        step,
                        email,
                        ProfileFields::default(),
                        Some("Invalid email or password"),
                    )
                    .await
                }
            }
        }
        None => {
            let request = CreateUserRequest {
                email: email.clone(),
                password: form.password,
                password_confirm: None,
                is_admin: false,
            };
            match state.user_service.create_user(request).await {
                Ok(user) => user,
                Err(err) => {
                    let message = match err {
                        UserServiceError::InvalidEmail => "Please enter a valid email address",
                        UserServiceError::WeakPassword => "Password must be at least 8 characters",
                        UserServiceError::EmailTaken => "Email already registered",
                        other => return Err(other.into()),
                    };
                    return render_join(
                        &session,
                        step,
                        email,
                        ProfileFields::default(),
                        Some(message),
                    )
                    .await;
                }
            }
        }
    };

    session::establish(&session, user.id).await?;
    tracing::info!(user_id = user.id, "join login succeeded");

    render_join(
        &session,
        step.on_login_success(),
        user.email.clone(),
        ProfileFields::from(&user),
        None,
    )
    .await
}

/// POST /join - save the new member's profile
pub async fn join_submit_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<JoinForm>,
) -> Result<Response, AppError> {
    let current = current_user(&session, &state.user_service).await?;
    let identity = match (decide(current.as_ref(), Requirement::Member), current) {
        (GateDecision::Render, Some(identity)) => identity,
        (GateDecision::RedirectTo(path), _) => return Ok(Redirect::to(path).into_response()),
        (GateDecision::Render, None) => return Ok(Redirect::to(HOME).into_response()),
    };

    let Some(user) = state.user_service.find_user_by_id(identity.id).await? else {
        return Ok(Redirect::to(HOME).into_response());
    };

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return render_join(
            &session,
            JoinStep::Authenticated,
            user.email,
            form.fields,
            Some("Your form expired. Please try again."),
        )
        .await;
    }

    let fields = form.fields.clone();
    match state
        .user_service
        .update_profile(form.fields.into_request(user.id))
        .await
    {
        Ok(_) => {
            tracing::info!(user_id = user.id, "member joined the directory");
            Ok(Redirect::to(DIRECTORY).into_response())
        }
        Err(UserServiceError::UserNotFound) => Ok(Redirect::to(HOME).into_response()),
        Err(err) => match profile_error_message(&err) {
            Some(message) => {
                render_join(&session, JoinStep::Authenticated, user.email, fields, Some(message))
                    .await
            }
            None => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_step_follows_session() {
        let identity = CurrentUser {
            id: 1,
            email: "a@example.com".to_string(),
            is_admin: false,
        };
        assert_eq!(JoinStep::initial(None), JoinStep::AwaitingLogin);
        assert_eq!(JoinStep::initial(Some(&identity)), JoinStep::Authenticated);
    }

    #[test]
    fn login_success_moves_to_join_form() {
        let step = JoinStep::AwaitingLogin;
        assert!(step.is_awaiting_login());
        assert_eq!(step.on_login_success(), JoinStep::Authenticated);
        assert_eq!(
            JoinStep::Authenticated.on_login_success(),
            JoinStep::Authenticated
        );
    }
}
