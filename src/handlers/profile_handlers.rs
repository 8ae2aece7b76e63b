use crate::auth::{gate::HOME, CurrentUser};
use crate::error::AppError;
use crate::manifest::HeadMetadata;
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::models::User;
use crate::services::{UpdateProfileRequest, UserServiceError};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use tower_sessions::Session;

/// Values shown in the profile fields of the edit and join forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub profile_photo_url: String,
}

impl From<&User> for ProfileFields {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birthday: user.birthday.clone().unwrap_or_default(),
            profile_photo_url: user.profile_photo_url.clone().unwrap_or_default(),
        }
    }
}

impl ProfileFields {
    pub fn into_request(self, user_id: i64) -> UpdateProfileRequest {
        UpdateProfileRequest {
            user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            birthday: self.birthday,
            profile_photo_url: self.profile_photo_url,
        }
    }
}

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(flatten)]
    fields: ProfileFields,
    csrf_token: String,
}

#[derive(Deserialize)]
pub struct ProfileQuery {
    saved: Option<bool>,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile_edit.html")]
struct ProfileEditTemplate {
    head: HeadMetadata,
    email: String,
    fields: ProfileFields,
    saved: bool,
    error: Option<String>,
    csrf_token: String,
}

/// Human-readable message for a rejected profile submission.
pub fn profile_error_message(err: &UserServiceError) -> Option<&'static str> {
    match err {
        UserServiceError::MissingName => Some("Please enter your first and last name"),
        UserServiceError::NameTooLong => Some("Names must be 100 characters or fewer"),
        UserServiceError::InvalidBirthday => Some("Birthday must be a valid date"),
        UserServiceError::InvalidPhotoUrl => {
            Some("Photo URL must be a web address starting with http:// or https://")
        }
        _ => None,
    }
}

async fn render_form(
    session: &Session,
    email: String,
    fields: ProfileFields,
    saved: bool,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let template = ProfileEditTemplate {
        head: HeadMetadata::titled("Edit profile"),
        email,
        fields,
        saved,
        error: error.map(str::to_string),
        csrf_token: get_or_create_csrf_token(session).await?,
    };
    Ok(template.into_response())
}

/// GET /profile/edit
pub async fn edit_profile_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    session: Session,
    Query(query): Query<ProfileQuery>,
) -> Result<Response, AppError> {
    let Some(user) = state.user_service.find_user_by_id(current.id).await? else {
        tracing::debug!(user_id = current.id, "no store record for session identity");
        return Ok(Redirect::to(HOME).into_response());
    };

    render_form(
        &session,
        user.email.clone(),
        ProfileFields::from(&user),
        query.saved.unwrap_or(false),
        None,
    )
    .await
}

/// POST /profile/edit
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let Some(user) = state.user_service.find_user_by_id(current.id).await? else {
        return Ok(Redirect::to(HOME).into_response());
    };

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return render_form(
            &session,
            user.email,
            form.fields,
            false,
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
            tracing::info!(user_id = user.id, "profile updated");
            Ok(Redirect::to("/profile/edit?saved=true").into_response())
        }
        Err(UserServiceError::UserNotFound) => Ok(Redirect::to(HOME).into_response()),
        Err(err) => match profile_error_message(&err) {
            Some(message) => render_form(&session, user.email, fields, false, Some(message)).await,
            None => Err(err.into()),
        },
    }
}
