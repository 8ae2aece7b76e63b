use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::manifest::HeadMetadata;
use crate::models::User;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::NaiveDate;

/// One family member as shown in the directory and admin dashboard.
pub struct MemberRow {
    pub name: String,
    pub email: String,
    pub birthday: Option<String>,
    pub photo_url: Option<String>,
    pub is_admin: bool,
    pub joined: bool,
    pub created_at: String,
}

impl From<User> for MemberRow {
    fn from(user: User) -> Self {
        Self {
            name: user.display_name(),
            joined: user.has_joined(),
            birthday: user.birthday.as_deref().and_then(format_birthday),
            email: user.email,
            photo_url: user.profile_photo_url,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// "1906-12-09" -> "9 December 1906"
fn format_birthday(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%-d %B %Y").to_string())
}

#[derive(Template, WebTemplate)]
#[template(path = "directory.html")]
struct DirectoryTemplate {
    head: HeadMetadata,
    user_email: String,
    is_admin: bool,
    members: Vec<MemberRow>,
}

/// GET /directory - the family contact list
pub async fn directory_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let members = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .filter(User::has_joined)
        .map(MemberRow::from)
        .collect();

    let template = DirectoryTemplate {
        head: HeadMetadata::titled("Directory"),
        user_email: current.email,
        is_admin: current.is_admin,
        members,
    };

    Ok(template.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birthdays_are_formatted_for_humans() {
        assert_eq!(
            format_birthday("1906-12-09").as_deref(),
            Some("9 December 1906")
        );
        assert_eq!(format_birthday("garbage"), None);
    }
}
