use super::directory_handlers::MemberRow;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::manifest::HeadMetadata;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};

#[derive(Template, WebTemplate)]
#[template(path = "admin_dashboard.html")]
struct AdminDashboardTemplate {
    head: HeadMetadata,
    user_email: String,
    total: usize,
    pending: usize,
    admins: usize,
    members: Vec<MemberRow>,
}

/// GET /admin/dashboard - every account, including those that have not joined yet
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let members: Vec<MemberRow> = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(MemberRow::from)
        .collect();

    let template = AdminDashboardTemplate {
        head: HeadMetadata::titled("Admin"),
        user_email: current.email,
        total: members.len(),
        pending: members.iter().filter(|m| !m.joined).count(),
        admins: members.iter().filter(|m| m.is_admin).count(),
        members,
    };

    Ok(template.into_response())
}
