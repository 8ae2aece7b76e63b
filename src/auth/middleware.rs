use super::gate::{decide, GateDecision, Requirement};
use super::session::current_user;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Route layer for member pages. The resolved `CurrentUser` is handed to
/// handlers as a request extension.
pub async fn require_member(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    gate(Requirement::Member, &state, session, request, next).await
}

pub async fn require_admin(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    gate(Requirement::Admin, &state, session, request, next).await
}

async fn gate(
    requirement: Requirement,
    state: &AppState,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match current_user(&session, &state.user_service).await {
        Ok(current) => current,
        Err(e) => return AppError::from(e).into_response(),
    };

    match decide(current.as_ref(), requirement) {
        GateDecision::RedirectTo(path) => {
            tracing::debug!(
                path = %request.uri().path(),
                redirect = path,
                "gate redirected request"
            );
            Redirect::to(path).into_response()
        }
        GateDecision::Render => {
            if let Some(user) = current {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
    }
}
