use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, warn};
use uuid::Uuid;

pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Tokens older than this are rejected and replaced.
const CSRF_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfToken {
    pub value: String,
    pub created_at: i64,
}

impl CsrfToken {
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() - self.created_at > CSRF_TOKEN_TTL_SECS
    }
}

impl Default for CsrfToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CsrfError {
    #[error("no CSRF token in session")]
    Missing,
    #[error("CSRF token expired")]
    Expired,
    #[error("CSRF token mismatch")]
    Mismatch,
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

fn prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

pub async fn generate_csrf_token(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    let token = CsrfToken::new();
    let value = token.value.clone();

    session.insert(CSRF_TOKEN_KEY, token).await?;

    debug!("Generated new CSRF token: {}", prefix(&value));
    Ok(value)
}

pub async fn get_or_create_csrf_token(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    let token: Option<CsrfToken> = session.get(CSRF_TOKEN_KEY).await?;

    match token {
        Some(existing) if !existing.is_expired() => Ok(existing.value),
        _ => generate_csrf_token(session).await,
    }
}

/// Check a submitted form token against the session and rotate it on success.
pub async fn validate_csrf_form_field(
    session: &Session,
    form_token: &str,
) -> Result<(), CsrfError> {
    let stored: CsrfToken = session
        .get(CSRF_TOKEN_KEY)
        .await?
        .ok_or(CsrfError::Missing)
        .inspect_err(|_| warn!("No CSRF token in session for form validation"))?;

    if stored.is_expired() {
        warn!("CSRF token expired during form validation");
        return Err(CsrfError::Expired);
    }

    if form_token != stored.value {
        warn!(
            "CSRF form token mismatch: expected {}, got {}",
            prefix(&stored.value),
            prefix(form_token)
        );
        return Err(CsrfError::Mismatch);
    }

    generate_csrf_token(session).await?;
    Ok(())
}
