use crate::manifest::{manifest, MANIFEST_CACHE_CONTROL, MANIFEST_CONTENT_TYPE};
use axum::{http::header, response::IntoResponse, Json};

/// GET /api/manifest - identical for every caller, so it is publicly cacheable
pub async fn manifest_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE),
            (header::CACHE_CONTROL, MANIFEST_CACHE_CONTROL),
        ],
        Json(manifest()),
    )
}
