//! /v1/me endpoint handler.

use crate::AppState;
use crate::auth::RequireUser;
use crate::database::SqlStorage;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Response for the current-user endpoint.
#[derive(Debug, Serialize)]
pub struct V1MeResponse {
    pub user_id: String,
    pub expires_at: i64,
}

/// Echo the identity the provider token resolves to.
///
/// GET /v1/me
///
/// # Errors
///
/// - 401 Unauthorized: Missing or invalid token
pub async fn handler<S>(State(_state): State<AppState<S>>, auth: RequireUser) -> impl IntoResponse
where
    S: SqlStorage,
{
    (
        StatusCode::OK,
        Json(V1MeResponse {
            user_id: auth.user_id().to_string(),
            expires_at: auth.claims().exp,
        }),
    )
}
