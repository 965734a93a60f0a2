//! /v1/bookmarks endpoint handlers.

use crate::AppState;
use crate::auth::RequireUser;
use crate::database::SqlStorage;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use super::types::{V1BookmarkItem, V1BookmarksListResponse, V1ErrorResponse};

/// List every bookmark row, without user scoping.
///
/// GET /v1/bookmarks
///
/// Debug/placeholder accessor kept for parity with the front end; the
/// production read path for bookmarks lives in a collaborator service.
pub async fn list_all<S>(State(state): State<AppState<S>>, _auth: RequireUser) -> impl IntoResponse
where
    S: SqlStorage,
{
    match state.sql_storage.bookmarks_list_all().await {
        Ok(rows) => {
            let items: Vec<V1BookmarkItem> = rows.into_iter().map(V1BookmarkItem::from).collect();
            let total = items.len();
            (
                StatusCode::OK,
                Json(V1BookmarksListResponse { items, total }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list bookmarks: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to list bookmarks")),
            )
                .into_response()
        }
    }
}
