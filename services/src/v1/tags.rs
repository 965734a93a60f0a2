//! Handlers for `/v1/tags/*` and `/v1/bookmarks/{id}/tags/*` endpoints.

use crate::AppState;
use crate::auth::RequireUser;
use crate::database::{self, SqlStorage, TagCreate};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::collections::HashMap;

use super::types::{V1ErrorResponse, V1TagCountsResponse, V1TagItem, V1TagsListResponse};

/// Request body for creating a tag.
#[derive(Debug, Deserialize)]
pub struct V1TagCreateRequest {
    pub name: String,
}

/// Request body for renaming a tag.
#[derive(Debug, Deserialize)]
pub struct V1TagUpdateRequest {
    pub name: String,
}

/// Query parameters for tag search.
#[derive(Debug, Deserialize)]
pub struct V1TagSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Request body for attaching a tag to a bookmark.
#[derive(Debug, Deserialize)]
pub struct V1BookmarkTagAttachRequest {
    pub tag_id: String,
}

// =============================================================================
// Tag Handlers
// =============================================================================

/// List tags for the authenticated user, ascending by name.
///
/// GET /v1/tags
pub async fn list<S>(State(state): State<AppState<S>>, auth: RequireUser) -> impl IntoResponse
where
    S: SqlStorage,
{
    match state.sql_storage.tags_list_for_user(auth.user_id()).await {
        Ok(rows) => {
            let items: Vec<V1TagItem> = rows.into_iter().map(V1TagItem::from).collect();
            let total = items.len();
            (StatusCode::OK, Json(V1TagsListResponse { items, total })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list tags: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to list tags")),
            )
                .into_response()
        }
    }
}

/// Create a tag, or return the existing one with the same normalized name.
///
/// POST /v1/tags
///
/// The name is stored trimmed and lower-cased; creating "JS" and then
/// " js" yields the same row both times. The insert-or-fetch is a single
/// atomic statement in the storage layer, so concurrent calls cannot race
/// a lookup against an insert.
pub async fn create<S>(
    State(state): State<AppState<S>>,
    auth: RequireUser,
    Json(payload): Json<V1TagCreateRequest>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let name = database::normalize_tag_name(&payload.name);
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(V1ErrorResponse::bad_request("Tag name cannot be empty")),
        )
            .into_response();
    }

    let input = TagCreate {
        user_id: auth.user_id(),
        name,
    };

    match state.sql_storage.tags_create(input).await {
        Ok(row) => (StatusCode::CREATED, Json(V1TagItem::from(row))).into_response(),
        Err(e) => {
            tracing::error!("Failed to create tag: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to create tag")),
            )
                .into_response()
        }
    }
}

/// Search tags by name substring, for autocomplete.
///
/// GET /v1/tags/search?q=
///
/// Case-insensitive, scoped to the current user, ascending by name and
/// capped at 10 results. An empty query matches every tag (still capped).
pub async fn search<S>(
    State(state): State<AppState<S>>,
    auth: RequireUser,
    Query(query): Query<V1TagSearchQuery>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let escaped = database::escape_like(&query.q.to_lowercase());

    match state.sql_storage.tags_search(auth.user_id(), escaped).await {
        Ok(rows) => {
            let items: Vec<V1TagItem> = rows.into_iter().map(V1TagItem::from).collect();
            let total = items.len();
            (StatusCode::OK, Json(V1TagsListResponse { items, total })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to search tags: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to search tags")),
            )
                .into_response()
        }
    }
}

/// Per-tag usage counts over the current user's bookmarks.
///
/// GET /v1/tags/counts
///
/// Counts reflect "tag used by my bookmarks": association rows are
/// filtered through the parent bookmark's owner, tag ownership itself is
/// not re-checked. Unused tags are absent rather than zero.
pub async fn counts<S>(State(state): State<AppState<S>>, auth: RequireUser) -> impl IntoResponse
where
    S: SqlStorage,
{
    match state.sql_storage.tag_counts_for_user(auth.user_id()).await {
        Ok(rows) => {
            let counts: HashMap<String, i64> = rows
                .into_iter()
                .map(|row| (row.tag_id.to_string(), row.count))
                .collect();
            (StatusCode::OK, Json(V1TagCountsResponse { counts })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to aggregate tag counts: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error(
                    "Failed to aggregate tag counts",
                )),
            )
                .into_response()
        }
    }
}

/// Rename a tag.
///
/// PATCH /v1/tags/{id}
///
/// The new name is normalized like on create. Matches by id alone;
/// ownership is left to row-level security.
pub async fn update<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
    Json(payload): Json<V1TagUpdateRequest>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let tag_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid tag ID format")),
            )
                .into_response();
        }
    };

    let name = database::normalize_tag_name(&payload.name);
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(V1ErrorResponse::bad_request("Tag name cannot be empty")),
        )
            .into_response();
    }

    match state.sql_storage.tags_update(tag_id, name).await {
        Ok(Some(row)) => (StatusCode::OK, Json(V1TagItem::from(row))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(V1ErrorResponse::not_found("Tag not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update tag: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to update tag")),
            )
                .into_response()
        }
    }
}

/// Delete a tag.
///
/// DELETE /v1/tags/{id}
///
/// Silent no-op for nonexistent ids; no ownership filter (same caveat as
/// update).
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let tag_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid tag ID format")),
            )
                .into_response();
        }
    };

    match state.sql_storage.tags_delete(tag_id).await {
        Ok(removed) => {
            if !removed {
                tracing::debug!(tag_id = %tag_id, "Delete matched no tag row");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to delete tag: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to delete tag")),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Bookmark-Tags Handlers
// =============================================================================

/// List tags attached to a bookmark.
///
/// GET /v1/bookmarks/{id}/tags
///
/// Order is storage-engine-determined; callers must not rely on it.
pub async fn list_for_bookmark<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let bookmark_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid bookmark ID format")),
            )
                .into_response();
        }
    };

    match state
        .sql_storage
        .bookmark_tags_list_for_bookmark(bookmark_id)
        .await
    {
        Ok(rows) => {
            let items: Vec<V1TagItem> = rows.into_iter().map(V1TagItem::from).collect();
            let total = items.len();
            (StatusCode::OK, Json(V1TagsListResponse { items, total })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list bookmark tags: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error(
                    "Failed to list bookmark tags",
                )),
            )
                .into_response()
        }
    }
}

/// Attach a tag to a bookmark.
///
/// POST /v1/bookmarks/{id}/tags
///
/// Attaching an already-attached tag succeeds and leaves exactly one
/// association row.
pub async fn attach<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
    Json(payload): Json<V1BookmarkTagAttachRequest>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let bookmark_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid bookmark ID format")),
            )
                .into_response();
        }
    };

    let tag_id = match uuid::Uuid::parse_str(&payload.tag_id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid tag ID format")),
            )
                .into_response();
        }
    };

    match state
        .sql_storage
        .bookmark_tags_attach(bookmark_id, tag_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Failed to attach tag: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to attach tag")),
            )
                .into_response()
        }
    }
}

/// Detach a tag from a bookmark.
///
/// DELETE /v1/bookmarks/{id}/tags/{tag_id}
///
/// Detaching an absent association is a silent no-op.
pub async fn detach<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path((id, tag_id_str)): Path<(String, String)>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let bookmark_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid bookmark ID format")),
            )
                .into_response();
        }
    };

    let tag_id = match uuid::Uuid::parse_str(&tag_id_str) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid tag ID format")),
            )
                .into_response();
        }
    };

    match state
        .sql_storage
        .bookmark_tags_detach(bookmark_id, tag_id)
        .await
    {
        Ok(removed) => {
            if !removed {
                tracing::debug!(
                    bookmark_id = %bookmark_id,
                    tag_id = %tag_id,
                    "Detach matched no association row"
                );
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to detach tag: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to detach tag")),
            )
                .into_response()
        }
    }
}
