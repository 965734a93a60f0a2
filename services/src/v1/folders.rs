//! Handlers for `/v1/folders/*` endpoints.

use crate::AppState;
use crate::auth::RequireUser;
use crate::database::{self, FolderCreate, SqlStorage};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::types::{V1ErrorResponse, V1FolderItem, V1FoldersListResponse};

/// Request body for creating a folder.
#[derive(Debug, Deserialize)]
pub struct V1FolderCreateRequest {
    pub name: String,
}

/// Request body for renaming a folder.
#[derive(Debug, Deserialize)]
pub struct V1FolderUpdateRequest {
    pub name: String,
}

/// List folders for the authenticated user.
///
/// GET /v1/folders
///
/// Results are ascending by `created_at`; an empty list is a valid answer.
pub async fn list<S>(State(state): State<AppState<S>>, auth: RequireUser) -> impl IntoResponse
where
    S: SqlStorage,
{
    match state.sql_storage.folders_list_for_user(auth.user_id()).await {
        Ok(rows) => {
            let items: Vec<V1FolderItem> = rows.into_iter().map(V1FolderItem::from).collect();
            let total = items.len();
            (StatusCode::OK, Json(V1FoldersListResponse { items, total })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list folders: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to list folders")),
            )
                .into_response()
        }
    }
}

/// Create a new folder.
///
/// POST /v1/folders
///
/// The name is stored trimmed, never raw.
pub async fn create<S>(
    State(state): State<AppState<S>>,
    auth: RequireUser,
    Json(payload): Json<V1FolderCreateRequest>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let name = database::normalize_folder_name(&payload.name);
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(V1ErrorResponse::bad_request("Folder name cannot be empty")),
        )
            .into_response();
    }

    let input = FolderCreate {
        user_id: auth.user_id(),
        name,
    };

    match state.sql_storage.folders_create(input).await {
        Ok(row) => (StatusCode::CREATED, Json(V1FolderItem::from(row))).into_response(),
        Err(e) => {
            tracing::error!("Failed to create folder: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to create folder")),
            )
                .into_response()
        }
    }
}

/// Rename a folder.
///
/// PATCH /v1/folders/{id}
///
/// Matches by id alone: ownership is not re-verified here, row-level
/// security at the storage layer scopes what the statement can touch.
pub async fn update<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
    Json(payload): Json<V1FolderUpdateRequest>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let folder_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid folder ID format")),
            )
                .into_response();
        }
    };

    let name = database::normalize_folder_name(&payload.name);
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(V1ErrorResponse::bad_request("Folder name cannot be empty")),
        )
            .into_response();
    }

    match state.sql_storage.folders_update(folder_id, name).await {
        Ok(Some(row)) => (StatusCode::OK, Json(V1FolderItem::from(row))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(V1ErrorResponse::not_found("Folder not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update folder: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to update folder")),
            )
                .into_response()
        }
    }
}

/// Delete a folder.
///
/// DELETE /v1/folders/{id}
///
/// Deleting a nonexistent folder is a silent no-op, and ownership is not
/// re-verified (same caveat as update).
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    _auth: RequireUser,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    S: SqlStorage,
{
    let folder_id = match uuid::Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request("Invalid folder ID format")),
            )
                .into_response();
        }
    };

    match state.sql_storage.folders_delete(folder_id).await {
        Ok(removed) => {
            if !removed {
                tracing::debug!(folder_id = %folder_id, "Delete matched no folder row");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to delete folder: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to delete folder")),
            )
                .into_response()
        }
    }
}
