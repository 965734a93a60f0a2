//! Shared types for V1 API endpoints.

use crate::database::{BookmarkRow, FolderRow, TagRow};
use serde::Serialize;
use std::collections::HashMap;

/// Generic error response for V1 API.
#[derive(Debug, Serialize)]
pub struct V1ErrorResponse {
    pub error: String,
    pub message: String,
}

impl V1ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: "internal_error".to_string(),
            message: message.into(),
        }
    }
}

/// A folder item in API responses.
#[derive(Debug, Serialize)]
pub struct V1FolderItem {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<FolderRow> for V1FolderItem {
    fn from(row: FolderRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Response for listing folders.
#[derive(Debug, Serialize)]
pub struct V1FoldersListResponse {
    pub items: Vec<V1FolderItem>,
    pub total: usize,
}

/// A tag item in API responses.
#[derive(Debug, Serialize)]
pub struct V1TagItem {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<TagRow> for V1TagItem {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Response for listing tags.
#[derive(Debug, Serialize)]
pub struct V1TagsListResponse {
    pub items: Vec<V1TagItem>,
    pub total: usize,
}

/// Response for per-tag usage counts. Tags with zero qualifying
/// associations have no entry.
#[derive(Debug, Serialize)]
pub struct V1TagCountsResponse {
    pub counts: HashMap<String, i64>,
}

/// A bookmark item in API responses.
#[derive(Debug, Serialize)]
pub struct V1BookmarkItem {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub created_at: String,
}

impl From<BookmarkRow> for V1BookmarkItem {
    fn from(row: BookmarkRow) -> Self {
        Self {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            url: row.url,
            title: row.title,
            folder_id: row.folder_id.map(|id| id.to_string()),
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Response for listing bookmarks.
#[derive(Debug, Serialize)]
pub struct V1BookmarksListResponse {
    pub items: Vec<V1BookmarkItem>,
    pub total: usize,
}
