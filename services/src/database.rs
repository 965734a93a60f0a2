//! Storage seam for the service.
//!
//! `SqlStorage` is the capability the HTTP handlers consume: table-scoped
//! reads and writes against the relational backend, one round trip per
//! operation. The production implementation lives in [`crate::postgres`];
//! tests substitute an in-memory mock.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use thiserror::Error;

use crate::config::Config;

/// Maximum number of rows returned by a tag search.
pub const TAG_SEARCH_LIMIT: usize = 10;

/// Initialize a PostgreSQL connection pool
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new().connect(config.database_url()).await?;

    tracing::info!("Database connection pool established");

    Ok(pool)
}

/// Error reported by a `SqlStorage` implementation.
///
/// Repository functions perform no local recovery: a failure either maps to
/// an HTTP error at the handler or is one of the two documented
/// suppressions (duplicate tag name, duplicate association), both of which
/// are absorbed inside the implementation and never reach this type.
#[derive(Debug, Error)]
pub enum SqlStorageError {
    #[error("database error: {0}")]
    Db(String),
}

impl From<sqlx::Error> for SqlStorageError {
    fn from(err: sqlx::Error) -> Self {
        SqlStorageError::Db(err.to_string())
    }
}

// =============================================================================
// Rows
// =============================================================================

/// A folder owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FolderRow {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A tag owned by exactly one user. At most one row per (user_id, name);
/// the storage layer enforces the uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagRow {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A bookmark row. The full bookmark lifecycle is owned by a collaborator
/// service; this layer only reads the table and joins against it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookmarkRow {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub url: String,
    pub title: String,
    pub folder_id: Option<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One entry of the per-user tag usage aggregate. Tags with zero qualifying
/// associations produce no row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagCountRow {
    pub tag_id: uuid::Uuid,
    pub count: i64,
}

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a folder. `name` must already be normalized.
#[derive(Debug, Clone)]
pub struct FolderCreate {
    pub user_id: uuid::Uuid,
    pub name: String,
}

/// Input for creating (or idempotently fetching) a tag.
/// `name` must already be normalized.
#[derive(Debug, Clone)]
pub struct TagCreate {
    pub user_id: uuid::Uuid,
    pub name: String,
}

// =============================================================================
// Name normalization
// =============================================================================

/// Normalize a folder name: surrounding whitespace is never stored.
pub fn normalize_folder_name(name: &str) -> String {
    name.trim().to_string()
}

/// Normalize a tag name: trimmed and lower-cased, so "JS" and " js" are
/// the same tag.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Escape LIKE/ILIKE metacharacters so a search query only ever matches as
/// a literal substring.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Storage trait
// =============================================================================

/// Table-scoped storage operations consumed by the `/v1` handlers.
///
/// Methods return `impl Future + Send` so implementations stay usable from
/// axum handlers; implement them with plain `async fn`.
///
/// Ownership filtering is part of each method's contract, not a blanket
/// rule: list operations scope to a user, while `folders_update`,
/// `folders_delete`, `tags_update` and `tags_delete` deliberately match by
/// id alone and trust row-level security at the storage layer.
pub trait SqlStorage: Clone + Send + Sync + 'static {
    /// Whether the backend answers a trivial query.
    fn is_connected(&self) -> impl Future<Output = bool> + Send;

    /// Insert a folder and return the created row.
    fn folders_create(
        &self,
        input: FolderCreate,
    ) -> impl Future<Output = Result<FolderRow, SqlStorageError>> + Send;

    /// All folders for one user, ascending by `created_at` (stable
    /// insertion order). Empty vec when none exist.
    fn folders_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> impl Future<Output = Result<Vec<FolderRow>, SqlStorageError>> + Send;

    /// Rename a folder by id. `None` when the row does not exist.
    fn folders_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> impl Future<Output = Result<Option<FolderRow>, SqlStorageError>> + Send;

    /// Delete a folder by id. Returns whether a row was removed; deleting a
    /// nonexistent id is a successful no-op.
    fn folders_delete(
        &self,
        id: uuid::Uuid,
    ) -> impl Future<Output = Result<bool, SqlStorageError>> + Send;

    /// Atomically insert-or-fetch a tag by (user_id, normalized name).
    /// Calling this twice with the same input returns the same row.
    fn tags_create(
        &self,
        input: TagCreate,
    ) -> impl Future<Output = Result<TagRow, SqlStorageError>> + Send;

    /// All tags for one user, ascending by name.
    fn tags_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> impl Future<Output = Result<Vec<TagRow>, SqlStorageError>> + Send;

    /// Case-insensitive substring search over one user's tag names,
    /// ascending by name, capped at [`TAG_SEARCH_LIMIT`]. The query must
    /// already be LIKE-escaped lowercase (see [`escape_like`]).
    fn tags_search(
        &self,
        user_id: uuid::Uuid,
        escaped_query: String,
    ) -> impl Future<Output = Result<Vec<TagRow>, SqlStorageError>> + Send;

    /// Rename a tag by id. `None` when the row does not exist.
    fn tags_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> impl Future<Output = Result<Option<TagRow>, SqlStorageError>> + Send;

    /// Delete a tag by id. Deleting a nonexistent id is a successful no-op.
    fn tags_delete(
        &self,
        id: uuid::Uuid,
    ) -> impl Future<Output = Result<bool, SqlStorageError>> + Send;

    /// Insert a bookmark↔tag association row. Inserting an existing pair
    /// is a successful no-op (duplicate-key suppression); any other
    /// failure propagates.
    fn bookmark_tags_attach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> impl Future<Output = Result<(), SqlStorageError>> + Send;

    /// Delete an association row; no-op if absent.
    fn bookmark_tags_detach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> impl Future<Output = Result<bool, SqlStorageError>> + Send;

    /// Tags associated with one bookmark via a join fetch. Order is
    /// storage-engine-determined.
    fn bookmark_tags_list_for_bookmark(
        &self,
        bookmark_id: uuid::Uuid,
    ) -> impl Future<Output = Result<Vec<TagRow>, SqlStorageError>> + Send;

    /// Per-tag association counts over bookmarks owned by `user_id`
    /// (inner join against the bookmarks table). Zero-count tags are
    /// absent from the result.
    fn tag_counts_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> impl Future<Output = Result<Vec<TagCountRow>, SqlStorageError>> + Send;

    /// Unfiltered read of the bookmarks table, no user scoping.
    /// Debug/placeholder accessor, not a production read path.
    fn bookmarks_list_all(
        &self,
    ) -> impl Future<Output = Result<Vec<BookmarkRow>, SqlStorageError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_name_is_trimmed() {
        assert_eq!(normalize_folder_name("Work "), "Work");
        assert_eq!(normalize_folder_name("  Reading List  "), "Reading List");
    }

    #[test]
    fn folder_name_case_is_preserved() {
        assert_eq!(normalize_folder_name("Work"), "Work");
    }

    #[test]
    fn tag_name_is_trimmed_and_lowercased() {
        assert_eq!(normalize_tag_name("JS"), "js");
        assert_eq!(normalize_tag_name(" js"), "js");
        assert_eq!(normalize_tag_name("  Rust Lang  "), "rust lang");
    }

    #[test]
    fn escape_like_passes_plain_text_through() {
        assert_eq!(escape_like("rust"), "rust");
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn sqlx_error_maps_to_db_variant() {
        let err: SqlStorageError = sqlx::Error::RowNotFound.into();
        let SqlStorageError::Db(msg) = err;
        assert!(!msg.is_empty());
    }
}
