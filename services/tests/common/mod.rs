//! Shared test utilities for integration tests.
//!
//! This module provides common test infrastructure including:
//! - `MockSqlStorage` - an in-memory implementation of `SqlStorage` that
//!   mirrors the storage contract (upsert-by-name tags, duplicate
//!   association suppression, per-user scoping, ordering)
//! - Token and app-construction helpers

use linkmark_services::{
    auth::sign_token,
    config::Config,
    database::{
        BookmarkRow, FolderCreate, FolderRow, SqlStorage, SqlStorageError, TAG_SEARCH_LIMIT,
        TagCountRow, TagCreate, TagRow,
    },
    routes,
};
use std::sync::{Arc, Mutex};

/// JWT secret matching `Config::new_for_test`.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-for-local-development";

/// A fixed user id for the primary test identity.
#[allow(dead_code)]
pub const TEST_USER_ID: uuid::Uuid = uuid::Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);

/// A second identity for cross-user scenarios.
#[allow(dead_code)]
pub const OTHER_USER_ID: uuid::Uuid = uuid::Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);

/// Generate a valid bearer token for the given user.
pub fn bearer_for(user_id: uuid::Uuid) -> String {
    sign_token(user_id, TEST_JWT_SECRET, 3600).expect("test token should sign")
}

/// Create the test app router with default test configuration.
pub fn create_test_app(sql_storage: MockSqlStorage) -> axum::Router {
    routes(sql_storage, Config::new_for_test())
}

#[derive(Default)]
struct MockState {
    folders: Vec<FolderRow>,
    tags: Vec<TagRow>,
    bookmarks: Vec<BookmarkRow>,
    /// (bookmark_id, tag_id) association pairs.
    associations: Vec<(uuid::Uuid, uuid::Uuid)>,
    /// Monotonic tick so created_at ordering is deterministic.
    clock: i64,
}

impl MockState {
    fn next_timestamp(&mut self) -> chrono::DateTime<chrono::Utc> {
        self.clock += 1;
        chrono::DateTime::from_timestamp(1_700_000_000 + self.clock, 0)
            .expect("timestamp in range")
    }
}

/// In-memory mock of the storage seam.
#[derive(Clone, Default)]
pub struct MockSqlStorage {
    state: Arc<Mutex<MockState>>,
}

impl MockSqlStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bookmark owned by `user_id`, returning its id.
    #[allow(dead_code)]
    pub fn seed_bookmark(&self, user_id: uuid::Uuid, title: &str) -> uuid::Uuid {
        let mut state = self.state.lock().unwrap();
        let created_at = state.next_timestamp();
        let id = uuid::Uuid::new_v4();
        state.bookmarks.push(BookmarkRow {
            id,
            user_id,
            url: format!("https://example.com/{title}"),
            title: title.to_string(),
            folder_id: None,
            created_at,
        });
        id
    }

    /// Number of association rows currently stored for a pair.
    #[allow(dead_code)]
    pub fn association_rows(&self, bookmark_id: uuid::Uuid, tag_id: uuid::Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state
            .associations
            .iter()
            .filter(|&&pair| pair == (bookmark_id, tag_id))
            .count()
    }
}

/// Undo [`linkmark_services::database::escape_like`] so the mock can match
/// the query as a literal substring, the way ILIKE would.
fn like_unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl SqlStorage for MockSqlStorage {
    async fn is_connected(&self) -> bool {
        true
    }

    async fn folders_create(&self, input: FolderCreate) -> Result<FolderRow, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        let created_at = state.next_timestamp();
        let row = FolderRow {
            id: uuid::Uuid::new_v4(),
            user_id: input.user_id,
            name: input.name,
            created_at,
        };
        state.folders.push(row.clone());
        Ok(row)
    }

    async fn folders_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<FolderRow>, SqlStorageError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<FolderRow> = state
            .folders
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.created_at);
        Ok(rows)
    }

    async fn folders_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> Result<Option<FolderRow>, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        // No ownership filter, by contract.
        match state.folders.iter_mut().find(|f| f.id == id) {
            Some(folder) => {
                folder.name = name;
                Ok(Some(folder.clone()))
            }
            None => Ok(None),
        }
    }

    async fn folders_delete(&self, id: uuid::Uuid) -> Result<bool, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        let before = state.folders.len();
        state.folders.retain(|f| f.id != id);
        Ok(state.folders.len() < before)
    }

    async fn tags_create(&self, input: TagCreate) -> Result<TagRow, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        // Upsert semantics: at most one row per (user_id, name).
        if let Some(existing) = state
            .tags
            .iter()
            .find(|t| t.user_id == input.user_id && t.name == input.name)
        {
            return Ok(existing.clone());
        }
        let created_at = state.next_timestamp();
        let row = TagRow {
            id: uuid::Uuid::new_v4(),
            user_id: input.user_id,
            name: input.name,
            created_at,
        };
        state.tags.push(row.clone());
        Ok(row)
    }

    async fn tags_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<TagRow> = state
            .tags
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn tags_search(
        &self,
        user_id: uuid::Uuid,
        escaped_query: String,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let needle = like_unescape(&escaped_query);
        let state = self.state.lock().unwrap();
        let mut rows: Vec<TagRow> = state
            .tags
            .iter()
            .filter(|t| t.user_id == user_id && t.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.truncate(TAG_SEARCH_LIMIT);
        Ok(rows)
    }

    async fn tags_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> Result<Option<TagRow>, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        // No ownership filter, by contract.
        match state.tags.iter_mut().find(|t| t.id == id) {
            Some(tag) => {
                tag.name = name;
                Ok(Some(tag.clone()))
            }
            None => Ok(None),
        }
    }

    async fn tags_delete(&self, id: uuid::Uuid) -> Result<bool, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tags.len();
        state.tags.retain(|t| t.id != id);
        Ok(state.tags.len() < before)
    }

    async fn bookmark_tags_attach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> Result<(), SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        // Mirror the foreign keys: a dangling reference is a real error,
        // only the duplicate pair is suppressed.
        if !state.bookmarks.iter().any(|b| b.id == bookmark_id) {
            return Err(SqlStorageError::Db(
                "violates foreign key constraint \"bookmark_tags_bookmark_id_fkey\"".to_string(),
            ));
        }
        if !state.tags.iter().any(|t| t.id == tag_id) {
            return Err(SqlStorageError::Db(
                "violates foreign key constraint \"bookmark_tags_tag_id_fkey\"".to_string(),
            ));
        }
        if !state.associations.contains(&(bookmark_id, tag_id)) {
            state.associations.push((bookmark_id, tag_id));
        }
        Ok(())
    }

    async fn bookmark_tags_detach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> Result<bool, SqlStorageError> {
        let mut state = self.state.lock().unwrap();
        let before = state.associations.len();
        state.associations.retain(|&pair| pair != (bookmark_id, tag_id));
        Ok(state.associations.len() < before)
    }

    async fn bookmark_tags_list_for_bookmark(
        &self,
        bookmark_id: uuid::Uuid,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let state = self.state.lock().unwrap();
        let rows = state
            .associations
            .iter()
            .filter(|(b, _)| *b == bookmark_id)
            .filter_map(|(_, tag_id)| state.tags.iter().find(|t| t.id == *tag_id))
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn tag_counts_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<TagCountRow>, SqlStorageError> {
        let state = self.state.lock().unwrap();
        let mut counts: Vec<TagCountRow> = Vec::new();
        for (bookmark_id, tag_id) in &state.associations {
            let owned = state
                .bookmarks
                .iter()
                .any(|b| b.id == *bookmark_id && b.user_id == user_id);
            if !owned {
                continue;
            }
            match counts.iter_mut().find(|c| c.tag_id == *tag_id) {
                Some(entry) => entry.count += 1,
                None => counts.push(TagCountRow {
                    tag_id: *tag_id,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn bookmarks_list_all(&self) -> Result<Vec<BookmarkRow>, SqlStorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.bookmarks.clone())
    }
}
