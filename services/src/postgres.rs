//! Postgres-backed implementation of [`SqlStorage`].
//!
//! Every operation is a single statement. The two duplicate-key cases the
//! contract suppresses are handled in SQL rather than by error-code
//! inspection: tag creation is an upsert and association insertion is
//! `ON CONFLICT DO NOTHING`, so the unique-constraint race of a
//! check-then-insert never exists here.

use sqlx::PgPool;

use crate::database::{
    BookmarkRow, FolderCreate, FolderRow, SqlStorage, SqlStorageError, TAG_SEARCH_LIMIT,
    TagCountRow, TagCreate, TagRow,
};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SqlStorage for PgStorage {
    async fn is_connected(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn folders_create(&self, input: FolderCreate) -> Result<FolderRow, SqlStorageError> {
        let row = sqlx::query_as::<_, FolderRow>(
            r#"
            INSERT INTO folders (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn folders_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<FolderRow>, SqlStorageError> {
        let rows = sqlx::query_as::<_, FolderRow>(
            r#"
            SELECT id, user_id, name, created_at
            FROM folders
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn folders_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> Result<Option<FolderRow>, SqlStorageError> {
        // Matches by id alone; ownership is left to row-level security.
        let row = sqlx::query_as::<_, FolderRow>(
            r#"
            UPDATE folders
            SET name = $2
            WHERE id = $1
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn folders_delete(&self, id: uuid::Uuid) -> Result<bool, SqlStorageError> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn tags_create(&self, input: TagCreate) -> Result<TagRow, SqlStorageError> {
        // Idempotent per (user_id, name): the no-op DO UPDATE makes the
        // conflicting row visible to RETURNING.
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn tags_list_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn tags_search(
        &self,
        user_id: uuid::Uuid,
        escaped_query: String,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let pattern = format!("%{escaped_query}%");
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1 AND name ILIKE $2
            ORDER BY name ASC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(TAG_SEARCH_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn tags_update(
        &self,
        id: uuid::Uuid,
        name: String,
    ) -> Result<Option<TagRow>, SqlStorageError> {
        // Matches by id alone; ownership is left to row-level security.
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            UPDATE tags
            SET name = $2
            WHERE id = $1
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn tags_delete(&self, id: uuid::Uuid) -> Result<bool, SqlStorageError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn bookmark_tags_attach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> Result<(), SqlStorageError> {
        // An existing association is success, not an error. Foreign-key
        // violations still propagate.
        sqlx::query(
            r#"
            INSERT INTO bookmark_tags (bookmark_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (bookmark_id, tag_id) DO NOTHING
            "#,
        )
        .bind(bookmark_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn bookmark_tags_detach(
        &self,
        bookmark_id: uuid::Uuid,
        tag_id: uuid::Uuid,
    ) -> Result<bool, SqlStorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM bookmark_tags
            WHERE bookmark_id = $1 AND tag_id = $2
            "#,
        )
        .bind(bookmark_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn bookmark_tags_list_for_bookmark(
        &self,
        bookmark_id: uuid::Uuid,
    ) -> Result<Vec<TagRow>, SqlStorageError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            INNER JOIN bookmark_tags bt ON t.id = bt.tag_id
            WHERE bt.bookmark_id = $1
            "#,
        )
        .bind(bookmark_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn tag_counts_for_user(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<TagCountRow>, SqlStorageError> {
        // "Tag used by my bookmarks", not "my tags used": only the parent
        // bookmark's owner is checked.
        let rows = sqlx::query_as::<_, TagCountRow>(
            r#"
            SELECT bt.tag_id, COUNT(*) AS count
            FROM bookmark_tags bt
            INNER JOIN bookmarks b ON b.id = bt.bookmark_id
            WHERE b.user_id = $1
            GROUP BY bt.tag_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn bookmarks_list_all(&self) -> Result<Vec<BookmarkRow>, SqlStorageError> {
        let rows = sqlx::query_as::<_, BookmarkRow>(
            r#"
            SELECT id, user_id, url, title, folder_id, created_at
            FROM bookmarks
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
