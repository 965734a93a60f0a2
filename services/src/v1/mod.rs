//! V1 API module containing all versioned API endpoints.
//!
//! This module organizes the V1 API into sub-modules by resource:
//! - `me` - Identity echo endpoint
//! - `folders` - Folder management endpoints
//! - `tags` - Tag management and bookmark-tag association endpoints
//! - `bookmarks` - Unscoped bookmark read (debug accessor)
//! - `types` - Shared types (error responses, list envelopes)

pub mod bookmarks;
pub mod folders;
pub mod me;
pub mod tags;
pub mod types;

use crate::AppState;
use crate::database::SqlStorage;
use axum::{
    Router,
    routing::{delete, get, patch},
};

/// Creates the V1 API router with all endpoints.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: SqlStorage,
{
    Router::new()
        // Me endpoint
        .route("/me", get(me::handler::<S>))
        // Folders endpoints
        .route(
            "/folders",
            get(folders::list::<S>).post(folders::create::<S>),
        )
        .route(
            "/folders/{id}",
            patch(folders::update::<S>).delete(folders::delete::<S>),
        )
        // Tags endpoints
        .route("/tags", get(tags::list::<S>).post(tags::create::<S>))
        .route("/tags/search", get(tags::search::<S>))
        .route("/tags/counts", get(tags::counts::<S>))
        .route(
            "/tags/{id}",
            patch(tags::update::<S>).delete(tags::delete::<S>),
        )
        // Bookmark-Tags endpoints
        .route(
            "/bookmarks/{id}/tags",
            get(tags::list_for_bookmark::<S>).post(tags::attach::<S>),
        )
        .route(
            "/bookmarks/{id}/tags/{tag_id}",
            delete(tags::detach::<S>),
        )
        // Bookmarks (unscoped debug read)
        .route("/bookmarks", get(bookmarks::list_all::<S>))
}
