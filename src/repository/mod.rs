//! Comment stores.
//!
//! The service only talks to [`CommentRepository`]; the Postgres store is the
//! production backend and the in-memory store backs demos and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentWithPath},
        pagination::{SortBy, SortOrder},
    },
};

pub use memory::InMemoryCommentRepository;
pub use postgres::PgCommentRepository;

/// Storage operations the comment service is built on.
///
/// Traversal results carry `depth` and `path` relative to the anchor(s) and are
/// ordered by path. Implementations assume the stored comments form an acyclic
/// forest.
#[async_trait]
pub trait CommentRepository: Send + Sync + 'static {
    /// Inserts a comment; the store assigns `id` and `created_at`.
    async fn create_comment(&self, parent_id: Option<i64>, content: &str)
    -> Result<Comment, AppError>;

    /// `Ok(())` iff a comment with `id` exists, `NotFound` otherwise.
    async fn comment_exists(&self, id: i64) -> Result<(), AppError>;

    /// The comment `id` and all of its descendants. `NotFound` if `id` does not exist.
    async fn get_comment_with_children(&self, id: i64) -> Result<Vec<CommentWithPath>, AppError>;

    /// Deletes `id` and its whole subtree. `NotFound` if nothing was deleted.
    async fn delete_comment_with_children(&self, id: i64) -> Result<(), AppError>;

    /// One page of full-text matches plus the total match count.
    async fn search_comments(
        &self,
        search: &str,
        sort_by: SortBy,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError>;

    /// One page of root comments plus the total number of roots.
    async fn get_root_comments(
        &self,
        sort_by: SortBy,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError>;

    /// Full subtrees of every id in `root_ids`, in one traversal.
    async fn get_trees_for_roots(&self, root_ids: &[i64])
    -> Result<Vec<CommentWithPath>, AppError>;
}
