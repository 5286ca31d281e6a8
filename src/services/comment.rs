use std::{collections::HashMap, sync::Arc};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentTree},
        pagination::{CommentPage, GetCommentsParams},
    },
    repository::CommentRepository,
    utils::tree::assemble_forest,
};

/// Comment use cases on top of a [`CommentRepository`].
///
/// Holds no request state of its own; cloning is cheap.
#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Creates a comment, optionally as a reply.
    ///
    /// A `parent_id` that does not exist fails with `NotFound` before anything is written.
    pub async fn create_comment(
        &self,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment, AppError> {
        if let Some(parent_id) = parent_id {
            self.repo
                .comment_exists(parent_id)
                .await
                .map_err(|e| match e {
                    AppError::NotFound(_) => AppError::NotFound("parent not found".to_string()),
                    other => other.context("CommentService::create_comment"),
                })?;
        }

        let comment = self
            .repo
            .create_comment(parent_id, content)
            .await
            .map_err(|e| e.context("CommentService::create_comment"))?;

        tracing::info!(id = comment.id, parent_id = ?comment.parent_id, "comment created");
        Ok(comment)
    }

    /// Deletes a comment together with every reply below it.
    pub async fn delete_comment_with_children(&self, id: i64) -> Result<(), AppError> {
        self.repo
            .delete_comment_with_children(id)
            .await
            .map_err(|e| e.context("CommentService::delete_comment_with_children"))?;

        tracing::info!(id, "comment subtree deleted");
        Ok(())
    }

    /// Lists comments using the first strategy that applies:
    ///
    /// 1. `search` set: flat page of full-text matches.
    /// 2. `parent_id` set: that comment with its whole subtree. Limit and
    ///    offset are echoed back but not applied.
    /// 3. otherwise: a page of root comments, each with its full subtree.
    pub async fn get_comments(&self, params: &GetCommentsParams) -> Result<CommentPage, AppError> {
        if let Some(search) = params.search.as_deref() {
            tracing::debug!(search, "listing comments by full-text search");
            let (hits, total) = self
                .repo
                .search_comments(search, params.sort_by, params.order, params.limit, params.offset)
                .await
                .map_err(|e| e.context("CommentService::get_comments"))?;

            let comments = hits.into_iter().map(CommentTree::leaf).collect();
            return Ok(CommentPage::new(comments, total, params.limit, params.offset));
        }

        if let Some(parent_id) = params.parent_id {
            tracing::debug!(parent_id, "listing a single comment subtree");
            let rows = self
                .repo
                .get_comment_with_children(parent_id)
                .await
                .map_err(|e| e.context("CommentService::get_comments"))?;

            let total = rows.len() as i64;
            let comments = assemble_forest(rows);
            return Ok(CommentPage::new(comments, total, params.limit, params.offset));
        }

        tracing::debug!(
            limit = params.limit,
            offset = params.offset,
            "listing root comments with their subtrees"
        );
        let (roots, total) = self
            .repo
            .get_root_comments(params.sort_by, params.order, params.limit, params.offset)
            .await
            .map_err(|e| e.context("CommentService::get_comments"))?;

        let root_ids: Vec<i64> = roots.iter().map(|root| root.id).collect();
        let rows = self
            .repo
            .get_trees_for_roots(&root_ids)
            .await
            .map_err(|e| e.context("CommentService::get_comments"))?;

        let mut comments = assemble_forest(rows);

        // Keep the trees in the order of the root page.
        let rank: HashMap<i64, usize> = root_ids
            .iter()
            .enumerate()
            .map(|(pos, id)| (*id, pos))
            .collect();
        comments.sort_by_key(|tree| rank.get(&tree.id).copied().unwrap_or(usize::MAX));

        Ok(CommentPage::new(comments, total, params.limit, params.offset))
    }
}
