use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentWithPath},
        pagination::{SortBy, SortOrder},
    },
    repository::CommentRepository,
};

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    comments: BTreeMap<i64, Comment>,
}

impl Store {
    /// Reply ids per parent, ascending.
    fn children_index(&self) -> HashMap<i64, Vec<i64>> {
        let mut index: HashMap<i64, Vec<i64>> = HashMap::new();
        for comment in self.comments.values() {
            if let Some(parent_id) = comment.parent_id {
                index.entry(parent_id).or_default().push(comment.id);
            }
        }
        index
    }

    /// Preorder traversal from every anchor that exists, ordered by path.
    fn subtrees(&self, anchors: &[i64]) -> Vec<CommentWithPath> {
        let children = self.children_index();
        let mut rows = Vec::new();
        let mut seen = HashSet::new();

        for anchor in anchors {
            let Some(comment) = self.comments.get(anchor) else {
                continue;
            };
            if !seen.insert(*anchor) {
                continue;
            }

            let mut stack = vec![CommentWithPath::anchor(comment.clone())];
            while let Some(row) = stack.pop() {
                if let Some(reply_ids) = children.get(&row.id()) {
                    for reply_id in reply_ids.iter().rev() {
                        if let Some(reply) = self.comments.get(reply_id) {
                            stack.push(CommentWithPath::child_of(&row, reply.clone()));
                        }
                    }
                }
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| a.path.cmp(&b.path));
        rows
    }
}

/// In-process comment store.
///
/// Ids are assigned from a monotonic counter and never reused.
///
/// Search is a plain word match: lower-cased, every query word must appear as
/// a whole word of the content. Unlike the Postgres store there is no stemming
/// and no stopword list, so `pictures` does not find `picture` here while
/// `the` finds anything containing it. A query with no words matches nothing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommentRepository {
    inner: Arc<RwLock<Store>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored comments.
    pub async fn len(&self) -> usize {
        self.inner.read().await.comments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn compare(a: &Comment, b: &Comment, sort_by: SortBy, order: SortOrder) -> Ordering {
    let ordering = match sort_by {
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        SortBy::Id => a.id.cmp(&b.id),
    };
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn page(
    mut comments: Vec<Comment>,
    sort_by: SortBy,
    order: SortOrder,
    limit: i64,
    offset: i64,
) -> (Vec<Comment>, i64) {
    let total = comments.len() as i64;
    comments.sort_by(|a, b| compare(a, b, sort_by, order));
    let page = comments
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// True when every word of `query` occurs as a word of `content`.
fn matches(content: &str, query: &[String]) -> bool {
    if query.is_empty() {
        return false;
    }
    let content: HashSet<String> = words(content).collect();
    query.iter().all(|word| content.contains(word))
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create_comment(
        &self,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment, AppError> {
        let mut store = self.inner.write().await;

        if let Some(parent_id) = parent_id {
            if !store.comments.contains_key(&parent_id) {
                return Err(AppError::NotFound("parent not found".to_string()));
            }
        }

        store.last_id += 1;
        let comment = Comment {
            id: store.last_id,
            parent_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        store.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn comment_exists(&self, id: i64) -> Result<(), AppError> {
        if self.inner.read().await.comments.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound("comment not found".to_string()))
        }
    }

    async fn get_comment_with_children(&self, id: i64) -> Result<Vec<CommentWithPath>, AppError> {
        let rows = self.inner.read().await.subtrees(&[id]);
        if rows.is_empty() {
            return Err(AppError::NotFound("comment not found".to_string()));
        }
        Ok(rows)
    }

    async fn delete_comment_with_children(&self, id: i64) -> Result<(), AppError> {
        let mut store = self.inner.write().await;

        let doomed: Vec<i64> = store.subtrees(&[id]).iter().map(CommentWithPath::id).collect();
        if doomed.is_empty() {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        for comment_id in &doomed {
            store.comments.remove(comment_id);
        }
        tracing::debug!(id, deleted = doomed.len(), "deleted comment subtree");

        Ok(())
    }

    async fn search_comments(
        &self,
        search: &str,
        sort_by: SortBy,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        let query: Vec<String> = words(search).collect();
        let store = self.inner.read().await;
        let hits = store
            .comments
            .values()
            .filter(|comment| matches(&comment.content, &query))
            .cloned()
            .collect();

        Ok(page(hits, sort_by, order, limit, offset))
    }

    async fn get_root_comments(
        &self,
        sort_by: SortBy,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        let store = self.inner.read().await;
        let roots = store
            .comments
            .values()
            .filter(|comment| comment.is_root())
            .cloned()
            .collect();

        Ok(page(roots, sort_by, order, limit, offset))
    }

    async fn get_trees_for_roots(
        &self,
        root_ids: &[i64],
    ) -> Result<Vec<CommentWithPath>, AppError> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.inner.read().await.subtrees(root_ids))
    }
}
