use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    #[schema(example = 12)]
    pub id: i64,
    /// `None` for a root comment.
    #[schema(example = 1)]
    pub parent_id: Option<i64>,
    #[schema(example = "nice picture!!!")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A comment as returned by a recursive traversal: the stored row plus its
/// position in the tree. `depth` and `path` are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentWithPath {
    #[sqlx(flatten)]
    pub comment: Comment,
    /// Zero-based distance from the root.
    pub depth: i32,
    /// Ancestor ids from the root down to this comment, inclusive.
    pub path: Vec<i64>,
}

impl CommentWithPath {
    /// Positions a comment as the anchor of a traversal.
    pub fn anchor(comment: Comment) -> Self {
        let path = vec![comment.id];
        Self {
            comment,
            depth: 0,
            path,
        }
    }

    /// Positions `comment` one level below `parent`.
    pub fn child_of(parent: &CommentWithPath, comment: Comment) -> Self {
        let mut path = Vec::with_capacity(parent.path.len() + 1);
        path.extend_from_slice(&parent.path);
        path.push(comment.id);
        Self {
            comment,
            depth: parent.depth + 1,
            path,
        }
    }

    pub fn id(&self) -> i64 {
        self.comment.id
    }

    /// Id of the tree this row belongs to: `path[0]`, or the row itself at depth 0.
    pub fn root_id(&self) -> i64 {
        if self.depth == 0 {
            return self.comment.id;
        }
        self.path.first().copied().unwrap_or(self.comment.id)
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    /// Optional: the ID of the comment being replied to.
    #[schema(example = 1)]
    pub parent_id: Option<i64>,

    #[serde(default)]
    #[schema(example = "nice picture!!!")]
    pub content: String,
}

/// One node of an assembled comment tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CommentTree {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Absent for flat search hits, which are not positioned in a tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<CommentTree>,
}

impl CommentTree {
    /// A childless node for a comment without tree position (search results).
    pub fn leaf(comment: Comment) -> Self {
        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at,
            depth: None,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CommentTree::size).sum::<usize>()
    }
}

impl From<CommentWithPath> for CommentTree {
    fn from(row: CommentWithPath) -> Self {
        let depth = row.depth;
        Self {
            depth: Some(depth),
            ..CommentTree::leaf(row.comment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, parent_id: Option<i64>) -> Comment {
        Comment {
            id,
            parent_id,
            content: format!("comment {}", id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn path_and_depth_follow_the_ancestor_chain() {
        let a = CommentWithPath::anchor(comment(1, None));
        let b = CommentWithPath::child_of(&a, comment(2, Some(1)));
        let c = CommentWithPath::child_of(&b, comment(3, Some(2)));

        for row in [&a, &b, &c] {
            assert_eq!(row.depth as usize, row.path.len() - 1);
            assert_eq!(row.root_id(), 1);
            assert_eq!(row.path.last().copied(), Some(row.id()));
        }
        assert_eq!(c.path, vec![1, 2, 3]);
    }

    #[test]
    fn anchor_of_a_reply_is_its_own_root() {
        // Subtree fetches anchored at a reply start again at depth 0.
        let anchored = CommentWithPath::anchor(comment(7, Some(3)));
        assert_eq!(anchored.root_id(), 7);
        assert_eq!(anchored.path, vec![7]);
    }

    #[test]
    fn tree_serialization_omits_empty_children_and_missing_depth() {
        let node = CommentTree::leaf(comment(5, Some(4)));
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("depth").is_none());
        assert_eq!(json["parent_id"], 4);

        let root = CommentTree::from(CommentWithPath::anchor(comment(1, None)));
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["depth"], 0);
        assert!(json["parent_id"].is_null());
    }
}
