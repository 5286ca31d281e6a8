use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentWithPath},
        pagination::{SortBy, SortOrder},
    },
    repository::CommentRepository,
};

/// Recursive traversal from the rows matched by `anchor`.
///
/// Anchors start at depth 0 with `path = [id]`; every reply extends its
/// parent's path by its own id.
fn subtree_query(anchor: &str) -> String {
    format!(
        r#"
        WITH RECURSIVE comment_tree AS (
            SELECT
                id,
                parent_id,
                content,
                created_at,
                0 AS depth,
                ARRAY[id] AS path
            FROM comments
            WHERE {anchor}

            UNION ALL

            SELECT
                c.id,
                c.parent_id,
                c.content,
                c.created_at,
                ct.depth + 1,
                ct.path || c.id
            FROM comments c
            INNER JOIN comment_tree ct ON c.parent_id = ct.id
        )
        SELECT id, parent_id, content, created_at, depth, path
        FROM comment_tree
        ORDER BY path
        "#
    )
}

/// Appends `ORDER BY` for a listing. Ties are broken by id in the same direction.
fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort_by: SortBy, order: SortOrder) {
    builder.push(" ORDER BY ");
    builder.push(sort_by.column());
    builder.push(" ");
    builder.push(order.keyword());
    if sort_by != SortBy::Id {
        builder.push(", id ");
        builder.push(order.keyword());
    }
}

/// Postgres-backed comment store.
#[derive(Debug, Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create_comment(
        &self,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (parent_id, content)
            VALUES ($1, $2)
            RETURNING id, parent_id, content, created_at
            "#,
        )
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The parent was removed after the existence check.
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return AppError::NotFound("parent not found".to_string());
                }
            }
            AppError::from(e).context("PgCommentRepository::create_comment")
        })
    }

    async fn comment_exists(&self, id: i64) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1 FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from(e).context("PgCommentRepository::comment_exists"))?
            .map(|_| ())
            .ok_or(AppError::NotFound("comment not found".to_string()))
    }

    async fn get_comment_with_children(&self, id: i64) -> Result<Vec<CommentWithPath>, AppError> {
        let rows = sqlx::query_as::<_, CommentWithPath>(&subtree_query("id = $1"))
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::from(e).context("PgCommentRepository::get_comment_with_children")
            })?;

        if rows.is_empty() {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        Ok(rows)
    }

    async fn delete_comment_with_children(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM comments WHERE id = $1
                UNION ALL
                SELECT c.id FROM comments c
                INNER JOIN subtree s ON c.parent_id = s.id
            )
            DELETE FROM comments
            WHERE id IN (SELECT id FROM subtree)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from(e).context("PgCommentRepository::delete_comment_with_children"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        tracing::debug!(id, deleted = result.rows_affected(), "deleted comment subtree");
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
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE content_tsv @@ plainto_tsquery('english', $1)",
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).context("PgCommentRepository::search_comments"))?;

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, parent_id, content, created_at FROM comments \
             WHERE content_tsv @@ plainto_tsquery('english', ",
        );
        builder.push_bind(search);
        builder.push(")");
        push_order(&mut builder, sort_by, order);
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let comments = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from(e).context("PgCommentRepository::search_comments"))?;

        Ok((comments, total))
    }

    async fn get_root_comments(
        &self,
        sort_by: SortBy,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from(e).context("PgCommentRepository::get_root_comments"))?;

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, parent_id, content, created_at FROM comments WHERE parent_id IS NULL",
        );
        push_order(&mut builder, sort_by, order);
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let roots = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from(e).context("PgCommentRepository::get_root_comments"))?;

        Ok((roots, total))
    }

    async fn get_trees_for_roots(
        &self,
        root_ids: &[i64],
    ) -> Result<Vec<CommentWithPath>, AppError> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, CommentWithPath>(&subtree_query("id = ANY($1)"))
            .bind(root_ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from(e).context("PgCommentRepository::get_trees_for_roots"))
    }
}
