// tests/postgres_tests.rs
//
// Run against a scratch database:
//   DATABASE_URL=postgres://... cargo test --test postgres_tests -- --ignored

use comment_tree::{
    models::pagination::{SortBy, SortOrder},
    repository::{CommentRepository, PgCommentRepository},
};
use sqlx::postgres::PgPoolOptions;

async fn repo() -> PgCommentRepository {
    // Note: For Postgres, you must have a running database.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    PgCommentRepository::new(pool)
}

/// Random word so concurrent runs against one database don't see each other's rows.
fn marker() -> String {
    format!("marker{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn subtree_carries_depth_and_path() {
    let repo = repo().await;

    let a = repo.create_comment(None, "A").await.unwrap();
    let b = repo.create_comment(Some(a.id), "B").await.unwrap();
    let c = repo.create_comment(Some(b.id), "C").await.unwrap();

    let rows = repo.get_comment_with_children(a.id).await.unwrap();
    let shape: Vec<(i64, i32, Vec<i64>)> = rows
        .iter()
        .map(|row| (row.id(), row.depth, row.path.clone()))
        .collect();

    assert_eq!(
        shape,
        vec![
            (a.id, 0, vec![a.id]),
            (b.id, 1, vec![a.id, b.id]),
            (c.id, 2, vec![a.id, b.id, c.id]),
        ]
    );

    repo.delete_comment_with_children(a.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn delete_cascades_and_reports_missing_targets() {
    let repo = repo().await;

    let a = repo.create_comment(None, "A").await.unwrap();
    let b = repo.create_comment(Some(a.id), "B").await.unwrap();
    let c = repo.create_comment(Some(b.id), "C").await.unwrap();

    repo.delete_comment_with_children(b.id).await.unwrap();

    assert!(repo.comment_exists(a.id).await.is_ok());
    assert!(repo.comment_exists(b.id).await.unwrap_err().is_not_found());
    assert!(repo.comment_exists(c.id).await.unwrap_err().is_not_found());
    assert!(
        repo.delete_comment_with_children(b.id)
            .await
            .unwrap_err()
            .is_not_found()
    );

    repo.delete_comment_with_children(a.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn reply_to_deleted_parent_is_not_found() {
    let repo = repo().await;

    let a = repo.create_comment(None, "A").await.unwrap();
    repo.delete_comment_with_children(a.id).await.unwrap();

    let err = repo.create_comment(Some(a.id), "late").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn search_counts_every_match() {
    let repo = repo().await;
    let word = marker();

    let mut created = Vec::new();
    for i in 0..3 {
        let comment = repo
            .create_comment(None, &format!("{} number {}", word, i))
            .await
            .unwrap();
        created.push(comment.id);
    }

    let (hits, total) = repo
        .search_comments(&word, SortBy::Id, SortOrder::Asc, 2, 0)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), created[..2].to_vec());

    for id in created {
        repo.delete_comment_with_children(id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn trees_for_roots_returns_every_subtree() {
    let repo = repo().await;

    let r1 = repo.create_comment(None, "r1").await.unwrap();
    let r2 = repo.create_comment(None, "r2").await.unwrap();
    repo.create_comment(Some(r1.id), "r1 reply").await.unwrap();
    repo.create_comment(Some(r2.id), "r2 reply").await.unwrap();

    let rows = repo.get_trees_for_roots(&[r1.id, r2.id]).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.depth as usize == row.path.len() - 1));

    assert!(repo.get_trees_for_roots(&[]).await.unwrap().is_empty());

    repo.delete_comment_with_children(r1.id).await.unwrap();
    repo.delete_comment_with_children(r2.id).await.unwrap();
}
