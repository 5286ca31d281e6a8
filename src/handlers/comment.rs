// src/handlers/comment.rs

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CreateCommentRequest},
        pagination::{CommentPage, GetCommentsParams, GetCommentsQuery},
    },
    services::comment::CommentService,
};

/// Create a new comment, optionally as a reply to `parent_id`.
#[utoipa::path(
    post,
    path = "/v1/comments",
    tag = "comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Parent comment does not exist"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn create_comment(
    State(service): State<CommentService>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) =
        payload.map_err(|_| AppError::BadRequest("invalid request body".to_string()))?;

    let comment = service
        .create_comment(payload.parent_id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List comments: search hits, one subtree, or a page of root trees.
#[utoipa::path(
    get,
    path = "/v1/comments",
    tag = "comments",
    params(GetCommentsQuery),
    responses(
        (status = 200, description = "One page of comments", body = CommentPage),
        (status = 400, description = "Malformed parent_id"),
        (status = 404, description = "parent_id does not exist"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn get_comments(
    State(service): State<CommentService>,
    query: Result<Query<GetCommentsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) =
        query.map_err(|_| AppError::BadRequest("invalid query parameters".to_string()))?;

    let params = GetCommentsParams::from(query);
    let page = service.get_comments(&params).await?;

    Ok(Json(page))
}

/// Delete a comment together with all of its replies.
#[utoipa::path(
    delete,
    path = "/v1/comments/{id}",
    tag = "comments",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment and replies deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Comment does not exist"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn delete_comment(
    State(service): State<CommentService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id.map_err(|_| AppError::BadRequest("invalid comment id".to_string()))?;

    service.delete_comment_with_children(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
