// src/openapi.rs

use utoipa::OpenApi;

use crate::{
    handlers::comment,
    models::{
        comment::{Comment, CommentTree, CreateCommentRequest},
        pagination::CommentPage,
    },
};

/// OpenAPI document for the comment API.
#[derive(OpenApi)]
#[openapi(
    info(title = "Comment tree", version = "1.0.0"),
    paths(
        comment::create_comment,
        comment::get_comments,
        comment::delete_comment,
    ),
    components(schemas(Comment, CommentTree, CreateCommentRequest, CommentPage)),
    tags((name = "comments", description = "Threaded comments"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_comment_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/v1/comments"));
        assert!(paths.contains_key("/v1/comments/{id}"));
        assert!(doc["paths"]["/v1/comments"]["get"].is_object());
        assert!(doc["paths"]["/v1/comments"]["post"].is_object());
        assert!(doc["paths"]["/v1/comments/{id}"]["delete"].is_object());
    }
}
