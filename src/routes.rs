// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{handlers::comment, openapi::ApiDoc, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the v1 comment routes.
/// * Serves Swagger UI and the OpenAPI document when enabled in config.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let comment_routes = Router::new()
        .route("/", get(comment::get_comments).post(comment::create_comment))
        .route("/{id}", delete(comment::delete_comment));

    let mut app = Router::new().nest("/v1/comments", comment_routes);

    if state.config.swagger_enabled {
        app = app.merge(
            SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
