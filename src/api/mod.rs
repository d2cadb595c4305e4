mod handlers;
pub mod response;

use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::document::Document;

/// Command endpoint. The path is not significant: a POST anywhere is a command.
pub fn create_router(document: Document) -> Router {
    Router::new()
        .route("/", post(handlers::execute_command))
        .route("/{*path}", post(handlers::execute_command))
        .layer(TraceLayer::new_for_http())
        .with_state(document)
}
