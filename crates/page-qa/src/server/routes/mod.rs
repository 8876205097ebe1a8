//! API routes for the page QA server

pub mod ask;
pub mod document;
pub mod ingest;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;
use crate::types::RootResponse;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/ingest", post(ingest::ingest_url))
        .route("/ask", post(ask::ask_question))
        .route("/document", get(document::get_document))
}

/// GET / - Liveness message
async fn root() -> Json<RootResponse> {
    Json(RootResponse::default())
}
