//! Stored document summary

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::DocumentStatus;

/// GET /document - Summary of the current document
pub async fn get_document(State(state): State<AppState>) -> Json<DocumentStatus> {
    let status = match state.store().snapshot() {
        Some(document) => DocumentStatus::from(document.as_ref()),
        None => DocumentStatus::empty(),
    };
    Json(status)
}
