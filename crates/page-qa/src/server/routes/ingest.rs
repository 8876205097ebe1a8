//! Page ingestion endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{IngestRequest, IngestResponse};

/// POST /ingest - Fetch a page and make it the current document
pub async fn ingest_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>> {
    let Json(request) = payload?;

    let outcome = state.service().ingest(&request.url).await?;

    Ok(Json(IngestResponse::new(outcome.preview)))
}
