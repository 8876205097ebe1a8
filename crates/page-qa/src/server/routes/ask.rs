//! Question endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /ask - Answer a question about the current document
pub async fn ask_question(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(request) = payload?;

    let answer = state.service().ask(&request.question).await?;

    Ok(Json(AskResponse {
        answer: answer.text,
    }))
}
