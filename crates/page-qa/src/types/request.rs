//! Request bodies

use serde::{Deserialize, Serialize};

/// Body of `POST /ingest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Page to ingest; a missing field is treated as an empty URL
    #[serde(default)]
    pub url: String,
}

/// Body of `POST /ask`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// Question about the ingested page
    #[serde(default)]
    pub question: String,
}

impl IngestRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}
