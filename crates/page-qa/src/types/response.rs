//! Response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Document;

/// Message returned by `GET /`
pub const ROOT_MESSAGE: &str = "Page QA service is running successfully!";

/// Message returned by a successful ingest
pub const INGEST_MESSAGE: &str = "Content ingested successfully!";

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: ROOT_MESSAGE.to_string(),
        }
    }
}

/// `POST /ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    /// Start of the stored text
    pub preview: String,
}

impl IngestResponse {
    pub fn new(preview: impl Into<String>) -> Self {
        Self {
            message: INGEST_MESSAGE.to_string(),
            preview: preview.into(),
        }
    }
}

/// `POST /ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// `GET /document`: summary of the stored document, never its full text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStatus {
    /// Whether a document is loaded
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<DateTime<Utc>>,
    /// Stored characters (0 when empty)
    #[serde(default)]
    pub chars: usize,
    /// Characters before truncation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

impl DocumentStatus {
    /// Status of an empty store
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<&Document> for DocumentStatus {
    fn from(doc: &Document) -> Self {
        Self {
            present: true,
            id: Some(doc.id),
            url: Some(doc.url.clone()),
            title: doc.title.clone(),
            ingested_at: Some(doc.ingested_at),
            chars: doc.char_count(),
            original_chars: Some(doc.original_chars),
            truncated: Some(doc.truncated),
        }
    }
}

/// Error body as sent by the server
///
/// Clients only need `detail`; the structured `error` object is optional so
/// bodies from other proxies still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Structured part of [`ErrorBody`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}
