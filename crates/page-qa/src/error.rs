//! Error types for the page QA service

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::response::{ErrorBody, ErrorInfo};

/// Result type alias for page QA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Page QA errors
///
/// Every variant belongs to one caller-visible class: precondition (400),
/// not found (404) or upstream/internal failure (500). The class is only
/// turned into an HTTP status in [`IntoResponse`].
#[derive(Debug, Error)]
pub enum Error {
    /// Ingest was called with an empty URL
    #[error("URL cannot be empty.")]
    EmptyUrl,

    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Target page could not be fetched (network, status, content type)
    #[error("{0}")]
    Fetch(String),

    /// Article extraction failed after a successful fetch
    #[error("Failed to extract article: {0}")]
    Extraction(String),

    /// Page produced no text after cleaning
    #[error("No content found at the URL.")]
    NoContentFound,

    /// Ask was called before any successful ingest
    #[error("No content ingested. Please ingest a URL first.")]
    NoContentIngested,

    /// Ask was called with an empty or whitespace-only question
    #[error("Question cannot be empty.")]
    EmptyQuestion,

    /// QA model returned no usable span
    #[error("No answer found.")]
    NoAnswer,

    /// QA model failed
    #[error("{0}")]
    Model(String),

    /// Malformed request body
    #[error("{0}")]
    BadRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create a model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyUrl
            | Error::InvalidUrl { .. }
            | Error::Fetch(_)
            | Error::NoContentFound
            | Error::NoContentIngested
            | Error::EmptyQuestion
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NoAnswer => StatusCode::NOT_FOUND,
            Error::Extraction(_)
            | Error::Model(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error type
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::EmptyUrl => "empty_url",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Fetch(_) => "fetch_error",
            Error::Extraction(_) => "extraction_error",
            Error::NoContentFound => "no_content_found",
            Error::NoContentIngested => "no_content_ingested",
            Error::EmptyQuestion => "empty_question",
            Error::NoAnswer => "no_answer",
            Error::Model(_) => "model_error",
            Error::BadRequest(_) => "bad_request",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(err: JsonRejection) -> Self {
        Error::BadRequest(err.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        // `detail` is what browser and CLI clients display
        let body = ErrorBody {
            detail: message.clone(),
            error: Some(ErrorInfo {
                kind: self.error_type().to_string(),
                message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(Error::EmptyQuestion.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NoContentIngested.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::fetch("timed out").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NoAnswer.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::model("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::extraction("bad markup").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = Error::model("context too long");
        assert_eq!(err.to_string(), "context too long");
    }
}
