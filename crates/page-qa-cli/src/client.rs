//! HTTP client for the page QA API

use page_qa::types::{
    AskRequest, AskResponse, DocumentStatus, ErrorBody, IngestRequest, IngestResponse,
    RootResponse,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default server address
pub const DEFAULT_API_URL: &str = "http://localhost:10000";

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{detail}")]
    Api { status: u16, detail: String },
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(_) => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Page QA API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /
    pub async fn root(&self) -> ClientResult<RootResponse> {
        let response = self.http.get(self.url("/")).send().await?;
        read_json(response).await
    }

    /// GET /document
    pub async fn document(&self) -> ClientResult<DocumentStatus> {
        let response = self.http.get(self.url("/document")).send().await?;
        read_json(response).await
    }

    /// POST /ingest
    pub async fn ingest(&self, url: &str) -> ClientResult<IngestResponse> {
        let response = self
            .http
            .post(self.url("/ingest"))
            .json(&IngestRequest::new(url))
            .send()
            .await?;
        read_json(response).await
    }

    /// POST /ask
    pub async fn ask(&self, question: &str) -> ClientResult<AskResponse> {
        let response = self
            .http
            .post(self.url("/ask"))
            .json(&AskRequest::new(question))
            .send()
            .await?;
        read_json(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.bytes().await?;
    Err(ClientError::Api {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

/// Message to show for an error response body
pub fn error_detail(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(br#"{"detail":"Question cannot be empty."}"#),
            "Question cannot be empty."
        );
        assert_eq!(error_detail(b"<html>Bad Gateway</html>"), "Unknown error");
        assert_eq!(error_detail(b""), "Unknown error");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:10000/");
        assert_eq!(client.url("/ask"), "http://localhost:10000/ask");
    }

    #[tokio::test]
    async fn test_ingest_and_ask() {
        let router = Router::new()
            .route(
                "/ingest",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "message": "Content ingested successfully!",
                        "preview": format!("preview of {}", body["url"].as_str().unwrap_or("")),
                    }))
                }),
            )
            .route(
                "/ask",
                post(|| async { Json(json!({"answer": "blue"})) }),
            );
        let client = ApiClient::new(&serve(router).await);

        let ingested = client.ingest("http://example.com").await.unwrap();
        assert_eq!(ingested.preview, "preview of http://example.com");

        let answer = client.ask("What color is the sky?").await.unwrap();
        assert_eq!(answer.answer, "blue");
    }

    #[tokio::test]
    async fn test_api_error_uses_detail() {
        let router = Router::new().route(
            "/ask",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "detail": "No answer found.",
                        "error": {"type": "no_answer", "message": "No answer found."}
                    })),
                )
            }),
        );
        let client = ApiClient::new(&serve(router).await);

        let err = client.ask("Who?").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "No answer found.");
    }

    #[tokio::test]
    async fn test_document_status() {
        let router = Router::new().route(
            "/document",
            get(|| async { Json(json!({"present": false, "chars": 0})) }),
        );
        let client = ApiClient::new(&serve(router).await);

        let status = client.document().await.unwrap();
        assert!(!status.present);
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.root().await.unwrap_err();

        assert!(err.status().is_none());
        assert!(err.to_string().starts_with("Request failed:"));
    }
}
