//! Hosted question-answering endpoint
//!
//! Speaks the common inference API shape: the request carries
//! `{"inputs": {"question", "context"}}` and the response is an answer object
//! (or a one-element list of them) with `answer`, `score`, `start`, `end`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::HttpQaConfig;
use crate::error::{Error, Result};

use super::{QaAnswer, QaModel};

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

/// Reply body; an object carrying `error` is a failure even on HTTP 200
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QaResponse {
    Failure(RemoteError),
    One(RemoteAnswer),
    Many(Vec<RemoteAnswer>),
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RemoteAnswer {
    answer: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

impl QaResponse {
    fn into_answer(self) -> Result<QaAnswer> {
        let best = match self {
            QaResponse::Failure(remote) => {
                return Err(Error::model(format!("QA endpoint error: {}", remote.error)))
            }
            QaResponse::One(answer) => Some(answer),
            QaResponse::Many(answers) => answers
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score)),
        };

        Ok(match best {
            Some(remote) => QaAnswer {
                answer: remote.answer,
                score: remote.score,
                start: remote.start,
                end: remote.end,
            },
            None => QaAnswer::empty(),
        })
    }
}

/// QA model served over HTTP
pub struct HttpQaModel {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpQaModel {
    /// Create a new HTTP QA model
    pub fn new(config: &HttpQaConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::Config("QA endpoint is not set".to_string()))?;

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "QA endpoint must start with http:// or https://: {}",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_token: config.api_token.clone(),
        })
    }

    fn post(&self, question: &str, context: &str) -> reqwest::RequestBuilder {
        let request = QaRequest {
            inputs: QaInputs { question, context },
        };

        let builder = self.client.post(&self.endpoint).json(&request);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl QaModel for HttpQaModel {
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let response = self
            .post(question, context)
            .send()
            .await
            .map_err(|e| Error::model(format!("QA request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(Error::model(format!(
                "QA endpoint returned HTTP {}: {}",
                status.as_u16(),
                snippet.trim()
            )));
        }

        let parsed: QaResponse = response
            .json()
            .await
            .map_err(|e| Error::model(format!("Invalid QA response: {}", e)))?;

        parsed.into_answer()
    }

    /// Send a one-word question and check that the endpoint answers it
    async fn health_check(&self) -> Result<bool> {
        match self.post("ping?", "ping").send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
