//! Extractive question answering
//!
//! The service only depends on the [`QaModel`] trait; the concrete backend is
//! chosen from configuration at startup.

pub mod http;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod span;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{QaBackend, QaConfig};
#[cfg(not(feature = "onnx"))]
use crate::error::Error;
use crate::error::Result;

pub use http::HttpQaModel;
#[cfg(feature = "onnx")]
pub use onnx::OnnxQaModel;

/// Answer span selected by a model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QaAnswer {
    /// Answer text; empty when the model found no confident span
    pub answer: String,
    /// Model confidence
    pub score: f32,
    /// Byte offset of the answer in the context
    pub start: Option<usize>,
    /// Byte offset just past the answer in the context
    pub end: Option<usize>,
}

impl QaAnswer {
    /// Create an answer without span information
    pub fn new(answer: impl Into<String>, score: f32) -> Self {
        Self {
            answer: answer.into(),
            score,
            start: None,
            end: None,
        }
    }

    /// The "no confident span" answer
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the answer carries usable text
    pub fn is_empty(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// Trait for extractive QA models
///
/// Implementations:
/// - `OnnxQaModel`: local DistilBERT-SQuAD style ONNX model
/// - `HttpQaModel`: hosted question-answering inference endpoint
#[async_trait]
pub trait QaModel: Send + Sync {
    /// Select the best answer span for `question` within `context`
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer>;

    /// Check if the model is loaded and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get model name for logging
    fn name(&self) -> &str;
}

/// Build the configured QA backend
pub async fn build_model(config: &QaConfig) -> Result<Arc<dyn QaModel>> {
    match config.backend {
        QaBackend::Http => Ok(Arc::new(HttpQaModel::new(&config.http)?)),
        #[cfg(feature = "onnx")]
        QaBackend::Onnx => Ok(Arc::new(OnnxQaModel::new(&config.onnx).await?)),
        #[cfg(not(feature = "onnx"))]
        QaBackend::Onnx => Err(Error::Config(
            "the onnx QA backend requires the `onnx` feature".to_string(),
        )),
    }
}
