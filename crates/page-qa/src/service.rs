//! Ingest and ask orchestration
//!
//! Both operations are independent of HTTP: they return typed errors and the
//! server maps those to status codes.

use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::ContentConfig;
use crate::error::{Error, Result};
use crate::ingestion::{clean_markup, PageFetcher};
use crate::qa::QaModel;
use crate::store::{ContentStore, Document};

/// Result of a successful ingest
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The document now held by the store
    pub document: Arc<Document>,
    /// First `preview_chars` characters of the stored text
    pub preview: String,
}

/// Answer to a question about the current document
#[derive(Debug, Clone)]
pub struct Answer {
    /// Answer text, verbatim from the model
    pub text: String,
    /// Model confidence
    pub score: f32,
    /// Document the answer was extracted from
    pub document_id: Uuid,
}

/// Page QA service
pub struct QaService {
    store: Arc<ContentStore>,
    fetcher: Arc<dyn PageFetcher>,
    model: Arc<dyn QaModel>,
    limits: ContentConfig,
}

impl QaService {
    /// Create a service over the given store and collaborators
    pub fn new(
        store: Arc<ContentStore>,
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn QaModel>,
        limits: ContentConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            model,
            limits,
        }
    }

    /// Fetch `url`, clean and truncate its text, and make it the current document
    ///
    /// The store is only touched once every fallible step has succeeded, so a
    /// failed ingest keeps the previous document.
    pub async fn ingest(&self, url: &str) -> Result<IngestOutcome> {
        let start = Instant::now();
        let url = url.trim();
        if url.is_empty() {
            tracing::warn!("Rejected ingest with empty URL");
            return Err(Error::EmptyUrl);
        }

        tracing::info!("Ingesting {} (fetcher: {})", url, self.fetcher.name());

        let page = self.fetcher.fetch(url).await.map_err(|e| {
            tracing::error!("Failed to fetch {}: {}", url, e);
            e
        })?;

        let cleaned = clean_markup(&page.markup);
        let document = Document::new(url, page.title, &cleaned, self.limits.max_content_chars);
        if document.truncated {
            tracing::info!(
                "Truncated {} from {} to {} characters",
                url,
                document.original_chars,
                self.limits.max_content_chars
            );
        }

        let document = self.store.replace(document).map_err(|e| {
            tracing::warn!("No content found at {}", url);
            e
        })?;
        let preview = document.preview(self.limits.preview_chars).to_string();

        tracing::info!(
            "Ingested {} ({} chars) in {:?}",
            url,
            document.char_count(),
            start.elapsed()
        );

        Ok(IngestOutcome { document, preview })
    }

    /// Answer `question` against the current document
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let start = Instant::now();

        let document = self.store.snapshot().ok_or_else(|| {
            tracing::warn!("Rejected question: nothing ingested");
            Error::NoContentIngested
        })?;

        let question = question.trim();
        if question.is_empty() {
            tracing::warn!("Rejected empty question");
            return Err(Error::EmptyQuestion);
        }

        tracing::info!("Question: \"{}\" (model: {})", question, self.model.name());

        let result = self
            .model
            .answer(question, &document.text)
            .await
            .map_err(|e| {
                tracing::error!("QA model failed: {}", e);
                e
            })?;

        if result.is_empty() {
            tracing::info!("No answer found in {:?}", start.elapsed());
            return Err(Error::NoAnswer);
        }

        tracing::info!(
            "Answered with score {:.3} in {:?}",
            result.score,
            start.elapsed()
        );

        Ok(Answer {
            text: result.answer,
            score: result.score,
            document_id: document.id,
        })
    }

    /// Shared content store
    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    /// QA model
    pub fn model(&self) -> &Arc<dyn QaModel> {
        &self.model
    }
}
