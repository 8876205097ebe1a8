//! In-process collaborators for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::ingestion::{ExtractedPage, PageFetcher};
use crate::qa::{QaAnswer, QaModel};

/// Fetcher serving canned markup per URL
///
/// Unknown URLs fail with a fetch error, like an unreachable host.
#[derive(Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, markup: &str) -> Self {
        self.set_page(url, markup);
        self
    }

    pub fn set_page(&self, url: &str, markup: &str) {
        self.pages.lock().insert(url.to_string(), markup.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<ExtractedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let markup = self
            .pages
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("Failed to reach {}", url)))?;

        Ok(ExtractedPage {
            title: Some("Test page".to_string()),
            markup,
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Model that answers with the first keyword found in the context
///
/// A rule `(question, answer)` fires when the question matches and the
/// answer occurs in the context, so answers always come from the document.
#[derive(Default)]
pub struct KeywordModel {
    rules: Vec<(String, String)>,
    failure: Option<String>,
    calls: AtomicUsize,
    contexts: Mutex<Vec<String>>,
}

impl KeywordModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, question: &str, answer: &str) -> Self {
        self.rules.push((question.to_string(), answer.to_string()));
        self
    }

    /// Fail every call with a model error
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<String> {
        self.contexts.lock().last().cloned()
    }
}

#[async_trait]
impl QaModel for KeywordModel {
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().push(context.to_string());

        if let Some(message) = &self.failure {
            return Err(Error::model(message.clone()));
        }

        let answer = self
            .rules
            .iter()
            .find(|(q, a)| q == question && context.contains(a.as_str()))
            .map(|(_, a)| {
                let start = context.find(a.as_str()).unwrap_or(0);
                QaAnswer {
                    answer: a.clone(),
                    score: 0.9,
                    start: Some(start),
                    end: Some(start + a.len()),
                }
            })
            .unwrap_or_default();

        Ok(answer)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.failure.is_none())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
