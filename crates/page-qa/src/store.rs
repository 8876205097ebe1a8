//! Single-document content store
//!
//! Holds the one currently ingested document. Readers take a snapshot
//! (`Arc<Document>`) and keep using it even if an ingest replaces the
//! document while they run; writers swap the whole document at once.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// The ingested document and its provenance
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Unique ID assigned at ingestion
    pub id: Uuid,
    /// URL as submitted by the caller
    pub url: String,
    /// Page title reported by the extractor
    pub title: Option<String>,
    /// Stored plain text (already truncated)
    pub text: String,
    /// Length in characters of the cleaned text before truncation
    pub original_chars: usize,
    /// Whether truncation removed anything
    pub truncated: bool,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from cleaned text, truncating it to `max_chars`
    pub fn new(url: impl Into<String>, title: Option<String>, cleaned: &str, max_chars: usize) -> Self {
        let original_chars = cleaned.chars().count();
        let text = truncate_chars(cleaned, max_chars).to_string();

        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title,
            text,
            original_chars,
            truncated: original_chars > max_chars,
            ingested_at: Utc::now(),
        }
    }

    /// Number of stored characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// First `max_chars` characters of the stored text
    pub fn preview(&self, max_chars: usize) -> &str {
        truncate_chars(&self.text, max_chars)
    }
}

/// Shared holder of the current document
#[derive(Debug, Default)]
pub struct ContentStore {
    current: RwLock<Option<Arc<Document>>>,
}

impl ContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current document, if any
    pub fn snapshot(&self) -> Option<Arc<Document>> {
        self.current.read().clone()
    }

    /// Replace the current document and return the stored snapshot
    ///
    /// Documents with blank text are rejected and leave the store unchanged,
    /// so a loaded store always has something to answer against.
    pub fn replace(&self, document: Document) -> Result<Arc<Document>> {
        if document.text.trim().is_empty() {
            return Err(Error::NoContentFound);
        }
        let document = Arc::new(document);
        *self.current.write() = Some(Arc::clone(&document));
        Ok(document)
    }
}

/// Borrow the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
        // Multi-byte characters count once
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_document_truncation_boundary() {
        let cleaned = "a".repeat(120);
        let doc = Document::new("http://example.com", None, &cleaned, 100);

        assert_eq!(doc.char_count(), 100);
        assert_eq!(doc.text, cleaned[..100]);
        assert_eq!(doc.original_chars, 120);
        assert!(doc.truncated);

        let exact = Document::new("http://example.com", None, &cleaned, 120);
        assert!(!exact.truncated);
        assert_eq!(exact.text, cleaned);
    }

    #[test]
    fn test_preview() {
        let doc = Document::new("http://example.com", None, "The sky is blue.", 100);
        assert_eq!(doc.preview(7), "The sky");
        assert_eq!(doc.preview(500), "The sky is blue.");
    }

    #[test]
    fn test_store_lifecycle() {
        let store = ContentStore::new();
        assert!(store.snapshot().is_none());

        let stored = store.replace(Document::new("http://a", None, "first", 100)).unwrap();
        assert_eq!(stored.text, "first");
        assert_eq!(store.snapshot().unwrap().id, stored.id);

        store.replace(Document::new("http://b", None, "second", 100)).unwrap();
        assert_eq!(store.snapshot().unwrap().text, "second");
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = ContentStore::new();
        store.replace(Document::new("http://a", None, "old content", 100)).unwrap();

        let snapshot = store.snapshot().unwrap();
        store.replace(Document::new("http://b", None, "new content", 100)).unwrap();

        assert_eq!(snapshot.text, "old content");
        assert_eq!(store.snapshot().unwrap().text, "new content");
    }

    #[test]
    fn test_blank_document_is_rejected() {
        let store = ContentStore::new();
        store.replace(Document::new("http://a", None, "kept", 100)).unwrap();

        let err = store.replace(Document::new("http://b", None, "   ", 100)).unwrap_err();
        assert!(matches!(err, Error::NoContentFound));

        assert_eq!(store.snapshot().unwrap().text, "kept");
    }
}
