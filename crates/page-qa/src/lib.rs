//! page-qa: ask questions about a single ingested web page
//!
//! A page is fetched, reduced to its article text, truncated and held as the
//! one current document. Questions are answered by an extractive QA model
//! that selects a span of that document. The HTTP surface lives in
//! [`server`]; [`service::QaService`] holds the ingest and ask logic.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod qa;
pub mod server;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use service::{Answer, IngestOutcome, QaService};
pub use store::{ContentStore, Document};
pub use types::{AskRequest, AskResponse, DocumentStatus, IngestRequest, IngestResponse};
