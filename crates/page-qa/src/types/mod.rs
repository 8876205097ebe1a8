//! Request and response types of the HTTP API

pub mod request;
pub mod response;

pub use request::{AskRequest, IngestRequest};
pub use response::{AskResponse, DocumentStatus, ErrorBody, IngestResponse, RootResponse};
