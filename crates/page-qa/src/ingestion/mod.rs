//! Page ingestion: fetch, extract, clean

pub mod cleaner;
pub mod fetcher;

pub use cleaner::clean_markup;
pub use fetcher::{ExtractedPage, HttpPageFetcher, PageFetcher};
