//! One-shot commands

use anyhow::{bail, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use page_qa::store::truncate_chars;
use std::time::Duration;

use crate::client::{ApiClient, ClientResult};

/// Characters of the ingest preview shown to the user
pub const PREVIEW_CHARS: usize = 300;

/// GET / and /document
pub async fn status(client: &ApiClient) -> Result<()> {
    let root = client.root().await?;
    println!("{} {}", style("✓").green(), root.message);
    println!("  API: {}", client.base_url());

    let document = client.document().await?;
    if !document.present {
        println!("  Document: {}", style("none ingested").dim());
        return Ok(());
    }

    println!("  Document: {}", document.url.as_deref().unwrap_or("-"));
    if let Some(title) = &document.title {
        println!("  Title: {}", title);
    }
    let truncated = if document.truncated.unwrap_or(false) {
        format!(" (truncated from {})", document.original_chars.unwrap_or(document.chars))
    } else {
        String::new()
    };
    println!("  Characters: {}{}", document.chars, truncated);
    if let Some(at) = document.ingested_at {
        println!("  Ingested at: {}", at.to_rfc3339());
    }
    Ok(())
}

/// POST /ingest with a spinner
pub async fn ingest(client: &ApiClient, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        bail!("Please enter a URL.");
    }

    let response = with_spinner(format!("Ingesting {}", url), client.ingest(url)).await?;

    println!("{} URL successfully ingested!", style("✓").green());
    println!("Preview: {}", truncate_chars(&response.preview, PREVIEW_CHARS));
    Ok(())
}

/// POST /ask
pub async fn ask(client: &ApiClient, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Please enter a question.");
    }

    let response = with_spinner("Thinking".to_string(), client.ask(question)).await?;

    println!("{} {}", style("Answer:").bold().cyan(), response.answer);
    Ok(())
}

/// Show a spinner on stderr while `request` runs
pub async fn with_spinner<T>(
    message: String,
    request: impl std::future::Future<Output = ClientResult<T>>,
) -> ClientResult<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = request.await;
    spinner.finish_and_clear();
    result
}
