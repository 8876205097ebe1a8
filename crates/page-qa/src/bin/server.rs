//! Page QA server binary
//!
//! Run with: cargo run -p page-qa --bin page-qa-server

use page_qa::{config::AppConfig, server::PageQaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "page_qa=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - QA backend: {:?}", config.qa.backend);
    tracing::info!("  - Max content chars: {}", config.content.max_content_chars);
    tracing::info!("  - Preview chars: {}", config.content.preview_chars);
    tracing::info!("  - Fetch timeout: {}s", config.fetch.timeout_secs);

    let server = PageQaServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ingest    - Ingest a web page");
    println!("  POST /ask       - Ask a question about it");
    println!("  GET  /document  - Current document summary");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
