//! page-qa: command-line client for the page QA service
//!
//! Run with: cargo run -p page-qa-cli -- --help

mod client;
mod commands;
mod session;

use clap::{ArgAction, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use client::{ApiClient, DEFAULT_API_URL};
use session::Session;

/// Ask questions about a web page
#[derive(Parser, Debug)]
#[command(name = "page-qa")]
#[command(version, about = "Ingest a web page and ask questions about it", long_about = None)]
struct Cli {
    /// Base URL of the page QA server
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show server status and the ingested document
    Status,

    /// Ingest a web page
    Ingest {
        /// Page URL
        url: String,
    },

    /// Ask a question about the ingested page
    Ask {
        /// Question text
        question: String,
    },

    /// Interactive session: ingest a page, then ask questions
    Session {
        /// Page to ingest before the first question
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = ApiClient::new(&cli.api_url);
    tracing::debug!("Using API at {}", client.base_url());

    let result = match cli.command {
        Commands::Status => commands::status(&client).await,
        Commands::Ingest { url } => commands::ingest(&client, &url).await,
        Commands::Ask { question } => commands::ask(&client, &question).await,
        Commands::Session { url } => Session::new(client).run(url).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
