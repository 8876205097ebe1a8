//! Interactive ingest-then-ask loop

use anyhow::Result;
use console::style;
use page_qa::store::truncate_chars;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::ApiClient;
use crate::commands::{with_spinner, PREVIEW_CHARS};

/// One line typed by the user
#[derive(Debug, PartialEq, Eq)]
pub enum SessionInput {
    Quit,
    Ingest(String),
    Ask(String),
    Blank,
}

/// Interpret a line of session input
pub fn parse_line(line: &str) -> SessionInput {
    let line = line.trim();
    if line.is_empty() {
        return SessionInput::Blank;
    }
    if line == ":quit" || line == ":q" {
        return SessionInput::Quit;
    }
    if let Some(url) = line.strip_prefix(":ingest") {
        return SessionInput::Ingest(url.trim().to_string());
    }
    SessionInput::Ask(line.to_string())
}

/// Session state kept on the client side
pub struct Session {
    client: ApiClient,
    /// Set after a successful ingest in this session
    ingested: bool,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            ingested: false,
        }
    }

    /// Run until EOF or `:quit`
    pub async fn run(mut self, url: Option<String>) -> Result<()> {
        println!("{}", style("Web page Q&A").bold());
        println!("Type a question, `:ingest <url>` to load a page, `:quit` to leave.\n");

        if let Some(url) = url {
            self.ingest(&url).await;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", style(">").cyan());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_line(&line) {
                SessionInput::Quit => break,
                SessionInput::Blank => {}
                SessionInput::Ingest(url) => self.ingest(&url).await,
                SessionInput::Ask(question) => self.ask(&question).await,
            }
        }

        println!();
        Ok(())
    }

    async fn ingest(&mut self, url: &str) {
        if url.is_empty() {
            print_error("Please enter a URL.");
            return;
        }

        match with_spinner(format!("Ingesting {}", url), self.client.ingest(url)).await {
            Ok(response) => {
                self.ingested = true;
                println!("{} URL successfully ingested!", style("✓").green());
                println!("Preview: {}\n", truncate_chars(&response.preview, PREVIEW_CHARS));
            }
            Err(e) => print_error(&e.to_string()),
        }
    }

    async fn ask(&self, question: &str) {
        if !self.ingested {
            print_error("No content ingested. Please ingest a URL first.");
            return;
        }

        match with_spinner("Thinking".to_string(), self.client.ask(question)).await {
            Ok(response) => println!("{} {}\n", style("Answer:").bold().cyan(), response.answer),
            Err(e) => print_error(&e.to_string()),
        }
    }
}

fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  "), SessionInput::Blank);
        assert_eq!(parse_line(":quit"), SessionInput::Quit);
        assert_eq!(parse_line(":q\n"), SessionInput::Quit);
        assert_eq!(
            parse_line(":ingest https://example.com/a "),
            SessionInput::Ingest("https://example.com/a".to_string())
        );
        assert_eq!(parse_line(":ingest"), SessionInput::Ingest(String::new()));
        assert_eq!(
            parse_line(" What color is the sky? "),
            SessionInput::Ask("What color is the sky?".to_string())
        );
    }
}
