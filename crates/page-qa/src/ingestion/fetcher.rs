//! Page fetching and article extraction

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Article markup extracted from a fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Page title, if one was found
    pub title: Option<String>,
    /// Article markup (may still contain tags)
    pub markup: String,
}

/// Trait for fetching a page and extracting its article
///
/// Implementations:
/// - `HttpPageFetcher`: fetches over HTTP and extracts with readability
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and extract its main content
    async fn fetch(&self, url: &str) -> Result<ExtractedPage>;

    /// Get fetcher name for logging
    fn name(&self) -> &str;
}

/// HTTP fetcher backed by reqwest and readability
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a new fetcher
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .redirect(Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, raw_url: &str) -> Result<ExtractedPage> {
        let url = parse_page_url(raw_url)?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::fetch(format!("Request to {} timed out", url))
            } else {
                Error::fetch(format!("Failed to fetch {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("HTTP {} from {}", status.as_u16(), url)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !is_html_content_type(&content_type) {
            return Err(Error::fetch(format!(
                "Unsupported content type '{}' at {}",
                content_type, url
            )));
        }

        let final_url = response.url().clone();
        if final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        // Decodes using the charset from Content-Type, UTF-8 otherwise
        let html = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read body from {}: {}", url, e)))?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, html.len());

        tokio::task::spawn_blocking(move || extract_article(&html, &final_url))
            .await
            .map_err(|e| Error::extraction(format!("extraction task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Parse and check a page URL
pub fn parse_page_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::invalid_url(raw, format!("unsupported scheme '{}'", other))),
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/html")
        || content_type.starts_with("application/xhtml+xml")
}

/// Extract the main article markup from a full HTML page
///
/// Falls back to the whole `<body>` when readability finds no article.
pub fn extract_article(html: &str, url: &Url) -> Result<ExtractedPage> {
    let product = readability::extractor::extract(&mut html.as_bytes(), url)
        .map_err(|e| Error::extraction(e.to_string()))?;

    let markup = if product.content.trim().is_empty() {
        tracing::debug!("No article found at {}, using page body", url);
        body_markup(html)
    } else {
        product.content
    };

    let title = Some(product.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| document_title(html));

    Ok(ExtractedPage { title, markup })
}

fn body_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    match Selector::parse("body") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(|body| body.inner_html())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn document_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::clean_markup;
    use axum::{
        body::Body,
        http::{header, StatusCode},
        response::{Html as HtmlBody, IntoResponse, Response},
        routing::get,
        Router,
    };

    const ARTICLE: &str = "<html><head><title>Colors</title></head><body>\
        <article><h1>Colors</h1>\
        <p>The sky is blue and the grass is green, which is what most people expect \
        when they look outside on a clear summer day in the countryside.</p>\
        <p>The sky is blue and the grass is green, which is what most people expect \
        when they look outside on a clear summer day in the countryside.</p>\
        </article></body></html>";

    async fn serve() -> String {
        let router = Router::new()
            .route("/article", get(|| async { HtmlBody(ARTICLE) }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/report.pdf",
                get(|| async {
                    ([(header::CONTENT_TYPE, "application/pdf")], "%PDF-1.4").into_response()
                }),
            )
            // No Content-Type header at all
            .route("/untyped", get(|| async { Response::new(Body::from(ARTICLE)) }))
            .route(
                "/latin1",
                get(|| async {
                    let mut body = b"<html><body><article><p>Caf".to_vec();
                    body.push(0xE9);
                    body.extend_from_slice(
                        b" au lait is served in a large bowl in many French homes, \
                          usually at breakfast together with bread and butter.</p>\
                          </article></body></html>",
                    );
                    ([(header::CONTENT_TYPE, "text/html; charset=iso-8859-1")], body)
                        .into_response()
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let base = serve().await;
        let page = fetcher().fetch(&format!("{}/article", base)).await.unwrap();

        assert!(clean_markup(&page.markup).contains("The sky is blue"));
        assert_eq!(page.title.as_deref(), Some("Colors"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let base = serve().await;
        let url = format!("{}/missing", base);
        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(err.to_string(), format!("HTTP 404 from {}", url));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let base = serve().await;
        let err = fetcher()
            .fetch(&format!("{}/report.pdf", base))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.to_string().contains("application/pdf"));
    }

    #[tokio::test]
    async fn test_fetch_accepts_missing_content_type() {
        let base = serve().await;
        let page = fetcher().fetch(&format!("{}/untyped", base)).await.unwrap();

        assert!(clean_markup(&page.markup).contains("The sky is blue"));
    }

    #[tokio::test]
    async fn test_fetch_decodes_declared_charset() {
        let base = serve().await;
        let page = fetcher().fetch(&format!("{}/latin1", base)).await.unwrap();

        let text = clean_markup(&page.markup);
        assert!(text.contains("Café au lait"), "got: {}", text);
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_parse_page_url() {
        assert!(parse_page_url("https://example.com/article").is_ok());
        assert!(parse_page_url("  http://example.com  ").is_ok());

        let err = parse_page_url("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));

        let err = parse_page_url("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(is_html_content_type(""));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("image/png"));
    }

    #[test]
    fn test_body_fallback() {
        let html = "<html><head><title>T</title></head><body><p>Hello there.</p></body></html>";
        assert_eq!(clean_markup(&body_markup(html)), "Hello there.");
        assert_eq!(document_title(html).as_deref(), Some("T"));
    }

    #[test]
    fn test_extract_article_keeps_article_text() {
        let paragraph = "The sky is blue and the grass is green, which is what most people \
                         expect when they look outside on a clear summer day in the countryside.";
        let html = format!(
            "<html><head><title>Colors</title></head><body>\
             <nav><a href=\"/\">Home</a></nav>\
             <article><h1>Colors</h1><p>{p}</p><p>{p}</p><p>{p}</p></article>\
             </body></html>",
            p = paragraph
        );
        let url = Url::parse("http://example.com/article").unwrap();

        let page = extract_article(&html, &url).unwrap();
        let text = clean_markup(&page.markup);

        assert!(text.contains("The sky is blue"));
        assert_eq!(page.title.as_deref(), Some("Colors"));
    }
}
