//! Application state for the page QA server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::ingestion::{HttpPageFetcher, PageFetcher};
use crate::qa::{build_model, QaModel};
use crate::service::QaService;
use crate::store::ContentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Ingest/ask service over the content store
    service: QaService,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state with the configured fetcher and QA backend
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing page QA state (backend: {:?})...", config.qa.backend);

        let fetcher = Arc::new(HttpPageFetcher::new(&config.fetch)?);
        tracing::info!("Page fetcher initialized");

        let model = build_model(&config.qa).await?;
        tracing::info!("QA model initialized ({})", model.name());

        let state = Self::with_components(config, fetcher, model);

        match state.service().model().health_check().await {
            Ok(true) => state.set_ready(true),
            Ok(false) => tracing::warn!("QA model reported unhealthy, server not ready"),
            Err(e) => tracing::warn!("QA model health check failed: {}", e),
        }

        Ok(state)
    }

    /// Create application state from existing collaborators
    ///
    /// The state starts out not ready.
    pub fn with_components(
        config: AppConfig,
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn QaModel>,
    ) -> Self {
        let service = QaService::new(
            Arc::new(ContentStore::new()),
            fetcher,
            model,
            config.content.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                service,
                ready: RwLock::new(false),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the ingest/ask service
    pub fn service(&self) -> &QaService {
        &self.inner.service
    }

    /// Get the content store
    pub fn store(&self) -> &Arc<ContentStore> {
        self.inner.service.store()
    }

    /// Check if ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
