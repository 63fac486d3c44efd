use genie::enrichment::WikipediaImages;
use genie::generation::GeminiBackend;
use genie::{GenerationClient, LookupEvent, LookupService, SledCacheStore};
use shared::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
    pub event_channel: broadcast::Sender<LookupEvent>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wire the production collaborators: sled store, Gemini backend and
    /// Wikipedia images.
    pub fn new(config: &Config) -> shared::Result<Self> {
        let store = Arc::new(SledCacheStore::new(config.sled_path())?);
        tracing::info!("Cache store opened at {}", config.sled_path().display());

        // The backend may be unavailable; requests then fail fast instead of
        // the process refusing to start.
        let generator = match GeminiBackend::from_config(&config.gemini) {
            Ok(backend) => {
                tracing::info!("Generation backend configured: {}", config.gemini.model);
                Some(GenerationClient::new(Arc::new(backend)))
            }
            Err(e) => {
                tracing::warn!("Generation backend unavailable: {}", e);
                None
            }
        };

        let images = Arc::new(WikipediaImages::new(
            config.wikipedia_api_url.clone(),
            &config.user_agent,
        )?);

        // Create broadcast channel for SSE events (1000 event buffer capacity)
        let (event_tx, _event_rx) = broadcast::channel(1000);

        let lookup = LookupService::with_event_broadcaster(store, generator, images, event_tx.clone());

        Ok(Self::from_parts(lookup, event_tx, config.request_timeout))
    }

    pub fn from_parts(
        lookup: LookupService,
        event_channel: broadcast::Sender<LookupEvent>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            lookup: Arc::new(lookup),
            event_channel,
            request_timeout,
        }
    }
}
