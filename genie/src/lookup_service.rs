use crate::domain::{DetailOutcome, GeneratedPlace, PlaceSummary, SearchOutcome};
use crate::events::{LookupEvent, QueryKind};
use crate::generation::GenerationClient;
use crate::key::SearchKey;
use crate::ports::{CacheStore, ImageLookup};
use futures::future::join_all;
use shared::{Error, Result, TokenCount};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Cache-or-generate orchestration for place searches and place details.
///
/// Per request: check the cache; on a hit return it at zero cost, on a miss
/// generate, validate, enrich, write back and return. Generation failures
/// abort the request without touching the cache. Storage read failures count
/// as misses and storage write failures are reported but never fail the
/// request.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn CacheStore>,
    generator: Option<GenerationClient>,
    images: Arc<dyn ImageLookup>,
    event_broadcaster: Option<broadcast::Sender<LookupEvent>>,
}

impl LookupService {
    pub fn new(
        store: Arc<dyn CacheStore>,
        generator: Option<GenerationClient>,
        images: Arc<dyn ImageLookup>,
    ) -> Self {
        Self {
            store,
            generator,
            images,
            event_broadcaster: None,
        }
    }

    pub fn with_event_broadcaster(
        store: Arc<dyn CacheStore>,
        generator: Option<GenerationClient>,
        images: Arc<dyn ImageLookup>,
        broadcaster: broadcast::Sender<LookupEvent>,
    ) -> Self {
        Self {
            store,
            generator,
            images,
            event_broadcaster: Some(broadcaster),
        }
    }

    /// Fails with [`Error::BackendUnconfigured`] when no generation backend
    /// was available at startup.
    pub fn ensure_configured(&self) -> Result<&GenerationClient> {
        self.generator.as_ref().ok_or(Error::BackendUnconfigured)
    }

    /// List notable places for a free-form location.
    pub async fn search_places(&self, location: &str) -> Result<SearchOutcome> {
        let generator = self.ensure_configured()?;

        let key = SearchKey::normalize(location);
        if key.is_empty() {
            return Err(Error::Validation("Location not provided".to_string()));
        }

        match self.store.get_search(&key).await {
            Ok(Some(places)) => {
                self.emit(LookupEvent::cache_hit(QueryKind::Search, key.as_str()));
                return Ok(SearchOutcome {
                    places,
                    token_count: TokenCount::ZERO,
                    cached: true,
                });
            }
            Ok(None) => self.emit(LookupEvent::cache_miss(QueryKind::Search, key.as_str())),
            Err(e) => self.emit(LookupEvent::storage_read_failed(
                QueryKind::Search,
                key.as_str(),
                &e,
            )),
        }

        let generated = match generator.generate_search(key.as_str()).await {
            Ok(generated) => generated,
            Err(e) => {
                self.emit(LookupEvent::generation_failed(
                    QueryKind::Search,
                    key.as_str(),
                    &e,
                ));
                return Err(e);
            }
        };
        self.emit(LookupEvent::generated(
            QueryKind::Search,
            key.as_str(),
            generated.tokens.0,
        ));

        let places = self.enrich(generated.value).await;

        if let Err(e) = self.store.put_search(&key, &places).await {
            self.emit(LookupEvent::storage_write_failed(
                QueryKind::Search,
                key.as_str(),
                &e,
            ));
        }

        Ok(SearchOutcome {
            places,
            token_count: generated.tokens,
            cached: false,
        })
    }

    /// Long-form description for a place name, matched exactly.
    pub async fn place_details(&self, place_name: &str) -> Result<DetailOutcome> {
        let generator = self.ensure_configured()?;

        if place_name.trim().is_empty() {
            return Err(Error::Validation("Place name not provided".to_string()));
        }

        match self.store.get_detail(place_name).await {
            Ok(Some(detail)) => {
                self.emit(LookupEvent::cache_hit(QueryKind::Detail, place_name));
                return Ok(DetailOutcome {
                    description: detail.description,
                    image_url: detail.image_url,
                    token_count: TokenCount::ZERO,
                    cached: true,
                });
            }
            Ok(None) => self.emit(LookupEvent::cache_miss(QueryKind::Detail, place_name)),
            Err(e) => self.emit(LookupEvent::storage_read_failed(
                QueryKind::Detail,
                place_name,
                &e,
            )),
        }

        let generated = match generator.generate_detail(place_name).await {
            Ok(generated) => generated,
            Err(e) => {
                self.emit(LookupEvent::generation_failed(
                    QueryKind::Detail,
                    place_name,
                    &e,
                ));
                return Err(e);
            }
        };
        self.emit(LookupEvent::generated(
            QueryKind::Detail,
            place_name,
            generated.tokens.0,
        ));

        let image_url = self.images.image_url(place_name).await;

        if let Err(e) = self
            .store
            .put_detail(place_name, &generated.value, image_url.as_deref())
            .await
        {
            self.emit(LookupEvent::storage_write_failed(
                QueryKind::Detail,
                place_name,
                &e,
            ));
        }

        Ok(DetailOutcome {
            description: generated.value,
            image_url,
            token_count: generated.tokens,
            cached: false,
        })
    }

    /// Attach an image to every place. Lookups run concurrently and result
    /// order is preserved; a failed lookup only leaves that image absent.
    async fn enrich(&self, places: Vec<GeneratedPlace>) -> Vec<PlaceSummary> {
        join_all(places.into_iter().map(|place| async move {
            let image_url = self.images.image_url(&place.name).await;
            place.into_summary(image_url)
        }))
        .await
    }

    fn emit(&self, event: LookupEvent) {
        match &event {
            LookupEvent::CacheHit(e) => {
                info!("{} cache hit for '{}'", e.kind.as_str(), e.key)
            }
            LookupEvent::CacheMiss(e) => {
                info!("{} cache miss for '{}'", e.kind.as_str(), e.key)
            }
            LookupEvent::Generated(e) => info!(
                "Generated {} for '{}' ({} tokens)",
                e.kind.as_str(),
                e.key,
                e.tokens
            ),
            LookupEvent::GenerationFailed(e) => error!(
                "Generation failed for {} '{}': {}",
                e.kind.as_str(),
                e.key,
                e.error
            ),
            LookupEvent::StorageReadFailed(e) => warn!(
                "Cache read failed for {} '{}', treating as miss: {}",
                e.kind.as_str(),
                e.key,
                e.error
            ),
            LookupEvent::StorageWriteFailed(e) => error!(
                "Cache write failed for {} '{}', cache is degraded: {}",
                e.kind.as_str(),
                e.key,
                e.error
            ),
        }

        if let Some(ref broadcaster) = self.event_broadcaster {
            let event_type = event.event_type();
            match broadcaster.send(event) {
                Ok(subscriber_count) => {
                    debug!(
                        "Broadcasted {} event to {} subscriber(s)",
                        event_type, subscriber_count
                    );
                }
                Err(_) => {
                    debug!("No subscribers for {} event", event_type);
                }
            }
        }
    }
}

impl std::fmt::Debug for LookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupService")
            .field("configured", &self.generator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Generated, PlaceDetail};
    use crate::persistence::sled_store::SledCacheStore;
    use crate::ports::TextGenerator;
    use async_trait::async_trait;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn places_json(prefix: &str, count: usize) -> String {
        let places: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "name": format!("{} {}", prefix, i),
                    "description": format!("Place number {}.", i),
                })
            })
            .collect();
        serde_json::to_string(&places).unwrap()
    }

    /// Replays queued responses, then repeats the fallback forever.
    struct ScriptedGenerator {
        queued: Mutex<VecDeque<Result<Generated<String>>>>,
        fallback: String,
        tokens: u64,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn always(text: &str, tokens: u64) -> Arc<Self> {
            Arc::new(Self {
                queued: Mutex::new(VecDeque::new()),
                fallback: text.to_string(),
                tokens,
                calls: AtomicUsize::new(0),
            })
        }

        fn first_then(first: Result<Generated<String>>, text: &str, tokens: u64) -> Arc<Self> {
            let generator = Self::always(text, tokens);
            generator.queued.lock().unwrap().push_back(first);
            generator
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Generated<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(next) = self.queued.lock().unwrap().pop_front() {
                return next;
            }
            Ok(Generated::new(self.fallback.clone(), TokenCount(self.tokens)))
        }
    }

    /// Serves `img://<name>` except for names in `failing`.
    struct StubImages {
        failing: HashSet<String>,
        calls: AtomicUsize,
    }

    impl StubImages {
        fn new(failing: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageLookup for StubImages {
        async fn image_url(&self, place_name: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(place_name) {
                None
            } else {
                Some(format!("img://{}", place_name))
            }
        }
    }

    /// Store whose every read and write fails.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get_search(&self, _key: &SearchKey) -> Result<Option<Vec<PlaceSummary>>> {
            Err(Error::Storage("connection lost".into()))
        }
        async fn put_search(&self, _key: &SearchKey, _results: &[PlaceSummary]) -> Result<()> {
            Err(Error::Storage("connection lost".into()))
        }
        async fn get_detail(&self, _name: &str) -> Result<Option<PlaceDetail>> {
            Err(Error::Storage("connection lost".into()))
        }
        async fn put_detail(&self, _n: &str, _d: &str, _i: Option<&str>) -> Result<()> {
            Err(Error::Storage("connection lost".into()))
        }
    }

    struct Fixture {
        _dir: TempDir,
        store: Arc<SledCacheStore>,
        generator: Arc<ScriptedGenerator>,
        images: Arc<StubImages>,
        service: LookupService,
    }

    fn fixture(generator: Arc<ScriptedGenerator>, images: Arc<StubImages>) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SledCacheStore::new(dir.path().join("cache.sled")).unwrap());
        let service = LookupService::new(
            store.clone(),
            Some(GenerationClient::new(generator.clone())),
            images.clone(),
        );
        Fixture {
            _dir: dir,
            store,
            generator,
            images,
            service,
        }
    }

    #[tokio::test]
    async fn test_search_miss_then_hit_is_idempotent() {
        let f = fixture(
            ScriptedGenerator::always(&places_json("Paris", 10), 250),
            StubImages::new(&[]),
        );

        let first = f.service.search_places("Paris").await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.token_count, TokenCount(250));
        assert_eq!(first.places.len(), 10);
        assert!(first.places.iter().all(|p| !p.has_details));

        let second = f.service.search_places("Paris").await.unwrap();
        assert!(second.cached);
        assert_eq!(second.token_count, TokenCount::ZERO);
        assert_eq!(second.places, first.places);
        assert_eq!(f.generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_equivalent_locations_share_one_entry() {
        let f = fixture(
            ScriptedGenerator::always(&places_json("Paris", 10), 100),
            StubImages::new(&[]),
        );

        f.service.search_places("Paris").await.unwrap();
        for raw in [" paris ", "PARIS", "pArIs\n"] {
            let outcome = f.service.search_places(raw).await.unwrap();
            assert!(outcome.cached, "{:?} should hit the cache", raw);
        }
        assert_eq!(f.generator.calls(), 1);

        let stored = f.store.get_search(&SearchKey::normalize("paris")).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_malformed_output_is_not_cached() {
        let f = fixture(
            ScriptedGenerator::first_then(
                Ok(Generated::new("Here are some places!".into(), TokenCount(9))),
                &places_json("Rome", 10),
                80,
            ),
            StubImages::new(&[]),
        );

        let err = f.service.search_places("Rome").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(f.store.get_search(&SearchKey::normalize("rome")).await.unwrap().is_none());
        assert_eq!(f.images.calls.load(Ordering::SeqCst), 0);

        let retry = f.service.search_places("Rome").await.unwrap();
        assert!(!retry.cached);
        assert_eq!(retry.token_count, TokenCount(80));
        assert_eq!(f.generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_cached() {
        let f = fixture(
            ScriptedGenerator::first_then(
                Err(Error::Generation("503".into())),
                "A lovely guide.",
                40,
            ),
            StubImages::new(&[]),
        );

        assert!(matches!(
            f.service.place_details("Louvre").await,
            Err(Error::Generation(_))
        ));
        assert!(f.store.get_detail("Louvre").await.unwrap().is_none());

        let outcome = f.service.place_details("Louvre").await.unwrap();
        assert_eq!(outcome.description, "A lovely guide.");
    }

    #[tokio::test]
    async fn test_one_failed_image_does_not_fail_the_batch() {
        let f = fixture(
            ScriptedGenerator::always(&places_json("Tokyo", 10), 10),
            StubImages::new(&["Tokyo 3"]),
        );

        let outcome = f.service.search_places("Tokyo").await.unwrap();
        assert_eq!(outcome.places.len(), 10);
        for (i, place) in outcome.places.iter().enumerate() {
            assert_eq!(place.name, format!("Tokyo {}", i));
            if i == 3 {
                assert_eq!(place.image_url, None);
            } else {
                assert_eq!(place.image_url, Some(format!("img://Tokyo {}", i)));
            }
        }

        let stored = f
            .store
            .get_search(&SearchKey::normalize("tokyo"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, outcome.places);
    }

    #[tokio::test]
    async fn test_detail_miss_then_exact_hit() {
        let f = fixture(
            ScriptedGenerator::always("Welcome to the Eiffel Tower!", 900),
            StubImages::new(&[]),
        );

        let first = f.service.place_details("Eiffel Tower").await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.token_count, TokenCount(900));
        assert_eq!(first.image_url.as_deref(), Some("img://Eiffel Tower"));

        let second = f.service.place_details("Eiffel Tower").await.unwrap();
        assert!(second.cached);
        assert_eq!(second.token_count, TokenCount::ZERO);
        assert_eq!(second.description, first.description);
        assert_eq!(second.image_url, first.image_url);
        assert_eq!(f.generator.calls(), 1);

        // Place names are not normalized
        let other = f.service.place_details("eiffel tower").await.unwrap();
        assert!(!other.cached);
        assert_eq!(f.generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_stored_description_regenerates() {
        let f = fixture(
            ScriptedGenerator::always("Fresh guide.", 12),
            StubImages::new(&["Louvre"]),
        );
        f.store
            .put_detail("Louvre", "", Some("img://old-louvre"))
            .await
            .unwrap();

        let outcome = f.service.place_details("Louvre").await.unwrap();
        assert!(!outcome.cached);
        assert_eq!(f.generator.calls(), 1);

        // The failed lookup did not clear the image already on record
        let stored = f.store.get_detail("Louvre").await.unwrap().unwrap();
        assert_eq!(stored.description, "Fresh guide.");
        assert_eq!(stored.image_url.as_deref(), Some("img://old-louvre"));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_fast() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SledCacheStore::new(dir.path().join("cache.sled")).unwrap());
        let service = LookupService::new(store, None, StubImages::new(&[]));

        assert!(matches!(
            service.search_places("Paris").await,
            Err(Error::BackendUnconfigured)
        ));
        assert!(matches!(
            service.place_details("Louvre").await,
            Err(Error::BackendUnconfigured)
        ));
    }

    #[tokio::test]
    async fn test_blank_input_is_validation_error() {
        let f = fixture(ScriptedGenerator::always("x", 1), StubImages::new(&[]));

        assert!(matches!(
            f.service.search_places("   ").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.service.place_details("").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(f.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_broken_store_still_serves_generated_results() {
        let generator = ScriptedGenerator::always(&places_json("Oslo", 10), 70);
        let (tx, mut rx) = broadcast::channel(16);
        let service = LookupService::with_event_broadcaster(
            Arc::new(BrokenStore),
            Some(GenerationClient::new(generator.clone())),
            StubImages::new(&[]),
            tx,
        );

        let outcome = service.search_places("Oslo").await.unwrap();
        assert_eq!(outcome.places.len(), 10);
        assert_eq!(outcome.token_count, TokenCount(70));

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type());
        }
        assert_eq!(
            types,
            vec!["storage_read_failed", "generated", "storage_write_failed"]
        );
    }

    #[tokio::test]
    async fn test_broken_store_still_serves_generated_detail() {
        let generator = ScriptedGenerator::always("## Intro\nA grand hall.", 45);
        let (tx, mut rx) = broadcast::channel(16);
        let service = LookupService::with_event_broadcaster(
            Arc::new(BrokenStore),
            Some(GenerationClient::new(generator.clone())),
            StubImages::new(&[]),
            tx,
        );

        let outcome = service.place_details("Hagia Sophia").await.unwrap();
        assert!(!outcome.cached);
        assert_eq!(outcome.description, "## Intro\nA grand hall.");
        assert_eq!(outcome.image_url.as_deref(), Some("img://Hagia Sophia"));
        assert_eq!(outcome.token_count, TokenCount(45));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["storage_read_failed", "generated", "storage_write_failed"]
        );
        assert!(events.iter().all(|e| e.key() == "Hagia Sophia"));
        assert!(matches!(events[0].kind(), QueryKind::Detail));
    }

    #[tokio::test]
    async fn test_events_for_miss_and_hit() {
        let generator = ScriptedGenerator::always("Guide.", 3);
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SledCacheStore::new(dir.path().join("cache.sled")).unwrap());
        let (tx, mut rx) = broadcast::channel(16);
        let service = LookupService::with_event_broadcaster(
            store,
            Some(GenerationClient::new(generator)),
            StubImages::new(&[]),
            tx,
        );

        service.place_details("Colosseum").await.unwrap();
        service.place_details("Colosseum").await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["cache_miss", "generated", "cache_hit"]);
        assert!(events.iter().all(|e| e.kind() == QueryKind::Detail));
        assert!(events.iter().all(|e| e.key() == "Colosseum"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_store_one_complete_list() {
        let f = fixture(
            ScriptedGenerator::always(&places_json("Berlin", 10), 5),
            StubImages::new(&[]),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = f.service.clone();
            handles.push(tokio::spawn(async move {
                service.search_places("Berlin").await
            }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome.places.len(), 10);
        }

        // Redundant generations are allowed, the stored value is still whole
        assert!(f.generator.calls() >= 1);
        let stored = f
            .store
            .get_search(&SearchKey::normalize("berlin"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.len(), 10);
    }
}
