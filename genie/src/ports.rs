#![deny(clippy::all)]

use crate::domain::{Generated, PlaceDetail, PlaceSummary};
use crate::key::SearchKey;
use async_trait::async_trait;
use shared::Result;

// Ports are the pluggable edges of the core: storage, the generative backend
// and the image lookup service.

/// Port for the persistent cache of search results and place details.
///
/// Writes are upserts and must be atomic per key: a concurrent reader sees
/// either the previous complete value or the new complete value.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Cached results for a normalized location, absent if never populated.
    async fn get_search(&self, key: &SearchKey) -> Result<Option<Vec<PlaceSummary>>>;

    /// Replace the result list for `key` wholesale.
    async fn put_search(&self, key: &SearchKey, results: &[PlaceSummary]) -> Result<()>;

    /// Cached description for an exact place name. Absent when there is no
    /// record or its description is empty.
    async fn get_detail(&self, name: &str) -> Result<Option<PlaceDetail>>;

    /// Overwrite the description. The image is only overwritten when a
    /// non-empty value is supplied.
    async fn put_detail(&self, name: &str, description: &str, image_url: Option<&str>)
    -> Result<()>;
}

/// Port for the generative text backend.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Run a single prompt. No retries happen behind this call.
    async fn generate(&self, prompt: &str) -> Result<Generated<String>>;
}

/// Port for best-effort image enrichment.
///
/// Every failure mode collapses to `None`: callers cannot tell a place without
/// an image from a lookup that failed, and no error ever crosses this boundary.
#[async_trait]
pub trait ImageLookup: Send + Sync + 'static {
    async fn image_url(&self, place_name: &str) -> Option<String>;
}
