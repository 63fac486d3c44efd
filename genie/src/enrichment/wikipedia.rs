use crate::ports::ImageLookup;
use async_trait::async_trait;
use serde::Deserialize;
use shared::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

const THUMBNAIL_SIZE: &str = "500";

/// Looks up the lead image of a Wikipedia article through the MediaWiki
/// `pageimages` API.
pub struct WikipediaImages {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    source: String,
}

impl WikipediaImages {
    pub fn new(api_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    async fn fetch(&self, place_name: &str) -> reqwest::Result<Option<String>> {
        let response: QueryResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("titles", place_name),
                ("prop", "pageimages"),
                ("pithumbsize", THUMBNAIL_SIZE),
                ("pilicense", "any"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.query.and_then(|query| {
            query
                .pages
                .into_values()
                .find_map(|page| page.thumbnail.map(|t| t.source))
        }))
    }
}

#[async_trait]
impl ImageLookup for WikipediaImages {
    async fn image_url(&self, place_name: &str) -> Option<String> {
        match self.fetch(place_name).await {
            Ok(url) => url,
            Err(e) => {
                debug!("Image lookup for '{}' failed: {}", place_name, e);
                None
            }
        }
    }
}
