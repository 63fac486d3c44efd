use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::TokenCount;

/// One place in a search result list, as stored and as returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub has_details: bool,
}

/// A place exactly as the generative backend described it, before enrichment.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GeneratedPlace {
    pub name: String,
    pub description: String,
}

impl GeneratedPlace {
    pub fn into_summary(self, image_url: Option<String>) -> PlaceSummary {
        PlaceSummary {
            name: self.name,
            description: self.description,
            image_url,
            has_details: false,
        }
    }
}

/// Output of a single generation call along with its cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated<T> {
    pub value: T,
    pub tokens: TokenCount,
}

impl<T> Generated<T> {
    pub fn new(value: T, tokens: TokenCount) -> Self {
        Self { value, tokens }
    }
}

/// Stored record for a normalized search key. Replaced wholesale on every write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchCacheEntry {
    pub key: String,
    pub results: Vec<PlaceSummary>,
    pub updated_at: DateTime<Utc>,
}

/// Stored record for a place name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceDetailEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceDetailEntry {
    /// Apply a write on top of an existing record (if any).
    ///
    /// The description is always replaced. The image is only replaced when a
    /// non-empty one is supplied, so an existing image is never cleared.
    pub fn upsert(
        existing: Option<PlaceDetailEntry>,
        name: &str,
        description: &str,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let new_image = image_url.filter(|url| !url.is_empty()).map(str::to_string);
        match existing {
            Some(mut entry) => {
                entry.description = Some(description.to_string());
                if new_image.is_some() {
                    entry.image_url = new_image;
                }
                entry.updated_at = now;
                entry
            }
            None => Self {
                name: name.to_string(),
                description: Some(description.to_string()),
                image_url: new_image,
                updated_at: now,
            },
        }
    }

    /// A record without a description counts as not cached.
    pub fn into_detail(self) -> Option<PlaceDetail> {
        match self.description {
            Some(description) if !description.is_empty() => Some(PlaceDetail {
                description,
                image_url: self.image_url,
            }),
            _ => None,
        }
    }
}

/// A usable cached description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceDetail {
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub places: Vec<PlaceSummary>,
    pub token_count: TokenCount,
    pub cached: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailOutcome {
    pub description: String,
    pub image_url: Option<String>,
    pub token_count: TokenCount,
    pub cached: bool,
}
