use crate::domain::{PlaceDetail, PlaceDetailEntry, PlaceSummary, SearchCacheEntry};
use crate::key::SearchKey;
use crate::ports::CacheStore;
use async_trait::async_trait;
use chrono::Utc;
use shared::{Error, Result};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use std::path::Path;

const SEARCH_TREE: &str = "search_cache";
const DETAILS_TREE: &str = "place_details";

/// Sled-backed cache store with one tree per record kind
#[derive(Clone)]
pub struct SledCacheStore {
    db: sled::Db,
    search: sled::Tree,
    details: sled::Tree,
}

impl SledCacheStore {
    /// Open (or create) the store at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open Sled database: {}", e)))?;

        Self::from_db(db)
    }

    /// Wrap an already opened database
    pub fn from_db(db: sled::Db) -> Result<Self> {
        let search = db
            .open_tree(SEARCH_TREE)
            .map_err(|e| Error::Storage(format!("Failed to open search tree: {}", e)))?;
        let details = db
            .open_tree(DETAILS_TREE)
            .map_err(|e| Error::Storage(format!("Failed to open details tree: {}", e)))?;

        Ok(Self {
            db,
            search,
            details,
        })
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SledCacheStore {
    async fn get_search(&self, key: &SearchKey) -> Result<Option<Vec<PlaceSummary>>> {
        let value = self
            .search
            .get(key.as_str().as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to get search results: {}", e)))?;

        match value {
            Some(bytes) => {
                let entry: SearchCacheEntry = serde_json::from_slice(&bytes).map_err(|e| {
                    Error::Storage(format!("Failed to deserialize search results: {}", e))
                })?;
                if entry.results.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(entry.results))
                }
            }
            None => Ok(None),
        }
    }

    async fn put_search(&self, key: &SearchKey, results: &[PlaceSummary]) -> Result<()> {
        let entry = SearchCacheEntry {
            key: key.as_str().to_string(),
            results: results.to_vec(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_vec(&entry)
            .map_err(|e| Error::Storage(format!("Failed to serialize search results: {}", e)))?;

        // A single insert swaps the whole serialized list at once.
        self.search
            .insert(key.as_str().as_bytes(), value)
            .map_err(|e| Error::Storage(format!("Failed to save search results: {}", e)))?;

        self.flush()
    }

    async fn get_detail(&self, name: &str) -> Result<Option<PlaceDetail>> {
        let value = self
            .details
            .get(name.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to get place details: {}", e)))?;

        match value {
            Some(bytes) => {
                let entry: PlaceDetailEntry = serde_json::from_slice(&bytes).map_err(|e| {
                    Error::Storage(format!("Failed to deserialize place details: {}", e))
                })?;
                Ok(entry.into_detail())
            }
            None => Ok(None),
        }
    }

    async fn put_detail(
        &self,
        name: &str,
        description: &str,
        image_url: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now();

        // Read-modify-write inside a transaction so concurrent writers for the
        // same name never merge halves of two different updates.
        let outcome: TransactionResult<(), Error> = self.details.transaction(|tx| {
            let existing = match tx.get(name.as_bytes())? {
                Some(bytes) => Some(
                    serde_json::from_slice::<PlaceDetailEntry>(&bytes).map_err(|e| {
                        ConflictableTransactionError::Abort(Error::Storage(format!(
                            "Failed to deserialize place details: {}",
                            e
                        )))
                    })?,
                ),
                None => None,
            };

            let entry = PlaceDetailEntry::upsert(existing, name, description, image_url, now);
            let value = serde_json::to_vec(&entry).map_err(|e| {
                ConflictableTransactionError::Abort(Error::Storage(format!(
                    "Failed to serialize place details: {}",
                    e
                )))
            })?;

            tx.insert(name.as_bytes(), value)?;
            Ok(())
        });

        outcome.map_err(|e| match e {
            TransactionError::Abort(err) => err,
            TransactionError::Storage(err) => {
                Error::Storage(format!("Failed to save place details: {}", err))
            }
        })?;

        self.flush()
    }
}
