use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Which of the two queries an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Search,
    Detail,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Search => "search",
            QueryKind::Detail => "detail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupEvent {
    CacheHit(CacheEvent),
    CacheMiss(CacheEvent),
    Generated(GeneratedEvent),
    GenerationFailed(FailureEvent),
    StorageReadFailed(FailureEvent),
    StorageWriteFailed(FailureEvent),
}

impl LookupEvent {
    pub fn kind(&self) -> QueryKind {
        match self {
            LookupEvent::CacheHit(e) | LookupEvent::CacheMiss(e) => e.kind,
            LookupEvent::Generated(e) => e.kind,
            LookupEvent::GenerationFailed(e)
            | LookupEvent::StorageReadFailed(e)
            | LookupEvent::StorageWriteFailed(e) => e.kind,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            LookupEvent::CacheHit(e) | LookupEvent::CacheMiss(e) => &e.key,
            LookupEvent::Generated(e) => &e.key,
            LookupEvent::GenerationFailed(e)
            | LookupEvent::StorageReadFailed(e)
            | LookupEvent::StorageWriteFailed(e) => &e.key,
        }
    }

    /// Same value as the serialized `type` tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            LookupEvent::CacheHit(_) => "cache_hit",
            LookupEvent::CacheMiss(_) => "cache_miss",
            LookupEvent::Generated(_) => "generated",
            LookupEvent::GenerationFailed(_) => "generation_failed",
            LookupEvent::StorageReadFailed(_) => "storage_read_failed",
            LookupEvent::StorageWriteFailed(_) => "storage_write_failed",
        }
    }

    pub fn cache_hit(kind: QueryKind, key: impl Into<String>) -> Self {
        LookupEvent::CacheHit(CacheEvent::new(kind, key))
    }

    pub fn cache_miss(kind: QueryKind, key: impl Into<String>) -> Self {
        LookupEvent::CacheMiss(CacheEvent::new(kind, key))
    }

    pub fn generated(kind: QueryKind, key: impl Into<String>, tokens: u64) -> Self {
        LookupEvent::Generated(GeneratedEvent {
            kind,
            key: key.into(),
            tokens,
            timestamp: now_timestamp(),
        })
    }

    pub fn generation_failed(kind: QueryKind, key: impl Into<String>, error: impl ToString) -> Self {
        LookupEvent::GenerationFailed(FailureEvent::new(kind, key, error))
    }

    pub fn storage_read_failed(
        kind: QueryKind,
        key: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        LookupEvent::StorageReadFailed(FailureEvent::new(kind, key, error))
    }

    pub fn storage_write_failed(
        kind: QueryKind,
        key: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        LookupEvent::StorageWriteFailed(FailureEvent::new(kind, key, error))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEvent {
    pub kind: QueryKind,
    pub key: String,
    pub timestamp: u64,
}

impl CacheEvent {
    fn new(kind: QueryKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            timestamp: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    pub kind: QueryKind,
    pub key: String,
    pub tokens: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub kind: QueryKind,
    pub key: String,
    pub error: String,
    pub timestamp: u64,
}

impl FailureEvent {
    fn new(kind: QueryKind, key: impl Into<String>, error: impl ToString) -> Self {
        Self {
            kind,
            key: key.into(),
            error: error.to_string(),
            timestamp: now_timestamp(),
        }
    }
}

/// Helper to get current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
