//! Cache-or-generate core: answers place searches and place details from a
//! persistent cache, falling back to a generative backend on a miss.

pub mod domain;
pub mod enrichment;
pub mod events;
pub mod generation;
pub mod key;
pub mod lookup_service;
pub mod persistence;
pub mod ports;
pub mod sections;

pub use domain::{DetailOutcome, Generated, GeneratedPlace, PlaceDetail, PlaceSummary, SearchOutcome};
pub use events::{LookupEvent, QueryKind};
pub use generation::GenerationClient;
pub use key::SearchKey;
pub use lookup_service::LookupService;
pub use persistence::sled_store::SledCacheStore;
