// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),
    #[error("generation backend not configured")]
    BackendUnconfigured,
    #[error("generation: {0}")]
    Generation(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Tokens spent by the generative backend to produce a response.
/// Served-from-cache responses always report zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenCount(pub u64);

impl TokenCount {
    pub const ZERO: TokenCount = TokenCount(0);
}

pub mod config;
