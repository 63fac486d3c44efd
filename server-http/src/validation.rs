use crate::models::{DetailRequest, SearchRequest};

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingLocation,
    MissingPlaceName,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingLocation => write!(f, "Location not provided"),
            ValidationError::MissingPlaceName => write!(f, "Place name not provided"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for shared::Error {
    fn from(err: ValidationError) -> Self {
        shared::Error::Validation(err.to_string())
    }
}

/// Extract the location from a (possibly absent) search body.
/// The raw value is returned; normalization happens in the core.
pub fn require_location(req: Option<SearchRequest>) -> Result<String, ValidationError> {
    req.and_then(|r| r.location)
        .filter(|location| !location.trim().is_empty())
        .ok_or(ValidationError::MissingLocation)
}

/// Extract the place name from a (possibly absent) detail body.
/// Returned exactly as sent: place names are matched verbatim.
pub fn require_place_name(req: Option<&DetailRequest>) -> Result<&str, ValidationError> {
    req.and_then(|r| r.place_name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .ok_or(ValidationError::MissingPlaceName)
}
