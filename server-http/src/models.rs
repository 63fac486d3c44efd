use genie::sections::Section;
use genie::PlaceSummary;
use serde::{Deserialize, Serialize};

// === Request Models ===

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailRequest {
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub paginate: bool,
}

// === Response Models ===

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub places: Vec<PlaceSummary>,
    pub token_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub token_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Vec<Section>>>,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
