use super::prompts::{self, PLACES_PER_SEARCH};
use crate::domain::{Generated, GeneratedPlace};
use crate::ports::TextGenerator;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds prompts, calls the backend once per request and validates what
/// comes back before anything downstream gets to see it.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextGenerator>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Ask for the notable places of `location` as strict JSON.
    ///
    /// Unparseable, empty or malformed output is an error; a partial list is
    /// never returned.
    pub async fn generate_search(&self, location: &str) -> Result<Generated<Vec<GeneratedPlace>>> {
        let prompt = prompts::search_prompt(location);
        let response = self.backend.generate(&prompt).await?;

        let places = parse_places(&response.value)?;
        if places.len() != PLACES_PER_SEARCH {
            warn!(
                "Backend returned {} places for '{}', expected {}",
                places.len(),
                location,
                PLACES_PER_SEARCH
            );
        }
        debug!(
            "Generated {} places for '{}' using {} tokens",
            places.len(),
            location,
            response.tokens.0
        );

        Ok(Generated::new(places, response.tokens))
    }

    /// Ask for a long-form guide to `place_name`.
    pub async fn generate_detail(&self, place_name: &str) -> Result<Generated<String>> {
        let prompt = prompts::detail_prompt(place_name);
        let response = self.backend.generate(&prompt).await?;

        if response.value.trim().is_empty() {
            return Err(Error::Generation(format!(
                "Empty description generated for '{}'",
                place_name
            )));
        }

        Ok(response)
    }
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient").finish_non_exhaustive()
    }
}

/// Remove a surrounding markdown code fence (with or without a language tag).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the backend's search output into places.
pub fn parse_places(raw: &str) -> Result<Vec<GeneratedPlace>> {
    let payload = strip_code_fences(raw);
    let places: Vec<GeneratedPlace> = serde_json::from_str(payload)
        .map_err(|e| Error::Generation(format!("Failed to parse places JSON: {}", e)))?;

    if places.is_empty() {
        return Err(Error::Generation("Backend returned no places".to_string()));
    }
    if let Some(index) = places.iter().position(|p| p.name.trim().is_empty()) {
        return Err(Error::Generation(format!(
            "Place at index {} has an empty name",
            index
        )));
    }

    Ok(places)
}
