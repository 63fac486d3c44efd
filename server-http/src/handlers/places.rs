use crate::error::ApiError;
use crate::models::{DetailRequest, DetailResponse, SearchRequest, SearchResponse};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use genie::sections::{
    paginate_sections, split_markdown_sections, DEFAULT_CHARS_PER_PAGE,
    DEFAULT_SECTIONS_PER_PAGE,
};
use tokio::time::timeout;
use tracing::info;

const SEARCH_FAILED: &str = "Failed to fetch places from AI model.";
const DETAIL_FAILED: &str = "Failed to generate details from AI model.";

/// POST /search-places
///
/// Body: {"location": "Paris"}
pub async fn search_places(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    state
        .lookup
        .ensure_configured()
        .map_err(|e| ApiError::from_lookup(e, SEARCH_FAILED))?;

    let location = validation::require_location(body.ok().map(|Json(req)| req))
        .map_err(|e| ApiError::from_lookup(e.into(), SEARCH_FAILED))?;

    info!("SEARCH: location={}", location);

    let outcome = timeout(state.request_timeout, state.lookup.search_places(&location))
        .await
        .map_err(|_| ApiError::timeout())?
        .map_err(|e| ApiError::from_lookup(e, SEARCH_FAILED))?;

    Ok(Json(SearchResponse {
        places: outcome.places,
        token_count: outcome.token_count.0,
    }))
}

/// POST /place-details
///
/// Body: {"place_name": "Eiffel Tower", "paginate": false}
pub async fn place_details(
    State(state): State<AppState>,
    body: Result<Json<DetailRequest>, JsonRejection>,
) -> Result<Json<DetailResponse>, ApiError> {
    state
        .lookup
        .ensure_configured()
        .map_err(|e| ApiError::from_lookup(e, DETAIL_FAILED))?;

    let req = body.ok().map(|Json(req)| req);
    let place_name = validation::require_place_name(req.as_ref())
        .map_err(|e| ApiError::from_lookup(e.into(), DETAIL_FAILED))?;
    let paginate = req.as_ref().is_some_and(|r| r.paginate);

    info!("DETAILS: place_name={}", place_name);

    let outcome = timeout(state.request_timeout, state.lookup.place_details(place_name))
        .await
        .map_err(|_| ApiError::timeout())?
        .map_err(|e| ApiError::from_lookup(e, DETAIL_FAILED))?;

    let pages = paginate.then(|| {
        paginate_sections(
            &split_markdown_sections(&outcome.description),
            DEFAULT_SECTIONS_PER_PAGE,
            DEFAULT_CHARS_PER_PAGE,
        )
    });

    Ok(Json(DetailResponse {
        description: outcome.description,
        image_url: outcome.image_url,
        token_count: outcome.token_count.0,
        pages,
    }))
}
