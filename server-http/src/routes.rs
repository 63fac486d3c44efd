use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use shared::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// The served application: the router behind trailing-slash normalization.
///
/// Normalization has to wrap the router from the outside so it runs before
/// route matching.
pub fn build_app(state: AppState, config: &Config) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_router(state, config))
}

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // SSE Events endpoint
        .route("/events", get(handlers::stream_events))
        // Place routes
        .route("/search-places", post(handlers::search_places))
        .route("/place-details", post(handlers::place_details))
        // Middleware
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allows_any_origin() {
        // Credentials cannot be combined with a wildcard origin
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
