use crate::models::HealthResponse;
use axum::Json;

/// GET /
pub async fn root() -> &'static str {
    "Backend is running."
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK".into(),
    })
}
