//! Health check endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::{AppState, Backends};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Health status ("ok")
    pub status: String,
}

/// Detailed health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    pub status: String,

    /// Implementation behind each collaborator
    pub backends: Backends,

    /// Whether the catalog file is present
    pub catalog: bool,

    /// Server uptime in seconds
    pub uptime_seconds: u64,

    /// Server version
    pub version: String,
}

/// Basic health check endpoint.
///
/// `GET /health`
///
/// Returns quickly without touching any collaborator, for load balancer
/// checks.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Detailed health check endpoint.
///
/// `GET /api/health`
///
/// Reports which backends are in use. Degraded backends do not make the
/// server unhealthy, since every page has a fallback.
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    let catalog = tokio::fs::try_exists(&state.config.catalog_path)
        .await
        .unwrap_or(false);

    Json(ApiHealthResponse {
        status: "ok".to_string(),
        backends: state.backends,
        catalog,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.status, "ok");
    }
}
