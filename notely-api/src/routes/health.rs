use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use notely_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::config::StorageMode;
use crate::store::StorageKind;
use crate::AppState;

/// Reports the active storage backend. An automatic fallback to memory is degraded.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let storage = match state.storage {
        StorageKind::Postgres => HealthCheck::new("storage", HealthStatus::Healthy, Some("postgres".into())),
        StorageKind::Memory if state.config.storage == StorageMode::Memory => {
            HealthCheck::new("storage", HealthStatus::Healthy, Some("memory".into()))
        }
        StorageKind::Memory => HealthCheck::new(
            "storage",
            HealthStatus::Degraded,
            Some("database unavailable, using in-memory storage".into()),
        ),
    };

    let response = HealthResponse::healthy("notely-api", env!("CARGO_PKG_VERSION")).with_checks(vec![storage]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
