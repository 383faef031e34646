//! Health check endpoint handlers.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreHealth,
}

/// Store health status.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub backend: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Returns 503 with the same body when the store does not answer.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let ping = state.store.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    if let Err(e) = &ping {
        tracing::warn!(error = %e, "Store health check failed");
    }
    let connected = ping.is_ok();

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreHealth {
            backend: format!("{:?}", state.config.storage.backend).to_lowercase(),
            connected,
            latency_ms: connected.then_some(latency_ms),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (store reachable).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            store: StoreHealth {
                backend: "memory".to_string(),
                connected: true,
                latency_ms: Some(0),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["store"]["backend"], "memory");
        assert_eq!(json["store"]["connected"], true);
    }

    #[test]
    fn test_store_health_disconnected() {
        let health = StoreHealth {
            backend: "postgres".to_string(),
            connected: false,
            latency_ms: None,
        };
        let json = serde_json::to_value(&health).unwrap();
        assert!(json["latency_ms"].is_null());
    }
}
