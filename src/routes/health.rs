//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe (is the process serving?)
//! - /ready, /readyz - Readiness probe (does the store answer?)
//! - /version - build information

use chrono::Utc;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::routes::{json_response, FullBody};
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Active storage backend ("mongo" or "memory")
    pub store: String,
    pub mode: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn build_health_response(state: &AppState, error: Option<String>) -> HealthResponse {
    HealthResponse {
        healthy: error.is_none(),
        version: env!("CARGO_PKG_VERSION"),
        store: state.services.store.backend.to_string(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        timestamp: Utc::now().to_rfc3339(),
        error,
    }
}

/// Handle liveness probe (/health, /healthz)
///
/// Always 200 while the process is serving requests.
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, &build_health_response(state, None))
}

/// Handle readiness probe (/ready, /readyz)
///
/// 503 when the store does not answer a count query.
pub async fn readiness_check(state: &AppState) -> Response<FullBody> {
    match state.services.ping().await {
        Ok(()) => json_response(StatusCode::OK, &build_health_response(state, None)),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &build_health_response(state, Some(e.to_string())),
            )
        }
    }
}

/// Version information for deployment verification
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: env!("CARGO_PKG_NAME"),
    };

    json_response(StatusCode::OK, &response)
}
