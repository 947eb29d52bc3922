//! Health and version endpoints
//!
//! - /health - liveness, with the backing store and optional integrations
//! - /version - build information for deployment verification

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::common::{json_response, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// "development" or "production"
    pub mode: &'static str,
    pub node_id: String,
    /// "mongodb" or "memory"
    pub store: &'static str,
    pub github_enabled: bool,
    pub payments_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
    pub service: &'static str,
}

pub fn health_check(state: &AppState) -> Response<BoxBody> {
    let directory = &state.directory;
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: state.args.node_id.to_string(),
        store: directory.store().backend(),
        github_enabled: directory.github_enabled(),
        payments_enabled: directory.payments_enabled(),
    };

    json_response(StatusCode::OK, &response)
}

pub fn version_info() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("OPENALT_GIT_COMMIT").unwrap_or("unknown"),
            built_at: option_env!("OPENALT_BUILT_AT").unwrap_or("unknown"),
            service: "openalt",
        },
    )
}
