//! Advertisement endpoints
//!
//! - GET  /api/advertisements                 - running ads (`format=`), or by `status=` (admin)
//! - POST /api/advertisements                 - submit (auth), pending until approved
//! - PUT  /api/advertisements/{id}/status     - approve or reject (admin)
//! - POST /api/advertisements/{id}/click      - count a click
//! - POST /api/advertisements/{id}/impression - count an impression

use hyper::{Method, Response, StatusCode};

use crate::db::schemas::AdEvent;
use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;
use crate::services::directory::{AdQuery, AdView};
use crate::types::Result;

pub async fn handle_advertisements_request(
    req: &ApiRequest,
    state: &AppState,
) -> Option<Response<BoxBody>> {
    let segments = req.segments();

    let response = match (&req.method, segments.as_slice()) {
        (&Method::GET, ["api", "advertisements"]) => respond(StatusCode::OK, list(req, state).await),
        (&Method::POST, ["api", "advertisements"]) => {
            respond(StatusCode::CREATED, submit(req, state).await)
        }
        (&Method::PUT, ["api", "advertisements", id, "status"]) => {
            respond(StatusCode::OK, set_status(req, state, id).await)
        }
        (&Method::POST, ["api", "advertisements", id, "click"]) => respond(
            StatusCode::OK,
            state.directory.record_ad_event(id, AdEvent::Click).await,
        ),
        (&Method::POST, ["api", "advertisements", id, "impression"]) => respond(
            StatusCode::OK,
            state.directory.record_ad_event(id, AdEvent::Impression).await,
        ),
        (_, ["api", "advertisements"])
        | (_, ["api", "advertisements", _, "status" | "click" | "impression"]) => {
            method_not_allowed()
        }
        _ => return None,
    };

    Some(response)
}

/// GET /api/advertisements
async fn list(req: &ApiRequest, state: &AppState) -> Result<Vec<AdView>> {
    let viewer = req.optional_claims(state)?;
    let query = AdQuery::from_query_string(req.query.as_deref())?;
    state.directory.list_advertisements(viewer.as_ref(), query).await
}

/// POST /api/advertisements
async fn submit(req: &ApiRequest, state: &AppState) -> Result<AdView> {
    let claims = req.claims(state)?;
    state.directory.submit_ad(&claims, req.json()?).await
}

/// PUT /api/advertisements/{id}/status
async fn set_status(req: &ApiRequest, state: &AppState, id: &str) -> Result<AdView> {
    let claims = req.claims(state)?;
    state.directory.set_ad_status(&claims, id, req.json()?).await
}
