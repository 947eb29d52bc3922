//! Alternative endpoints
//!
//! - GET  /api/alternatives                        - filtered, paginated listing
//! - POST /api/alternatives                        - submit (auth)
//! - GET  /api/alternatives/{slug}                 - one alternative
//! - PUT  /api/alternatives/{slug}                 - edit (submitter or admin)
//! - PUT  /api/alternatives/{slug}/status          - approve or reject (admin)
//! - POST /api/alternatives/{slug}/vote            - vote (auth)
//! - GET  /api/alternatives/{slug}/discussions     - threads
//! - POST /api/alternatives/{slug}/discussions     - comment (auth)
//! - POST /api/alternatives/{slug}/refresh-stats   - refresh GitHub stats (admin)

use hyper::{Method, Response, StatusCode};

use crate::catalog::{Comment, ListQuery, Thread};
use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;
use crate::services::directory::{
    AlternativeDetail, AlternativeView, Listing, VoteResponse,
};
use crate::types::Result;

pub async fn handle_alternatives_request(
    req: &ApiRequest,
    state: &AppState,
) -> Option<Response<BoxBody>> {
    let segments = req.segments();

    let response = match (&req.method, segments.as_slice()) {
        (&Method::GET, ["api", "alternatives"]) => respond(StatusCode::OK, list(req, state).await),
        (&Method::POST, ["api", "alternatives"]) => {
            respond(StatusCode::CREATED, submit(req, state).await)
        }
        (_, ["api", "alternatives"]) => method_not_allowed(),

        (&Method::GET, ["api", "alternatives", slug]) => {
            respond(StatusCode::OK, detail(req, state, slug).await)
        }
        (&Method::PUT, ["api", "alternatives", slug]) => {
            respond(StatusCode::OK, update(req, state, slug).await)
        }
        (_, ["api", "alternatives", _]) => method_not_allowed(),

        (&Method::PUT, ["api", "alternatives", slug, "status"]) => {
            respond(StatusCode::OK, set_status(req, state, slug).await)
        }
        (&Method::POST, ["api", "alternatives", slug, "vote"]) => {
            respond(StatusCode::OK, vote(req, state, slug).await)
        }
        (&Method::GET, ["api", "alternatives", slug, "discussions"]) => {
            respond(StatusCode::OK, discussions(req, state, slug).await)
        }
        (&Method::POST, ["api", "alternatives", slug, "discussions"]) => {
            respond(StatusCode::CREATED, post_comment(req, state, slug).await)
        }
        (&Method::POST, ["api", "alternatives", slug, "refresh-stats"]) => {
            respond(StatusCode::OK, refresh_stats(req, state, slug).await)
        }
        (_, ["api", "alternatives", _, "status" | "vote" | "discussions" | "refresh-stats"]) => {
            method_not_allowed()
        }

        _ => return None,
    };

    Some(response)
}

/// GET /api/alternatives
async fn list(req: &ApiRequest, state: &AppState) -> Result<Listing> {
    let viewer = req.optional_claims(state)?;
    let query = ListQuery::from_query_string(req.query.as_deref())?;
    state.directory.list_alternatives(viewer.as_ref(), query).await
}

/// POST /api/alternatives
async fn submit(req: &ApiRequest, state: &AppState) -> Result<AlternativeView> {
    let claims = req.claims(state)?;
    state.directory.submit_alternative(&claims, req.json()?).await
}

/// GET /api/alternatives/{slug}
async fn detail(req: &ApiRequest, state: &AppState, slug: &str) -> Result<AlternativeDetail> {
    let viewer = req.optional_claims(state)?;
    state.directory.get_alternative(viewer.as_ref(), slug).await
}

/// PUT /api/alternatives/{slug}
async fn update(req: &ApiRequest, state: &AppState, slug: &str) -> Result<AlternativeView> {
    let claims = req.claims(state)?;
    state
        .directory
        .update_alternative(&claims, slug, req.json()?)
        .await
}

/// PUT /api/alternatives/{slug}/status
async fn set_status(req: &ApiRequest, state: &AppState, slug: &str) -> Result<AlternativeView> {
    let claims = req.claims(state)?;
    state
        .directory
        .set_alternative_status(&claims, slug, req.json()?)
        .await
}

/// POST /api/alternatives/{slug}/vote
async fn vote(req: &ApiRequest, state: &AppState, slug: &str) -> Result<VoteResponse> {
    let claims = req.claims(state)?;
    state.directory.vote(&claims, slug, req.json()?).await
}

/// GET /api/alternatives/{slug}/discussions
async fn discussions(req: &ApiRequest, state: &AppState, slug: &str) -> Result<Vec<Thread>> {
    let viewer = req.optional_claims(state)?;
    state.directory.list_discussions(viewer.as_ref(), slug).await
}

/// POST /api/alternatives/{slug}/discussions
async fn post_comment(req: &ApiRequest, state: &AppState, slug: &str) -> Result<Comment> {
    let claims = req.claims(state)?;
    state
        .directory
        .post_discussion(&claims, slug, req.json()?)
        .await
}

/// POST /api/alternatives/{slug}/refresh-stats
async fn refresh_stats(req: &ApiRequest, state: &AppState, slug: &str) -> Result<AlternativeView> {
    let claims = req.claims(state)?;
    state.directory.refresh_stats(&claims, slug).await
}
