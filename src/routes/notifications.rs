//! Notification endpoints (auth)
//!
//! - GET  /api/notifications           - newest first, `unread=true` filters
//! - POST /api/notifications/{id}/read - mark one read
//! - POST /api/notifications/read-all  - mark all read

use hyper::{Method, Response, StatusCode};

use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;
use crate::services::directory::{MarkedRead, NotificationView};
use crate::types::Result;

pub async fn handle_notifications_request(
    req: &ApiRequest,
    state: &AppState,
) -> Option<Response<BoxBody>> {
    let segments = req.segments();

    let response = match (&req.method, segments.as_slice()) {
        (&Method::GET, ["api", "notifications"]) => respond(StatusCode::OK, list(req, state).await),
        (&Method::POST, ["api", "notifications", "read-all"]) => {
            respond(StatusCode::OK, read_all(req, state).await)
        }
        (&Method::POST, ["api", "notifications", id, "read"]) => {
            respond(StatusCode::OK, read_one(req, state, id).await)
        }
        (_, ["api", "notifications"])
        | (_, ["api", "notifications", "read-all"])
        | (_, ["api", "notifications", _, "read"]) => method_not_allowed(),
        _ => return None,
    };

    Some(response)
}

/// GET /api/notifications
async fn list(req: &ApiRequest, state: &AppState) -> Result<Vec<NotificationView>> {
    let claims = req.claims(state)?;
    state
        .directory
        .list_notifications(&claims, req.query_flag("unread"))
        .await
}

/// POST /api/notifications/{id}/read
async fn read_one(req: &ApiRequest, state: &AppState, id: &str) -> Result<MarkedRead> {
    let claims = req.claims(state)?;
    state.directory.mark_notification_read(&claims, id).await
}

/// POST /api/notifications/read-all
async fn read_all(req: &ApiRequest, state: &AppState) -> Result<MarkedRead> {
    let claims = req.claims(state)?;
    state.directory.mark_all_read(&claims).await
}
