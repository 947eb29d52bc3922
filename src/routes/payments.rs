//! Sponsor plan checkout (auth)
//!
//! - POST /api/payments/orders              - create a PayPal order
//! - POST /api/payments/orders/{id}/capture - capture it and activate the plan

use hyper::{Method, Response, StatusCode};

use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;
use crate::services::directory::{CapturedSponsorship, SponsorOrder};
use crate::types::Result;

pub async fn handle_payments_request(req: &ApiRequest, state: &AppState) -> Option<Response<BoxBody>> {
    let segments = req.segments();

    let response = match (&req.method, segments.as_slice()) {
        (&Method::POST, ["api", "payments", "orders"]) => {
            respond(StatusCode::CREATED, create_order(req, state).await)
        }
        (&Method::POST, ["api", "payments", "orders", order_id, "capture"]) => {
            respond(StatusCode::OK, capture_order(req, state, order_id).await)
        }
        (_, ["api", "payments", "orders"]) | (_, ["api", "payments", "orders", _, "capture"]) => {
            method_not_allowed()
        }
        _ => return None,
    };

    Some(response)
}

/// POST /api/payments/orders
async fn create_order(req: &ApiRequest, state: &AppState) -> Result<SponsorOrder> {
    let claims = req.claims(state)?;
    state
        .directory
        .create_sponsor_order(&claims, req.json()?)
        .await
}

/// POST /api/payments/orders/{id}/capture
async fn capture_order(
    req: &ApiRequest,
    state: &AppState,
    order_id: &str,
) -> Result<CapturedSponsorship> {
    let claims = req.claims(state)?;
    state.directory.capture_sponsor_order(&claims, order_id).await
}
