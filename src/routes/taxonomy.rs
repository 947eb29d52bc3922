//! Taxonomy endpoints
//!
//! - GET /api/categories         - category tree
//! - GET /api/tags               - tags
//! - GET /api/tech-stacks        - tech stacks
//! - GET /api/proprietary        - proprietary software
//! - GET /api/proprietary/{slug} - one product with its alternatives

use hyper::{Method, Response, StatusCode};

use crate::db::schemas::LabelKind;
use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;

pub async fn handle_taxonomy_request(req: &ApiRequest, state: &AppState) -> Option<Response<BoxBody>> {
    let directory = &state.directory;
    let segments = req.segments();

    let response = match (&req.method, segments.as_slice()) {
        (&Method::GET, ["api", "categories"]) => {
            respond(StatusCode::OK, directory.list_categories().await)
        }
        (&Method::GET, ["api", "tags"]) => {
            respond(StatusCode::OK, directory.list_labels(LabelKind::Tag).await)
        }
        (&Method::GET, ["api", "tech-stacks"]) => {
            respond(StatusCode::OK, directory.list_labels(LabelKind::TechStack).await)
        }
        (&Method::GET, ["api", "proprietary"]) => {
            respond(StatusCode::OK, directory.list_proprietary().await)
        }
        (&Method::GET, ["api", "proprietary", slug]) => {
            respond(StatusCode::OK, directory.get_proprietary(slug).await)
        }
        (_, ["api", "categories" | "tags" | "tech-stacks" | "proprietary"])
        | (_, ["api", "proprietary", _]) => method_not_allowed(),
        _ => return None,
    };

    Some(response)
}
