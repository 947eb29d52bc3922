//! HTTP routes for OpenAlt

pub mod advertisements;
pub mod alternatives;
pub mod auth_routes;
pub mod common;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod taxonomy;

pub use advertisements::handle_advertisements_request;
pub use alternatives::handle_alternatives_request;
pub use auth_routes::handle_auth_request;
pub use common::{
    cors_preflight, error_response, json_response, not_found_response, ApiRequest, BoxBody,
    ErrorResponse,
};
pub use health::{health_check, version_info};
pub use notifications::handle_notifications_request;
pub use payments::handle_payments_request;
pub use taxonomy::handle_taxonomy_request;
