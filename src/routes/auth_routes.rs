//! Account endpoints
//!
//! - POST /auth/signup - create an account and get a JWT token
//! - POST /auth/login  - authenticate and get a JWT token
//! - GET  /auth/me     - current user from the token

use hyper::{Method, Response, StatusCode};

use crate::routes::common::{method_not_allowed, respond, ApiRequest, BoxBody};
use crate::server::AppState;
use crate::services::directory::{AuthResponse, UserView};
use crate::types::Result;

pub async fn handle_auth_request(req: &ApiRequest, state: &AppState) -> Option<Response<BoxBody>> {
    let response = match (&req.method, req.path.trim_end_matches('/')) {
        (&Method::POST, "/auth/signup") => respond(StatusCode::CREATED, signup(req, state).await),
        (&Method::POST, "/auth/login") => respond(StatusCode::OK, login(req, state).await),
        (&Method::GET, "/auth/me") => respond(StatusCode::OK, me(req, state).await),
        (_, "/auth/signup") | (_, "/auth/login") | (_, "/auth/me") => method_not_allowed(),
        _ => return None,
    };

    Some(response)
}

/// POST /auth/signup
async fn signup(req: &ApiRequest, state: &AppState) -> Result<AuthResponse> {
    state.directory.signup(req.json()?).await
}

/// POST /auth/login
async fn login(req: &ApiRequest, state: &AppState) -> Result<AuthResponse> {
    state.directory.login(req.json()?).await
}

/// GET /auth/me
async fn me(req: &ApiRequest, state: &AppState) -> Result<UserView> {
    let claims = req.claims(state)?;
    state.directory.me(&claims).await
}
