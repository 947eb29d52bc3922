//! Request and response plumbing shared by the route modules

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::auth::{extract_token_from_header, Claims};
use crate::server::AppState;
use crate::types::{OpenAltError, Result};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A request with its body already read
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Bytes,
}

impl ApiRequest {
    /// Path split on `/`, without empty segments
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Decode the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return Err(OpenAltError::bad_request("Request body is required"));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Value of a boolean query parameter (`true` / `1`)
    pub fn query_flag(&self, name: &str) -> bool {
        self.query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .and_then(|pairs| pairs.into_iter().find(|(k, _)| k == name))
            .map(|(_, v)| v == "true" || v == "1")
            .unwrap_or(false)
    }

    fn token(&self) -> Option<&str> {
        extract_token_from_header(self.authorization.as_deref()).filter(|t| !t.is_empty())
    }

    /// Claims of the caller; 401 without a valid token
    pub fn claims(&self, state: &AppState) -> Result<Claims> {
        let token = self
            .token()
            .ok_or_else(|| OpenAltError::Unauthorized("Authentication required".into()))?;
        state.directory.authenticate(token)
    }

    /// Claims when a token was sent. A token that fails to verify is still an error.
    pub fn optional_claims(&self, state: &AppState) -> Result<Option<Claims>> {
        match self.token() {
            None => Ok(None),
            Some(token) => state.directory.authenticate(token).map(Some),
        }
    }
}

fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

fn cors_headers(headers: &mut HeaderMap) {
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    cors_headers(response.headers_mut());
    response
}

pub fn cors_preflight() -> Response<BoxBody> {
    let mut response = Response::new(full_body(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    cors_headers(response.headers_mut());
    response
        .headers_mut()
        .insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
    response
}

pub fn error_response(err: &OpenAltError) -> Response<BoxBody> {
    if err.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.to_string(),
            code: Some(err.code().to_string()),
        },
    )
}

/// Render an operation result as JSON with `status` on success
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T>) -> Response<BoxBody> {
    match result {
        Ok(body) => json_response(status, &body),
        Err(e) => error_response(&e),
    }
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("No route for {path}"),
            code: Some("NOT_FOUND".into()),
        },
    )
}

pub fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            error: "Method not allowed".into(),
            code: Some("METHOD_NOT_ALLOWED".into()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: Option<&str>, body: &str) -> ApiRequest {
        ApiRequest {
            method: Method::GET,
            path: "/api/alternatives/gimp/".into(),
            query: query.map(String::from),
            authorization: None,
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_segments_skip_empty() {
        assert_eq!(request(None, "").segments(), vec!["api", "alternatives", "gimp"]);
    }

    #[test]
    fn test_query_flag() {
        assert!(request(Some("unread=true"), "").query_flag("unread"));
        assert!(request(Some("a=b&unread=1"), "").query_flag("unread"));
        assert!(!request(Some("unread=no"), "").query_flag("unread"));
        assert!(!request(None, "").query_flag("unread"));
    }

    #[test]
    fn test_empty_body_is_bad_request() {
        let err = request(None, "").json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_carries_code_and_cors() {
        let response = error_response(&OpenAltError::Conflict("taken".into()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }
}
