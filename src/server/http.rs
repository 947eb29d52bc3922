//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::{AUTHORIZATION, CONTENT_LENGTH};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::routes::{self, ApiRequest, BoxBody};
use crate::services::Directory;
use crate::types::{OpenAltError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub directory: Directory,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, directory: Directory) -> Self {
        Self {
            args,
            directory,
            started_at: Instant::now(),
        }
    }
}

/// Run the HTTP server until the process exits
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "OpenAlt listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - do not expose this instance publicly");
    }
    info!("Store backend: {}", state.directory.store().backend());
    if !state.directory.payments_enabled() {
        info!("PayPal not configured - sponsor checkout disabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Read the whole body, refusing anything above `limit` bytes
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(body, limit)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| {
            if e.is::<http_body_util::LengthLimitError>() {
                OpenAltError::bad_request(format!("Request body exceeds {limit} bytes"))
            } else {
                OpenAltError::bad_request(format!("Failed to read body: {e}"))
            }
        })
}

/// Route one request. Generic over the body so tests can call it directly.
pub async fn handle_request<B>(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<B>,
) -> std::result::Result<Response<BoxBody>, hyper::Error>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(routes::cors_preflight());
    }

    let limit = state.args.max_body_bytes;
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Ok(routes::error_response(&OpenAltError::bad_request(format!(
            "Request body exceeds {limit} bytes"
        ))));
    }

    let (parts, body) = req.into_parts();
    let body = match read_body(body, limit).await {
        Ok(body) => body,
        Err(e) => return Ok(routes::error_response(&e)),
    };

    let api = ApiRequest {
        method: parts.method,
        path: path.clone(),
        query: parts.uri.query().map(String::from),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    };

    let handled = match path.as_str() {
        "/health" | "/healthz" if api.method == Method::GET => Some(routes::health_check(&state)),
        "/version" if api.method == Method::GET => Some(routes::version_info()),
        p if p.starts_with("/auth/") => routes::handle_auth_request(&api, &state).await,
        p if p.starts_with("/api/alternatives") => {
            routes::handle_alternatives_request(&api, &state).await
        }
        p if p.starts_with("/api/notifications") => {
            routes::handle_notifications_request(&api, &state).await
        }
        p if p.starts_with("/api/advertisements") => {
            routes::handle_advertisements_request(&api, &state).await
        }
        p if p.starts_with("/api/payments") => routes::handle_payments_request(&api, &state).await,
        p if p.starts_with("/api/") => routes::handle_taxonomy_request(&api, &state).await,
        _ => None,
    };

    Ok(handled.unwrap_or_else(|| routes::not_found_response(&path)))
}
