//! Plaintext upgrade handler.
//!
//! Every request on the upgrade listener is answered with `302 Found`
//! pointing at the same host, path and query over `https`. A request that
//! names no host (no `Host` header, origin-form URI) has nowhere to be sent
//! and gets `400 Bad Request` instead.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the router served by the upgrade listener.
pub fn router() -> Router {
    Router::new()
        .fallback(redirect_handler)
        .layer(TraceLayer::new_for_http())
}

/// The `https` location equivalent to `req`, if the request names a host.
pub fn upgrade_location<B>(req: &Request<B>) -> Option<String> {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))?;

    let request_uri = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Some(format!("https://{}{}", host, request_uri))
}

async fn redirect_handler(req: Request<Body>) -> Response {
    match upgrade_location(&req) {
        Some(location) => {
            tracing::debug!(location = %location, "Redirecting to HTTPS");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        None => {
            tracing::debug!(uri = %req.uri(), "Cannot redirect request without a host");
            (StatusCode::BAD_REQUEST, "Missing Host header").into_response()
        }
    }
}
