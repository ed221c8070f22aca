//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response without buffering the body
//! - Strip hop-by-hop headers from upstream responses
//! - Map upstream failures to gateway status codes
//!
//! # Design Decisions
//! - Upstream errors are answered per request and never retried
//! - Connection failures → 502 Bad Gateway, timeouts → 504 Gateway Timeout

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use hyper::body::Incoming;
use std::time::Duration;
use thiserror::Error;

use crate::http::headers::remove_hop_by_hop;

/// A failure forwarding a single request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        self.status().into_response()
    }
}

/// Convert an upstream response into one that can be sent to the client.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    remove_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
