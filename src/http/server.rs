//! Proxy engine.
//!
//! # Responsibilities
//! - Create the Axum Router served by the secure listener
//! - Run the director on every request
//! - Forward requests to the target over a pooled client
//! - Relay the upstream response (status, headers, streamed body)
//!
//! # Design Decisions
//! - One catch-all handler; there is no routing, only one target
//! - Upstream failures are answered with 502 (504 on timeout), never retried
//! - Request and response bodies are streamed, never collected

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Version},
    response::{IntoResponse, Response},
    Router,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::http::headers::remove_hop_by_hop;
use crate::http::request::Director;
use crate::http::response::relay;
use crate::resilience::timeouts::upstream_deadline;

/// Client used for every upstream request (`http` and `https` targets).
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct ProxyState {
    pub director: Arc<Director>,
    pub client: UpstreamClient,
    pub upstream_timeout: Option<Duration>,
}

/// HTTP service forwarding everything to the configured target.
pub struct ProxyServer {
    router: Router,
}

impl ProxyServer {
    /// Create the proxy for `director`'s target.
    pub fn new(director: Director, upstream_timeout: Option<Duration>) -> Self {
        let state = ProxyState {
            director: Arc::new(director),
            client: build_client(),
            upstream_timeout,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: ProxyState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router to serve. Requires `ConnectInfo<SocketAddr>`.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Build the pooled upstream client.
pub fn build_client() -> UpstreamClient {
    let connector = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(connector)
}

/// Main proxy handler.
async fn proxy_handler(
    State(state): State<ProxyState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let mut request = state.director.direct(request, &remote_addr.to_string());
    *request.version_mut() = Version::HTTP_11;
    remove_hop_by_hop(request.headers_mut());

    match upstream_deadline(state.upstream_timeout, state.client.request(request)).await {
        Ok(response) => relay(response),
        Err(e) => {
            tracing::error!(
                client = %remote_addr,
                upstream = %state.director.target(),
                error = ?e,
                "Upstream request failed"
            );
            e.into_response()
        }
    }
}
