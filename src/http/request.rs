//! Request handling and transformation.
//!
//! # Responsibilities
//! - Attribute the request to the connecting client (`X-Forwarded-For`)
//! - Point the request URI at the configured target
//! - Merge the target query with the request query
//! - Pin an explicit (possibly empty) `User-Agent`
//!
//! # Design Decisions
//! - The director is a pure transformation of a request value; it never fails
//! - The inbound `Host` header is forwarded unchanged; an HTTP/2 `:authority` becomes `Host`
//! - Target and forwarding policy are fixed at construction and shared

use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use std::sync::Arc;

use crate::config::Target;
use crate::http::headers::X_FORWARDED_FOR;
use crate::net::address::{join_path, strip_port};

/// What to do with an `X-Forwarded-For` header supplied by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForwardedFor {
    /// Append the client address to the existing chain.
    #[default]
    Chain,
    /// Discard the existing chain and send only the client address.
    Strip,
}

impl ForwardedFor {
    pub fn from_strip_flag(strip: bool) -> Self {
        if strip {
            ForwardedFor::Strip
        } else {
            ForwardedFor::Chain
        }
    }

    /// Compute the outgoing header value.
    pub fn resolve(self, existing: Option<&str>, client_ip: &str) -> String {
        match (self, existing) {
            (ForwardedFor::Chain, Some(prior)) => format!("{}, {}", prior, client_ip),
            _ => client_ip.to_string(),
        }
    }
}

/// Merge two raw query strings.
pub fn merge_query(target_query: &str, request_query: &str) -> String {
    if target_query.is_empty() || request_query.is_empty() {
        format!("{}{}", target_query, request_query)
    } else {
        format!("{}&{}", target_query, request_query)
    }
}

/// Rewrites inbound requests so they can be sent to the target.
#[derive(Debug, Clone)]
pub struct Director {
    target: Arc<Target>,
    forwarded_for: ForwardedFor,
}

impl Director {
    pub fn new(target: Arc<Target>, forwarded_for: ForwardedFor) -> Self {
        Self {
            target,
            forwarded_for,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Rewrite `req`, received from `remote_addr`, for the target.
    pub fn direct<B>(&self, mut req: Request<B>, remote_addr: &str) -> Request<B> {
        let client_ip = strip_port(remote_addr);

        let existing = existing_forwarded_for(req.headers());
        let forwarded = self.forwarded_for.resolve(existing.as_deref(), client_ip);
        match HeaderValue::from_str(&forwarded) {
            Ok(value) => {
                req.headers_mut().insert(X_FORWARDED_FOR.clone(), value);
            }
            Err(_) => {
                tracing::warn!(client_ip = %client_ip, "Unrepresentable X-Forwarded-For, dropping prior chain");
                req.headers_mut().remove(&X_FORWARDED_FOR);
                if let Ok(value) = HeaderValue::from_str(client_ip) {
                    req.headers_mut().insert(X_FORWARDED_FOR.clone(), value);
                }
            }
        }

        // HTTP/2 carries the host only as `:authority`, which lives in the URI.
        if !req.headers().contains_key(header::HOST) {
            let authority = req
                .uri()
                .authority()
                .and_then(|a| HeaderValue::from_str(a.as_str()).ok());
            if let Some(host) = authority {
                req.headers_mut().insert(header::HOST, host);
            }
        }

        let path = join_path(self.target.path(), req.uri().path());
        let query = merge_query(self.target.query(), req.uri().query().unwrap_or(""));
        *req.uri_mut() = self.compose_uri(&path, &query);

        if !req.headers().contains_key(header::USER_AGENT) {
            // An explicit empty value keeps the client from adding its own.
            req.headers_mut()
                .insert(header::USER_AGENT, HeaderValue::from_static(""));
        }

        let headers = req.headers();
        tracing::info!(
            client_ip = %client_ip,
            url = %req.uri(),
            method = %req.method(),
            user_agent = header_str(headers, header::USER_AGENT),
            referer = header_str(headers, header::REFERER),
            host = header_str(headers, header::HOST),
            "Forwarding request"
        );

        req
    }

    fn compose_uri(&self, path: &str, query: &str) -> Uri {
        let path_and_query = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        };

        Uri::builder()
            .scheme(self.target.scheme().clone())
            .authority(self.target.authority().clone())
            .path_and_query(path_and_query.as_str())
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(
                    path_and_query = %path_and_query,
                    error = %e,
                    "Rewritten URI is invalid, using target root"
                );
                Uri::builder()
                    .scheme(self.target.scheme().clone())
                    .authority(self.target.authority().clone())
                    .path_and_query("/")
                    .build()
                    .unwrap_or_default()
            })
    }
}

/// All `X-Forwarded-For` lines joined into one chain.
fn existing_forwarded_for(headers: &HeaderMap) -> Option<String> {
    let values: Vec<String> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
