//! Upstream target descriptor.
//!
//! The target is parsed once at startup and shared read-only by every
//! request. A target never exists without a scheme and a host.

use axum::http::uri::{Authority, Scheme};
use thiserror::Error;
use url::Url;

/// Error returned when the configured target URL is unusable.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid target URL {url:?}: {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("target URL {0:?} has no host")]
    MissingHost(String),

    #[error("target URL {url:?} has unsupported scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("target URL {url:?} has an invalid authority: {reason}")]
    InvalidAuthority { url: String, reason: String },
}

/// The single upstream every proxied request is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    authority: Authority,
    path: String,
    query: String,
}

impl Target {
    /// Parse a target from a URL string such as `http://backend:8080/base?k=v`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw).map_err(|source| TargetError::Parse {
            url: raw.to_string(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => {
                return Err(TargetError::UnsupportedScheme {
                    url: raw.to_string(),
                    scheme: other.to_string(),
                })
            }
        };

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(TargetError::MissingHost(raw.to_string())),
        };

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = authority
            .parse::<Authority>()
            .map_err(|e| TargetError::InvalidAuthority {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            scheme,
            authority,
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Base path requests are joined onto.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query merged in front of every request query. Empty if none.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_target() {
        let target = Target::parse("http://localhost:8080").unwrap();
        assert_eq!(target.scheme(), &Scheme::HTTP);
        assert_eq!(target.authority().as_str(), "localhost:8080");
        assert_eq!(target.path(), "/");
        assert_eq!(target.query(), "");
    }

    #[test]
    fn parses_path_and_query() {
        let target = Target::parse("https://upstream/base/?a=1").unwrap();
        assert_eq!(target.scheme(), &Scheme::HTTPS);
        assert_eq!(target.authority().as_str(), "upstream");
        assert_eq!(target.path(), "/base/");
        assert_eq!(target.query(), "a=1");
        assert_eq!(target.to_string(), "https://upstream/base/?a=1");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Target::parse("not a url"),
            Err(TargetError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(matches!(
            Target::parse("ftp://files.example.com"),
            Err(TargetError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn keeps_ipv6_brackets_in_authority() {
        let target = Target::parse("http://[::1]:9000/").unwrap();
        assert_eq!(target.authority().as_str(), "[::1]:9000");
    }
}
