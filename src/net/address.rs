//! Address string helpers.
//!
//! # Responsibilities
//! - Join a target base path with a request path
//! - Strip the port from a `host:port` remote address
//! - Expand Go-style `:port` bind addresses
//!
//! # Design Decisions
//! - Byte-level string operations only, no `.`/`..` normalization
//! - `strip_port` splits on the first colon, so bracketed IPv6
//!   addresses are not handled (known limitation)

/// Join `base` and `suffix` so that exactly one slash sits at the junction.
pub fn join_path(base: &str, suffix: &str) -> String {
    let base_slash = base.ends_with('/');
    let suffix_slash = suffix.starts_with('/');

    match (base_slash, suffix_slash) {
        (true, true) => format!("{}{}", base, &suffix[1..]),
        (false, false) => format!("{}/{}", base, suffix),
        _ => format!("{}{}", base, suffix),
    }
}

/// Return the host part of a `host:port` string.
pub fn strip_port(hostport: &str) -> &str {
    hostport.split(':').next().unwrap_or(hostport).trim()
}

/// Expand an address with an empty host (`":443"`) to the wildcard address.
pub fn normalize_bind_address(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
