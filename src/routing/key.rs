//! Request key normalization.
//!
//! # Responsibilities
//! - Split a `host[:port][/path]` key into host and path
//! - Lowercase the host and strip any port
//! - Produce the exact same normalization for inserts and lookups
//!
//! # Design Decisions
//! - Path defaults to `/` so a bare host registers at the root path
//! - Port parsing failures are not errors: the host is used as-is
//! - The path is left untouched (case-sensitive)

/// Splits `key` into a normalized `(host, path)` pair.
///
/// Everything before the first `/` is the host, everything from the `/` on is
/// the path. The host is lowercased and a trailing `:port` is removed.
pub fn split_host_path(key: &str) -> (String, &str) {
    let (host, path) = match key.find('/') {
        Some(idx) => (&key[..idx], &key[idx..]),
        None => (key, "/"),
    };

    let host = host.to_lowercase();
    // Every port gets its own listener and matcher, so the port carries no
    // information once the request has arrived.
    let host = match split_host_port(&host) {
        Some((hostname, _port)) => hostname.to_string(),
        None => host,
    };

    (host, path)
}

/// Splits `host:port`, `[ipv6]:port` or `[ipv6]` style inputs.
///
/// Returns `None` when no port separator is present or the input is
/// malformed (unbalanced brackets, bare IPv6 without brackets). The port
/// itself is not validated and may be empty.
pub fn split_host_port(hostport: &str) -> Option<(&str, &str)> {
    let colon = hostport.rfind(':')?;

    let host = if hostport.starts_with('[') {
        let end = hostport.find(']')?;
        // "]" must be immediately followed by the port separator.
        if end + 1 != colon {
            return None;
        }
        let inner = &hostport[1..end];
        if inner.contains('[') || inner.contains(']') {
            return None;
        }
        inner
    } else {
        let host = &hostport[..colon];
        if host.contains(':') {
            return None;
        }
        host
    };

    let port = &hostport[colon + 1..];
    if port.contains('[') || port.contains(']') {
        return None;
    }
    if !hostport.starts_with('[') && (host.contains('[') || host.contains(']')) {
        return None;
    }

    Some((host, port))
}

/// Builds a matcher key from a request's `Host` header and URL path.
pub fn request_key(host_header: &str, path: &str) -> String {
    if path.is_empty() {
        return host_header.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", host_header, path)
    } else {
        format!("{}/{}", host_header, path)
    }
}
