//! Site address parsing.
//!
//! A site address is what an operator writes in the config file:
//! `[scheme://]host[:port][/path]`. The scheme only selects the listener,
//! so it is dropped when the address is turned into a matcher key.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::routing::key::split_host_port;

/// Errors produced while parsing a site address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address contains whitespace")]
    Whitespace,

    #[error("unsupported scheme '{0}'")]
    UnknownScheme(String),
}

/// Scheme prefix of a site address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// A parsed site address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAddress {
    pub scheme: Option<Scheme>,
    /// Host or host pattern (case is normalized by the matcher). IPv6
    /// literals lose their brackets only when a port was split off.
    pub host: String,
    pub port: Option<String>,
    /// Path portion including the leading `/`, empty if none was given.
    pub path: String,
}

impl SiteAddress {
    /// The `host[:port][/path]` key to register with the matcher.
    pub fn key(&self) -> String {
        let mut key = self.authority();
        key.push_str(&self.path);
        key
    }

    /// Every key this address must be registered under.
    ///
    /// A request for an IPv6 literal normalizes to `[::1]` without a port but
    /// to `::1` with one, so such hosts are registered in both forms.
    pub fn matcher_keys(&self) -> Vec<String> {
        let bare = self.host.trim_start_matches('[').trim_end_matches(']');
        if bare.contains(':') {
            vec![
                format!("[{}]{}", bare, self.path),
                format!("{}{}", bare, self.path),
            ]
        } else {
            vec![self.key()]
        }
    }

    fn authority(&self) -> String {
        match &self.port {
            Some(port) if self.host.contains(':') => format!("[{}]:{}", self.host, port),
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

impl FromStr for SiteAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace);
        }

        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
                "http" => (Some(Scheme::Http), rest),
                "https" => (Some(Scheme::Https), rest),
                _ => return Err(AddressError::UnknownScheme(scheme.to_string())),
            },
            None => (None, s),
        };

        let (hostport, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let (host, port) = match split_host_port(hostport) {
            Some((host, port)) if !port.is_empty() => (host.to_string(), Some(port.to_string())),
            Some((host, _)) => (host.to_string(), None),
            None => (hostport.to_string(), None),
        };

        Ok(Self {
            scheme,
            host,
            port,
            path: path.to_string(),
        })
    }
}

impl fmt::Display for SiteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = self.scheme {
            write!(f, "{}://", scheme.as_str())?;
        }
        write!(f, "{}{}", self.authority(), self.path)
    }
}
