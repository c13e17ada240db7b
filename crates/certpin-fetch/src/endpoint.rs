//! Endpoint string parsing and normalization

use std::fmt;

use thiserror::Error;

/// Port assumed when an endpoint names no port of its own.
pub const DEFAULT_PORT: u16 = 443;

/// Endpoint parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid endpoint '{0}'")]
    Malformed(String),

    #[error("invalid port in endpoint '{0}'")]
    InvalidPort(String),

    #[error("ambiguous host in endpoint '{0}': IPv6 literals must be bracketed, e.g. [::1]:443")]
    UnbracketedIpv6(String),
}

/// A parsed endpoint to fetch certificates from.
///
/// Keeps the original operator-supplied string alongside the normalized
/// host and port, so generated output can echo the input verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    original: String,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse an endpoint string.
    ///
    /// Accepts `host`, `host:port`, `[v6addr]`, and `[v6addr]:port`. A
    /// bare host gets [`DEFAULT_PORT`]. A host containing more than one
    /// colon without brackets is rejected rather than split on the wrong
    /// colon.
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EndpointError::Malformed(input.to_string()));
        }

        let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::Malformed(trimmed.to_string()))?;
            if host.is_empty() {
                return Err(EndpointError::Malformed(trimmed.to_string()));
            }
            let port = match after {
                "" => DEFAULT_PORT,
                _ => match after.strip_prefix(':') {
                    Some(port_str) => parse_port(port_str, trimmed)?,
                    None => return Err(EndpointError::Malformed(trimmed.to_string())),
                },
            };
            (host.to_string(), port)
        } else {
            match trimmed.matches(':').count() {
                0 => (trimmed.to_string(), DEFAULT_PORT),
                1 => match trimmed.split_once(':') {
                    Some((host, port_str)) if !host.is_empty() => {
                        (host.to_string(), parse_port(port_str, trimmed)?)
                    }
                    _ => return Err(EndpointError::Malformed(trimmed.to_string())),
                },
                _ => return Err(EndpointError::UnbracketedIpv6(trimmed.to_string())),
            }
        };

        Ok(Self {
            original: trimmed.to_string(),
            host,
            port,
        })
    }

    /// Hostname or IP literal, without brackets or port.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The string the operator supplied, before normalization.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The `host:port` dial string, re-bracketing IPv6 hosts.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority())
    }
}

fn parse_port(port_str: &str, endpoint: &str) -> Result<u16, EndpointError> {
    port_str
        .parse::<u16>()
        .map_err(|_| EndpointError::InvalidPort(endpoint.to_string()))
}
