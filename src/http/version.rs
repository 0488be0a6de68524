//! Representation of the HTTP protocol version carried on the request/status line.
use std::fmt::Display;

/// HTTP protocol version. Only the versions this proxy actually speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// HTTP/1.0
    H1_0,
    /// HTTP/1.1
    H1_1,
}

impl Version {
    /// The bare version token (`1.0`/`1.1`), as used in a `Via` header
    /// value rather than on a request/status line.
    pub fn bare(&self) -> &'static str {
        match self {
            Self::H1_0 => "1.0",
            Self::H1_1 => "1.1",
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::H1_0 => "HTTP/1.0",
            Self::H1_1 => "HTTP/1.1",
        })
    }
}

impl std::str::FromStr for Version {
    type Err = super::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(Self::H1_0),
            "HTTP/1.1" => Ok(Self::H1_1),
            _ => Err(super::ParseError::Version),
        }
    }
}
