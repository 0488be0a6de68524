//! Crate-wide error type and its mapping onto HTTP status responses.
//!
//! Every error kind named in the handler's state machine gets exactly one
//! variant here. A connection thunk never lets one of these escape to the
//! scheduler: [`ProxyError::status`] converts it into a status code and a
//! short textual body before the thunk returns.

use crate::http::Status;

/// Errors that can arise while servicing a single proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The client sent a request this crate could not parse.
    #[error("malformed client request: {0}")]
    ClientProtocol(String),

    /// The requested server matched a blacklist pattern.
    #[error("server is blacklisted")]
    Blacklisted,

    /// The request's Via-chain already contains this proxy's identity.
    #[error("proxy cycle detected")]
    ProxyCycle,

    /// Could not open a TCP connection to the origin or upstream proxy.
    #[error("failed to connect upstream: {0}")]
    UpstreamConnect(#[source] std::io::Error),

    /// The upstream's response could not be parsed.
    #[error("malformed upstream response: {0}")]
    UpstreamProtocol(String),

    /// A cache read or write failed. Never fatal to the request.
    #[error("cache I/O error: {0}")]
    CacheIo(#[source] std::io::Error),
}

impl ProxyError {
    /// Maps this error onto the status code and short body text a client
    /// should see, per the table in the error handling design.
    pub fn status(&self) -> (Status, &'static str) {
        match self {
            ProxyError::ClientProtocol(_) => (Status::BadRequest, "Bad Request"),
            ProxyError::Blacklisted => (Status::Forbidden, "Forbidden Content"),
            ProxyError::ProxyCycle => (Status::GatewayTimeout, "Proxy cycle detected"),
            ProxyError::UpstreamConnect(_) => (Status::BadGateway, "Bad Gateway"),
            ProxyError::UpstreamProtocol(_) => (Status::BadGateway, "Bad Gateway"),
            ProxyError::CacheIo(_) => (Status::InternalServerError, "Internal Server Error"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cycle_maps_to_504() {
        let (status, body) = ProxyError::ProxyCycle.status();
        assert!(matches!(status, Status::GatewayTimeout));
        assert_eq!(body, "Proxy cycle detected");
    }

    #[test]
    fn blacklist_maps_to_403() {
        let (status, body) = ProxyError::Blacklisted.status();
        assert!(matches!(status, Status::Forbidden));
        assert_eq!(body, "Forbidden Content");
    }
}
