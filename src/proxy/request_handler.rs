//! The protocol engine: parses a client request, enforces the blacklist
//! and cycle check, consults the cache under a per-fingerprint mutex, and
//! otherwise forwards to the origin (or a configured upstream proxy).
//!
//! Grounded on `original_source/assign7/request-handler.cc`: ingest
//! request line, headers, payload; open a socket to the target; write the
//! request; ingest the response; write it back to the client. The
//! original traces every step to stdout — this keeps the same step
//! sequence but as `tracing` spans instead of unconditional prints.

use std::io::{BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::RwLock;

use crate::error::ProxyError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::{Headers, Status, Version};
use crate::proxy::blacklist::Blacklist;
use crate::proxy::cache::Cache;

/// Services proxied HTTP requests: blacklist, cache, and either an
/// upstream proxy or the origin server directly.
pub struct RequestHandler {
    identity: String,
    blacklist: Blacklist,
    cache: Cache,
    upstream_proxy: RwLock<Option<(String, u16)>>,
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("identity", &self.identity)
            .field("blacklist", &self.blacklist)
            .field("cache", &self.cache)
            .finish()
    }
}

impl RequestHandler {
    /// Builds a handler identifying itself as `identity` in `Via` headers.
    pub fn new(identity: impl Into<String>, blacklist: Blacklist, cache: Cache) -> Self {
        RequestHandler {
            identity: identity.into(),
            blacklist,
            cache,
            upstream_proxy: RwLock::new(None),
        }
    }

    /// Configures an upstream proxy to chain through. Must be called
    /// before the scheduler starts accepting traffic.
    pub fn set_proxy(&self, host: impl Into<String>, port: u16) {
        *self.upstream_proxy.write().unwrap() = Some((host.into(), port));
    }

    /// Forwards to the cache's default freshness window.
    pub fn set_cache_max_age(&self, seconds: u64) {
        self.cache.set_max_age(seconds);
    }

    /// Forwards to the cache's clear operation.
    pub fn clear_cache(&self) -> std::io::Result<()> {
        self.cache.clear()
    }

    /// Services one client connection end to end. Never lets an error
    /// escape: any failure is converted into a best-effort HTTP response
    /// written back to the client.
    pub fn service_request(&self, stream: &mut (impl Read + Write), client_ip: &str) {
        let span = tracing::debug_span!("service_request", client = client_ip);
        let _enter = span.enter();

        match self.handle(stream, client_ip) {
            Ok(response) => {
                if let Err(e) = response.write_to(stream) {
                    tracing::warn!(error = %e, "failed to write response to client");
                }
            }
            Err(err) => {
                let (status, body) = err.status();
                tracing::warn!(error = %err, status = status.code(), "request failed");
                let response = error_response(status, body);
                let _ = response.write_to(stream);
            }
        }
    }

    fn handle(
        &self,
        stream: &mut (impl Read + Write),
        client_ip: &str,
    ) -> Result<Response, ProxyError> {
        let mut request = {
            let mut reader = BufReader::new(&mut *stream);
            Request::ingest(&mut reader, 80)
                .map_err(|e| ProxyError::ClientProtocol(e.to_string()))?
        };

        tracing::debug!(
            client = client_ip,
            server = %request.server,
            path = %request.path,
            "ingested client request"
        );

        if request.via_chain_contains(&self.identity) {
            return Err(ProxyError::ProxyCycle);
        }

        if !self.blacklist.server_is_allowed(&request.server) {
            return Err(ProxyError::Blacklisted);
        }

        let mutex = self.cache.request_mutex(&request);
        let _single_flight = mutex.lock().unwrap();

        if let Some(cached) = self.cache.lookup(&request) {
            tracing::debug!(server = %request.server, path = %request.path, "cache hit");
            return Ok(cached);
        }

        let (target_host, target_port) = match &*self.upstream_proxy.read().unwrap() {
            Some((host, port)) => {
                request.forward_via_proxy = true;
                (host.clone(), *port)
            }
            None => {
                request.forward_via_proxy = false;
                (request.server.clone(), request.port)
            }
        };
        request.push_via(&self.identity);

        tracing::debug!(target_host, target_port, "connecting upstream");
        let mut upstream = TcpStream::connect((target_host.as_str(), target_port))
            .map_err(ProxyError::UpstreamConnect)?;

        request
            .write_to(&mut upstream)
            .map_err(ProxyError::UpstreamConnect)?;

        let response = {
            let mut reader = BufReader::new(&mut upstream);
            Response::ingest(&mut reader, request.method)
                .map_err(|e| ProxyError::UpstreamProtocol(e.to_string()))?
        };

        if self.cache.should_cache(&request, &response) {
            if let Err(e) = self.cache.store(&request, &response) {
                let err = ProxyError::CacheIo(e);
                tracing::warn!(error = %err, "failed to write cache entry, continuing uncached");
            }
        }

        Ok(response)
    }
}

fn error_response(status: Status, body: &str) -> Response {
    let mut headers = Headers::new();
    headers.push("Content-Length", body.len().to_string());
    headers.push("Content-Type", "text/plain");
    Response {
        version: Version::H1_1,
        status,
        headers,
        payload: body.as_bytes().to_vec(),
        ingested_at: 0,
    }
}
