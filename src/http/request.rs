//! Blocking HTTP/1.x request ingestion and rendering.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead, Read, Write};

use super::{Headers, Method, ParseError, ParseResult, Version};

/// A fully-ingested client request, ready to be forwarded or matched
/// against the cache.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// Origin or upstream-proxy hostname this request targets.
    pub server: String,
    /// Port on `server`.
    pub port: u16,
    /// Path (and query, if any), always starting with `/`.
    pub path: String,
    /// Protocol version on the request line.
    pub version: Version,
    /// Request headers.
    pub headers: Headers,
    /// Request body, already fully read.
    pub payload: Vec<u8>,
    /// Whether this request should be rendered in absolute-URI
    /// (proxy-style) form when forwarded, rather than origin-relative form.
    pub forward_via_proxy: bool,
}

impl Request {
    /// Reads a request line, header block, and payload off `reader`.
    ///
    /// `default_port` is used when the request target carries no explicit
    /// port and no `Host` header port either (80, conventionally, for the
    /// caller listening on plain HTTP).
    pub fn ingest(reader: &mut impl BufRead, default_port: u16) -> ParseResult<Self> {
        let line = read_crlf_line(reader)?;
        let (method, target, version) = parse_request_line(&line)?;

        let headers = ingest_headers(reader)?;

        let (server, port, path, forward_via_proxy) =
            resolve_target(&target, &headers, default_port)?;

        let payload = ingest_payload(reader, &headers, method)?;

        Ok(Request {
            method,
            server,
            port,
            path,
            version,
            headers,
            payload,
            forward_via_proxy,
        })
    }

    /// Writes this request back out to `writer`, in either proxy
    /// (absolute-URI) or origin-relative form depending on
    /// [`Self::forward_via_proxy`].
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        if self.forward_via_proxy {
            write!(
                writer,
                "{} http://{}:{}{} {}\r\n",
                self.method, self.server, self.port, self.path, self.version
            )?;
        } else {
            write!(writer, "{} {} {}\r\n", self.method, self.path, self.version)?;
        }

        for (name, value) in self.headers.iter() {
            write!(writer, "{name}: {value}\r\n")?;
        }
        write!(writer, "\r\n")?;
        writer.write_all(&self.payload)?;
        writer.flush()
    }

    /// Appends a `Via` entry identifying an intermediary proxy.
    pub fn push_via(&mut self, identity: &str) {
        self.headers.push("Via", format!("{} {}", self.version.bare(), identity));
    }

    /// True if `identity` already appears somewhere in this request's
    /// `Via` chain — i.e. this proxy would be forwarding a request to
    /// itself, directly or transitively.
    pub fn via_chain_contains(&self, identity: &str) -> bool {
        self.headers
            .get_all("Via")
            .any(|via| via.split(',').any(|hop| hop.trim().ends_with(identity)))
    }

    /// A stable fingerprint over the request identity used for cache
    /// lookups and single-flight mutex selection.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.method.to_string().hash(&mut hasher);
        self.server.hash(&mut hasher);
        self.port.hash(&mut hasher);
        self.path.hash(&mut hasher);
        self.payload.hash(&mut hasher);
        hasher.finish()
    }
}

fn read_crlf_line(reader: &mut impl BufRead) -> ParseResult<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|_| ParseError::UnexpectedEof)?;
    if n == 0 {
        return Err(ParseError::UnexpectedEof);
    }
    if !line.ends_with("\r\n") {
        return Err(ParseError::NewLine);
    }
    line.truncate(line.len() - 2);
    Ok(line)
}

fn parse_request_line(line: &str) -> ParseResult<(Method, String, Version)> {
    let mut parts = line.splitn(3, ' ');
    let method = parts.next().ok_or(ParseError::Method)?.parse()?;
    let target = parts.next().ok_or(ParseError::Target)?.to_string();
    let version = parts.next().ok_or(ParseError::Version)?.parse()?;
    Ok((method, target, version))
}

fn ingest_headers(reader: &mut impl BufRead) -> ParseResult<Headers> {
    let mut headers = Headers::new();
    loop {
        let line = read_crlf_line(reader)?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').ok_or(ParseError::Header)?;
        headers.push(name.trim(), value.trim());
    }
    Ok(headers)
}

fn ingest_payload(
    reader: &mut impl BufRead,
    headers: &Headers,
    method: Method,
) -> ParseResult<Vec<u8>> {
    if matches!(method, Method::Head) {
        return Ok(Vec::new());
    }

    let len = match headers.get("Content-Length") {
        Some(v) => v.trim().parse::<usize>().map_err(|_| ParseError::ContentLength)?,
        None => {
            if headers.get("Transfer-Encoding").is_some() {
                tracing::warn!("Transfer-Encoding present with no Content-Length; reading a zero-length body");
            }
            0
        }
    };

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| ParseError::UnexpectedEof)?;
    Ok(buf)
}

/// Splits a request-target into `(server, port, path, forward_via_proxy)`.
///
/// Absolute-form targets (`http://host:port/path`) yield
/// `forward_via_proxy = true`; origin-form targets (`/path`) fall back to
/// the `Host` header and yield `forward_via_proxy = false`.
fn resolve_target(
    target: &str,
    headers: &Headers,
    default_port: u16,
) -> ParseResult<(String, u16, String, bool)> {
    if let Some(rest) = target.strip_prefix("http://") {
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], rest[i..].to_string()),
            None => (rest, "/".to_string()),
        };
        let (host, port) = split_authority(authority, default_port)?;
        return Ok((host, port, path, true));
    }

    if !target.starts_with('/') {
        return Err(ParseError::Target);
    }

    let host_header = headers.get("Host").ok_or(ParseError::Target)?;
    let (host, port) = split_authority(host_header, default_port)?;
    Ok((host, port, target.to_string(), false))
}

fn split_authority(authority: &str, default_port: u16) -> ParseResult<(String, u16)> {
    match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| ParseError::Target)?;
            Ok((host.to_string(), port))
        }
        None => Ok((authority.to_string(), default_port)),
    }
}
