//! Blocking HTTP/1.x response ingestion and rendering.

use std::io::{self, BufRead, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Headers, Method, ParseError, ParseResult, Status, Version};

/// A fully-ingested response, either freshly fetched from an origin or
/// loaded back out of the cache.
#[derive(Debug, Clone)]
pub struct Response {
    /// Protocol version on the status line.
    pub version: Version,
    /// Status code.
    pub status: Status,
    /// Response headers.
    pub headers: Headers,
    /// Response body. Empty for `HEAD` responses.
    pub payload: Vec<u8>,
    /// Unix timestamp this response was ingested, used for freshness checks.
    pub ingested_at: u64,
}

impl Response {
    /// Reads a status line, header block, and (unless `method` is `HEAD`)
    /// payload off `reader`.
    pub fn ingest(reader: &mut impl BufRead, method: Method) -> ParseResult<Self> {
        let line = read_crlf_line(reader)?;
        let (version, status) = parse_status_line(&line)?;
        let headers = ingest_headers(reader)?;
        let payload = ingest_payload(reader, &headers, method)?;

        let ingested_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(Response {
            version,
            status,
            headers,
            payload,
            ingested_at,
        })
    }

    /// Writes this response out to `writer` as a status line, header
    /// block, blank line, then payload.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(
            writer,
            "{} {} {}\r\n",
            self.version,
            self.status.code(),
            self.status.reason_phrase()
        )?;
        for (name, value) in self.headers.iter() {
            write!(writer, "{name}: {value}\r\n")?;
        }
        write!(writer, "\r\n")?;
        writer.write_all(&self.payload)?;
        writer.flush()
    }

    /// Maximum age in seconds this response may be served from cache, per
    /// its own headers, falling back to `default_max_age` when the
    /// response carries no explicit freshness directive.
    pub fn max_age(&self, default_max_age: u64) -> u64 {
        if let Some(cache_control) = self.headers.get("Cache-Control") {
            for directive in cache_control.split(',') {
                let directive = directive.trim();
                if let Some(secs) = directive.strip_prefix("max-age=") {
                    if let Ok(secs) = secs.parse() {
                        return secs;
                    }
                }
            }
        }
        default_max_age
    }

    /// Whether the response, by its own headers, forbids caching outright.
    pub fn forbids_caching(&self) -> bool {
        self.headers
            .get("Cache-Control")
            .map(|cc| {
                cc.split(',')
                    .map(str::trim)
                    .any(|d| d.eq_ignore_ascii_case("no-store") || d.eq_ignore_ascii_case("private"))
            })
            .unwrap_or(false)
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

fn parse_status_line(line: &str) -> ParseResult<(Version, Status)> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or(ParseError::Version)?.parse()?;
    let code: u16 = parts
        .next()
        .ok_or(ParseError::Header)?
        .parse()
        .map_err(|_| ParseError::Header)?;
    let status = Status::from_code(code).ok_or(ParseError::Header)?;
    Ok((version, status))
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

fn ingest_payload(reader: &mut impl BufRead, headers: &Headers, method: Method) -> ParseResult<Vec<u8>> {
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
