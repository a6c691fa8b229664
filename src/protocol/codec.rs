//! HTTP codec
//!
//! Reading requests from and writing responses to a byte stream.

use std::io::{BufRead, Read, Write};

use crate::error::{ImgfsError, Result};

use super::Response;

/// Maximum size of the request line plus headers (8 KB)
pub const MAX_HEADER_SIZE: usize = 8 * 1024;

/// Maximum body size (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// A parsed HTTP request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URI without its query string
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or("")
    }

    /// Client asked to close after this exchange
    pub fn wants_close(&self) -> bool {
        self.header("Connection")
            .map(|v| v.eq_ignore_ascii_case("close"))
            .unwrap_or(false)
    }
}

// =============================================================================
// Request Decoding
// =============================================================================

/// Read one complete request
///
/// A peer that closes before sending anything yields an `Io` error of kind
/// `UnexpectedEof`.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Request> {
    let mut consumed = 0usize;

    // Request line
    let line = read_line(reader, &mut consumed)?.ok_or_else(|| {
        ImgfsError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed",
        ))
    })?;
    let mut parts = line.split_whitespace();
    let (method, uri, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(u), Some(v)) => (m.to_string(), u.to_string(), v),
        _ => {
            return Err(ImgfsError::Protocol(format!(
                "Malformed request line: {:?}",
                line
            )))
        }
    };
    if !version.starts_with("HTTP/") {
        return Err(ImgfsError::Protocol(format!(
            "Unsupported protocol: {}",
            version
        )));
    }

    // Headers until blank line
    let mut headers = Vec::new();
    loop {
        let line = read_line(reader, &mut consumed)?.ok_or_else(|| {
            ImgfsError::Protocol("Connection closed inside headers".to_string())
        })?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            ImgfsError::Protocol(format!("Malformed header line: {:?}", line))
        })?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut request = Request {
        method,
        uri,
        headers,
        body: Vec::new(),
    };

    // Body
    let body_len = match request.header("Content-Length") {
        Some(v) => v.parse::<usize>().map_err(|_| {
            ImgfsError::Protocol(format!("Invalid Content-Length: {:?}", v))
        })?,
        None => 0,
    };
    if body_len > MAX_BODY_SIZE {
        return Err(ImgfsError::Protocol(format!(
            "Body too large: {} bytes (max {})",
            body_len, MAX_BODY_SIZE
        )));
    }
    if body_len > 0 {
        let mut body = Vec::new();
        body.try_reserve_exact(body_len)?;
        body.resize(body_len, 0);
        reader.read_exact(&mut body)?;
        request.body = body;
    }

    Ok(request)
}

/// Read one CRLF (or LF) terminated line; `None` on EOF before any byte
fn read_line<R: BufRead>(reader: &mut R, consumed: &mut usize) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let limit = (MAX_HEADER_SIZE.saturating_sub(*consumed) + 1) as u64;
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    *consumed += n;
    if *consumed > MAX_HEADER_SIZE {
        return Err(ImgfsError::Protocol(format!(
            "Header block exceeds {} bytes",
            MAX_HEADER_SIZE
        )));
    }
    if buf.last() != Some(&b'\n') {
        return Err(ImgfsError::Protocol("Truncated header line".to_string()));
    }
    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ImgfsError::Protocol("Header is not valid UTF-8".to_string()))
}

// =============================================================================
// Query Variables
// =============================================================================

/// Value of `name` in the URI query string
///
/// Returns `Ok(None)` when the variable is absent and an error when the URI
/// has no query string or the value is empty. Values are percent-decoded.
pub fn get_query_var(uri: &str, name: &str) -> Result<Option<String>> {
    let (_, query) = uri.split_once('?').ok_or_else(|| {
        ImgfsError::InvalidArgument(format!("URI has no query string: {}", uri))
    })?;

    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == name {
                if value.is_empty() {
                    return Err(ImgfsError::InvalidArgument(format!(
                        "Empty value for '{}'",
                        name
                    )));
                }
                return percent_decode(value).map(Some);
            }
        }
    }
    Ok(None)
}

fn percent_decode(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let (hi, lo) = (bytes[i + 1], bytes[i + 2]);
                if !hi.is_ascii_hexdigit() || !lo.is_ascii_hexdigit() {
                    return Err(ImgfsError::InvalidArgument(format!(
                        "Bad escape in {:?}",
                        s
                    )));
                }
                out.push(hex_value(hi) << 4 | hex_value(lo));
                i += 3;
            }
            b'%' => {
                return Err(ImgfsError::InvalidArgument(format!(
                    "Truncated escape in {:?}",
                    s
                )))
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|_| ImgfsError::InvalidArgument(format!("Value is not UTF-8: {:?}", s)))
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Write a response and flush
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&response.encode())?;
    writer.flush()?;
    Ok(())
}
