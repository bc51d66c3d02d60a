use crate::http::request::{Method, Request, Version};
use bytes::Bytes;
use std::collections::HashMap;

/// httparse needs the header array preallocated.
pub const MAX_HEADERS: usize = 64;
/// Upper bound for the request line plus headers.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;
/// Largest request body the connection reads and discards to keep the
/// connection open. Anything larger closes the connection instead.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidHeader,
    TooManyHeaders,
    InvalidContentLength,
    UnsupportedTransferEncoding,
    HeadTooLarge,
    Incomplete,
}

impl From<httparse::Error> for ParseError {
    fn from(e: httparse::Error) -> Self {
        match e {
            httparse::Error::HeaderName
            | httparse::Error::HeaderValue
            | httparse::Error::NewLine => ParseError::InvalidHeader,
            httparse::Error::TooManyHeaders => ParseError::TooManyHeaders,
            _ => ParseError::InvalidRequest,
        }
    }
}

/// Parses one request head off the front of `buf`.
///
/// Returns as soon as the request line and headers are complete, with the
/// number of head bytes consumed. A declared body is not waited for; its
/// length is available through [`Request::content_length`].
/// `ParseError::Incomplete` means more input is needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    if let Some(simple) = parse_simple_request(buf) {
        return Ok(simple);
    }

    let mut raw_headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut raw = httparse::Request::new(&mut raw_headers);

    let head_len = match raw.parse(buf)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial if buf.len() >= MAX_HEAD_SIZE => {
            return Err(ParseError::HeadTooLarge);
        }
        httparse::Status::Partial => return Err(ParseError::Incomplete),
    };
    if head_len > MAX_HEAD_SIZE {
        return Err(ParseError::HeadTooLarge);
    }

    let method = Method::from_str(raw.method.ok_or(ParseError::InvalidRequest)?);
    let path = raw.path.ok_or(ParseError::InvalidRequest)?.to_string();
    let minor = raw.version.ok_or(ParseError::InvalidRequest)?;

    // Repeated headers are folded into one comma-separated value
    let mut headers: HashMap<String, String> = HashMap::new();
    for header in raw.headers.iter() {
        let value = std::str::from_utf8(header.value)
            .map_err(|_| ParseError::InvalidHeader)?
            .trim();

        headers
            .entry(header.name.to_string())
            .and_modify(|v| {
                v.push_str(", ");
                v.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    };

    if header("Transfer-Encoding").is_some() {
        return Err(ParseError::UnsupportedTransferEncoding);
    }

    if let Some(v) = header("Content-Length") {
        v.parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
    }

    let request = Request {
        method,
        path,
        version: Version { major: 1, minor },
        headers,
        head: Bytes::copy_from_slice(&buf[..head_len]),
    };

    Ok((request, head_len))
}

/// Recognizes an HTTP/0.9 simple request: `GET <path>` on a line of its
/// own, with no version and no headers.
fn parse_simple_request(buf: &[u8]) -> Option<(Request, usize)> {
    let line_end = buf.iter().position(|&b| b == b'\n')?;
    let line = std::str::from_utf8(&buf[..line_end]).ok()?;

    let mut parts = line.trim_end_matches('\r').split(' ');
    let (Some("GET"), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if !path.starts_with('/') || path.bytes().any(|b| b.is_ascii_control()) {
        return None;
    }

    let request = Request {
        method: Method::GET,
        path: path.to_string(),
        version: Version::HTTP_09,
        headers: HashMap::new(),
        head: Bytes::copy_from_slice(&buf[..=line_end]),
    };

    Some((request, line_end + 1))
}
