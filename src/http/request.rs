use bytes::Bytes;
use std::collections::HashMap;

/// HTTP request methods.
///
/// Only `GET` and `HEAD` are served. Every other token the client sends is
/// kept as [`Method::Extension`] so the gate can answer it with
/// 405 Method Not Allowed instead of dropping the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other method token, stored verbatim
    Extension(String),
}

impl Method {
    /// Parses an HTTP method from a string. Method names are case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use webdir::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Method::GET);
    /// assert_eq!(Method::from_str("get"), Method::Extension("get".into()));
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::Extension(s) => s.as_str(),
        }
    }
}

/// Protocol version from the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// Simple request: a bare `GET <path>` line with no version or headers.
    pub const HTTP_09: Version = Version { major: 0, minor: 9 };
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
    pub const HTTP_11: Version = Version { major: 1, minor: 1 };

    /// HTTP/0.9 responses carry no status line or headers.
    pub fn has_head(&self) -> bool {
        self.major >= 1
    }

    /// True for HTTP/1.1 and later, which allow chunked framing and default
    /// to persistent connections.
    pub fn is_http11(&self) -> bool {
        (self.major, self.minor) >= (1, 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// A parsed HTTP request.
///
/// Contains everything extracted from the request line and headers. A
/// declared body is not part of the request: the connection discards it
/// after the gate has run.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, HEAD, ...)
    pub method: Method,
    /// The request target exactly as sent (e.g., "/index.html")
    pub path: String,
    pub version: Version,
    /// Request headers as sent, names with their original case
    pub headers: HashMap<String, String>,
    /// Raw bytes of the request line and headers
    pub head: Bytes,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Version,
    headers: HashMap<String, String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: Version::HTTP_11,
            headers: HashMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version,
            headers: self.headers,
            head: Bytes::new(),
        })
    }
}

impl Request {
    /// Retrieves a header value by name. Names compare case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Length of the body that follows the head, from Content-Length.
    ///
    /// Returns 0 if the header is missing or not a valid number. The parser
    /// rejects invalid values before a request gets this far.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// The value of the `Expect` header, if the client sent one.
    pub fn expect(&self) -> Option<&str> {
        self.header("Expect")
    }

    /// Determines whether the connection may stay open after the response.
    ///
    /// HTTP/1.1 stays open unless the client sends `Connection: close`.
    /// HTTP/1.0 closes unless the client sends `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let has_token = |token: &str| {
            self.header("Connection")
                .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
                .unwrap_or(false)
        };

        if self.version.is_http11() {
            !has_token("close")
        } else {
            has_token("keep-alive")
        }
    }
}
