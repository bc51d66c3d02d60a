/// HTTP status codes produced by the server.
///
/// - `Ok` (200): File served
/// - `BadRequest` (400): Request could not be parsed
/// - `NotFound` (404): No servable file for the request path
/// - `MethodNotAllowed` (405): Method other than GET or HEAD
/// - `ExpectationFailed` (417): Request carried an `Expect` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 417 Expectation Failed
    ExpectationFailed,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webdir::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::ExpectationFailed => 417,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::ExpectationFailed => "Expectation Failed",
        }
    }
}

/// A complete, buffered HTTP response.
///
/// Only error responses are buffered; file contents are streamed by
/// [`crate::http::static_files`]. Headers keep insertion order.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::NotFound)
///     .header("Content-type", "text/html")
///     .body(b"<p>gone</p>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header. Names compare case-insensitively.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length header matching the body size unless one is
    /// already present, so keep-alive clients can find the end of it.
    pub fn build(mut self) -> Response {
        if !self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        {
            self.headers
                .push(("Content-Length".to_string(), self.body.len().to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Looks up a header value by name, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// 404 naming the URI the client asked for.
    pub fn not_found(uri: &str) -> Self {
        error_page(
            StatusCode::NotFound,
            &format!(
                "The requested URL {} was not found on this server.",
                escape_html(uri)
            ),
        )
        .build()
    }

    /// 405 advertising the methods this server accepts.
    pub fn method_not_allowed(allow: &str) -> Self {
        error_page(
            StatusCode::MethodNotAllowed,
            &format!("Method not allowed. Allowed methods: {}.", escape_html(allow)),
        )
        .header("Allow", allow)
        .build()
    }

    pub fn expectation_failed() -> Self {
        error_page(
            StatusCode::ExpectationFailed,
            "The server cannot meet the request's expectation.",
        )
        .build()
    }

    pub fn bad_request() -> Self {
        error_page(StatusCode::BadRequest, "The request could not be understood.").build()
    }
}

fn error_page(status: StatusCode, message: &str) -> ResponseBuilder {
    let title = format!("{} {}", status.as_u16(), status.reason_phrase());
    let body = format!(
        "<html><head><title>{title}</title></head>\n<body><h1>{title}</h1>\n<p>{message}</p>\n</body></html>\n"
    );

    ResponseBuilder::new(status)
        .header("Content-type", "text/html")
        .body(body.into_bytes())
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
