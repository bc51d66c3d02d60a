//! Request validation that runs before any file work.

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Methods this server answers, as advertised in `Allow`.
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Outcome of checking a request.
#[derive(Debug)]
pub enum Verdict {
    /// The request may go on to file resolution.
    Proceed,
    /// The request is answered with this response and nothing else.
    Reject(Response),
}

impl Verdict {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Verdict::Proceed)
    }
}

/// Validates method and expectations.
///
/// Anything but `GET`/`HEAD` gets 405 with `Allow: GET, HEAD`. Any `Expect`
/// header, `100-continue` included, gets 417.
pub fn check(req: &Request) -> Verdict {
    if !matches!(req.method, Method::GET | Method::HEAD) {
        return Verdict::Reject(Response::method_not_allowed(ALLOWED_METHODS));
    }

    if req.expect().is_some() {
        return Verdict::Reject(Response::expectation_failed());
    }

    Verdict::Proceed
}
