//! Incoming HTTP request type.

use crate::method::Method;
use crate::router::Match;

/// An incoming HTTP request.
///
/// Built by the server from the hyper request. The dispatch layer attaches
/// the router's [`Match`] before any middleware or handler sees it, so both
/// can read the matched template and the captured path segments.
///
/// No handler here reads headers or a body, so neither is carried.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) matched: Option<Match>,
}

impl Request {
    /// A request for `path`. Handy for driving an [`App`](crate::App)
    /// directly, without a socket.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), matched: None }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }

    /// The path template of the matched route, e.g. `/greet/{name}`.
    pub fn route(&self) -> Option<&str> {
        self.matched.as_ref().map(Match::template)
    }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/greet/{name}`, `req.param("name")` on `/greet/Sam%20Smith`
    /// returns `Some("Sam Smith")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.matched.as_ref().and_then(|m| m.param(key))
    }

    pub(crate) fn set_match(&mut self, matched: Match) {
        self.matched = Some(matched);
    }
}
