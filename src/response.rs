//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. The server turns it
//! into a hyper response; nothing else touches it on the way out.

use bytes::Bytes;
use http_body_util::Full;
use tracing::error;

use crate::status::Status;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// An outgoing HTTP response.
///
/// ```rust
/// use tally::{Response, Status};
///
/// Response::text("hello");
/// Response::typed("text/plain; version=0.0.4", "up 1\n");
/// Response::status(Status::NotFound);
/// ```
pub struct Response {
    body: Bytes,
    content_type: Option<String>,
    status: Status,
}

impl Response {
    /// `200 OK` with `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::typed(TEXT_PLAIN, body)
    }

    /// `200 OK` with an arbitrary content type, e.g. a versioned exposition format.
    pub fn typed(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self { body: body.into(), content_type: Some(content_type.to_owned()), status: Status::Ok }
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Bytes::new(), content_type: None, status: code }
    }

    pub fn status_code(&self) -> u16 { self.status.into() }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Converts into the hyper-facing response.
    ///
    /// A content type that is not a valid header value is a handler bug; it
    /// is logged and the client gets an empty `500` instead.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(http::StatusCode::from(self.status));
        if let Some(content_type) = &self.content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type.as_str());
        }
        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            error!("invalid response: {e}");
            let mut fallback = http::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_sets_content_type_header() {
        let res = Response::typed("text/plain; version=0.0.4", "x 1\n").into_inner();
        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(res.headers()[http::header::CONTENT_TYPE], "text/plain; version=0.0.4");
    }

    #[test]
    fn bad_content_type_becomes_500() {
        let res = Response::typed("text/plain\nx", "hi").into_inner();
        assert_eq!(res.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_only_response_has_no_body_or_type() {
        let res = Status::NotFound.into_response();
        assert_eq!(res.status_code(), 404);
        assert!(res.body().is_empty());
        assert_eq!(res.content_type(), None);
    }
}
