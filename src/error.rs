//! Unified error type.

use crate::method::Method;

/// The error type returned by tally's fallible operations.
///
/// Application-level outcomes (404, 405, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// configuration mistakes caught at startup and infrastructure failures:
/// binding to a port, accepting a connection, encoding the metrics page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path template could not be parsed or conflicts with the routing tree.
    #[error("invalid route `{template}`: {reason}")]
    InvalidRoute { template: String, reason: String },

    /// The same template was registered twice for one method.
    #[error("route `{method} {template}` is already registered")]
    DuplicateRoute { method: Method, template: String },

    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_route(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRoute { template: template.to_owned(), reason: reason.into() }
    }
}
