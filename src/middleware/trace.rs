//! Per-request tracing span.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, info_span};

use crate::handler::{BoxFuture, BoxedHandler, Endpoint};
use crate::metrics::UNMATCHED;
use crate::middleware::Middleware;
use crate::request::Request;

/// Opens a `request` span carrying method, route template and path, and logs
/// status and latency at `debug` when the handler returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceMiddleware;

impl Middleware for TraceMiddleware {
    fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        Arc::new(Traced { inner })
    }
}

struct Traced {
    inner: BoxedHandler,
}

impl Endpoint for Traced {
    fn call(&self, req: Request) -> BoxFuture {
        let span = info_span!(
            "request",
            method = %req.method(),
            route = req.route().unwrap_or(UNMATCHED),
            path = %req.path(),
        );
        let inner = Arc::clone(&self.inner);
        Box::pin(
            async move {
                let start = Instant::now();
                let res = inner.call(req).await;
                debug!(status = res.status_code(), elapsed = ?start.elapsed(), "request completed");
                res
            }
            .instrument(span),
        )
    }
}
