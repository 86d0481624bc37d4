//! Request counting.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::handler::{BoxFuture, BoxedHandler, Endpoint};
use crate::metrics::{MetricsRegistry, UNMATCHED};
use crate::middleware::Middleware;
use crate::request::Request;

/// Counts every request in `http_requests_total`, labelled by route template.
///
/// The count is taken after the inner handler finishes, panics included: a
/// panicking handler is still counted, then the panic continues unwinding.
/// Requests without a route match are counted under [`UNMATCHED`].
#[derive(Clone)]
pub struct MetricsMiddleware {
    registry: MetricsRegistry,
    excluded: Arc<HashSet<String>>,
}

impl MetricsMiddleware {
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry, excluded: Arc::default() }
    }

    /// Lets requests to `template` through without counting them.
    pub fn exclude(mut self, template: &str) -> Self {
        Arc::make_mut(&mut self.excluded).insert(template.to_owned());
        self
    }
}

impl Middleware for MetricsMiddleware {
    fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        Arc::new(Counted {
            registry: self.registry.clone(),
            excluded: Arc::clone(&self.excluded),
            inner,
        })
    }
}

struct Counted {
    registry: MetricsRegistry,
    excluded: Arc<HashSet<String>>,
    inner: BoxedHandler,
}

impl Endpoint for Counted {
    fn call(&self, req: Request) -> BoxFuture {
        let label = req.route().unwrap_or(UNMATCHED).to_owned();
        if self.excluded.contains(&label) {
            return self.inner.call(req);
        }

        let registry = self.registry.clone();
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let outcome = AssertUnwindSafe(async move { inner.call(req).await })
                .catch_unwind()
                .await;
            registry.observe(&label);
            match outcome {
                Ok(res) => res,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}
