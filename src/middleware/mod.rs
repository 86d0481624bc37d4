//! Middleware layer.
//!
//! A middleware is a handler decorator: it takes a [`BoxedHandler`] and
//! returns another one that calls through to it, doing its own work before
//! and after. Cross-cutting concerns live here: request counting and
//! per-request tracing.
//!
//! # Ordering
//!
//! [`Stack::layer`] appends. The **first** layer added is the **outermost**:
//! it sees the request first and the response last.
//!
//! ```text
//! Stack::new().layer(trace).layer(metrics)
//!
//!   trace ─▶ metrics ─▶ handler
//!   trace ◀─ metrics ◀─ handler
//! ```

mod metrics;
mod trace;

use std::sync::Arc;

use crate::handler::BoxedHandler;

pub use metrics::MetricsMiddleware;
pub use trace::TraceMiddleware;

/// A `Handler -> Handler` transformer.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, inner: BoxedHandler) -> BoxedHandler;
}

/// An ordered list of middleware, applied around a handler in one go.
#[derive(Clone, Default)]
pub struct Stack {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `middleware` inside every layer added before it.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Wraps `handler` in every layer. The innermost wrap happens first.
    pub fn apply(&self, handler: BoxedHandler) -> BoxedHandler {
        self.layers.iter().rev().fold(handler, |inner, layer| layer.wrap(inner))
    }

    pub fn len(&self) -> usize { self.layers.len() }
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }
}
