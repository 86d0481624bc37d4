//! Dispatch: router + middleware stack.
//!
//! The [`Router`] only resolves. [`App`] owns the middleware [`Stack`],
//! composes it around every route handler once at startup, and at request
//! time does the rest: resolve, attach the [`Match`](crate::router::Match)
//! to the request, call the composed handler.
//!
//! Routing misses run through the same stack around a built-in 404 handler,
//! so middleware sees every request, matched or not.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::error;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Stack};
use crate::request::Request;
use crate::response::Response;
use crate::router::{Resolution, Router};
use crate::status::Status;

/// A router with its middleware applied, ready to serve.
///
/// ```rust
/// # use tally::{App, MetricsMiddleware, MetricsRegistry, Request, Response, Router};
/// # async fn hello(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), tally::Error> {
/// let registry = MetricsRegistry::new()?;
/// let app = App::new(Router::new().get("/", hello)?)
///     .layer(MetricsMiddleware::new(registry));
/// # Ok(()) }
/// ```
pub struct App {
    router: Router,
    stack: Stack,
    handlers: Vec<BoxedHandler>,
    fallback: BoxedHandler,
}

impl App {
    pub fn new(router: Router) -> Self {
        let mut app = Self {
            router,
            stack: Stack::new(),
            handlers: Vec::new(),
            fallback: not_found.into_boxed_handler(),
        };
        app.compose();
        app
    }

    /// Adds a middleware inside every layer added before it. Applies to all
    /// routes, including the 404 fallback.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.stack = self.stack.layer(middleware);
        self.compose();
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Routes one request and produces one response.
    ///
    /// A panicking handler is logged and answered with `500`; it never takes
    /// down the connection.
    pub async fn handle(&self, mut req: Request) -> Response {
        let handler = match self.router.resolve(req.method(), req.path()) {
            Resolution::Matched(matched) => {
                let handler = Arc::clone(&self.handlers[matched.route_id()]);
                req.set_match(matched);
                handler
            }
            Resolution::NotFound => Arc::clone(&self.fallback),
        };

        let method = req.method();
        let path = req.path().to_owned();
        match AssertUnwindSafe(async move { handler.call(req).await }).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => {
                error!(%method, %path, "handler panicked: {}", panic_message(&*panic));
                Response::status(Status::InternalServerError)
            }
        }
    }

    fn compose(&mut self) {
        self.handlers = self.router.routes().iter()
            .map(|route| self.stack.apply(Arc::clone(&route.handler)))
            .collect();
        self.fallback = self.stack.apply(not_found.into_boxed_handler());
    }
}

async fn not_found(_req: Request) -> Status {
    Status::NotFound
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic.downcast_ref::<&str>().copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    async fn echo_route(req: Request) -> String {
        format!("{} {:?}", req.route().unwrap_or("-"), req.param("name"))
    }

    #[tokio::test]
    async fn handler_sees_match() {
        let app = App::new(Router::new().get("/greet/{name}", echo_route).unwrap());
        let res = app.handle(Request::new(Method::Get, "/greet/Sam")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"/greet/{name} Some(\"Sam\")");
    }

    #[tokio::test]
    async fn miss_is_404() {
        let app = App::new(Router::new().get("/", echo_route).unwrap());
        let res = app.handle(Request::new(Method::Get, "/nope")).await;
        assert_eq!(res.status_code(), 404);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn panic_becomes_500() {
        async fn explode(_req: Request) -> Response {
            panic!("boom")
        }
        let app = App::new(Router::new().get("/", explode).unwrap());
        let res = app.handle(Request::new(Method::Get, "/")).await;
        assert_eq!(res.status_code(), 500);
    }
}
