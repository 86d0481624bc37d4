//! # tally
//!
//! A tiny greeting service on an instrumented HTTP router.
//!
//! ## The request path
//!
//! ```text
//! Server ─▶ App ─▶ Router::resolve ─▶ [TraceMiddleware ─▶ MetricsMiddleware ─▶ handler]
//! ```
//!
//! - **Router** resolves `(method, path)` against path templates such as
//!   `/greet/{name}`. Radix-tree lookup via [`matchit`]. It never calls a
//!   handler.
//! - **App** owns the middleware stack, composes it around every route once,
//!   and dispatches.
//! - **MetricsMiddleware** counts each request in `http_requests_total`,
//!   labelled by the matched *template*. `/greet/alice` and `/greet/bob` are
//!   one series, `/greet/{name}`.
//! - **MetricsRegistry** is an explicit value, built once at startup and
//!   shared by the middleware and the scrape handler.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tally::{App, MetricsMiddleware, MetricsRegistry, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tally::Error> {
//!     let registry = MetricsRegistry::new()?;
//!     let router = Router::new()
//!         .get("/prometheus", registry.handler())?
//!         .get("/greet/{name}", greet)?;
//!     let app = App::new(router).layer(MetricsMiddleware::new(registry));
//!
//!     Server::bind("0.0.0.0:9000").await?.serve(app).await
//! }
//!
//! async fn greet(req: Request) -> Response {
//!     let name = req.param("name").unwrap_or_default();
//!     Response::text(format!("Hello {name}!\n"))
//! }
//! ```

mod app;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod greet;
pub mod metrics;
pub mod middleware;
pub mod service;

pub use app::App;
pub use config::Config;
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Endpoint, Handler};
pub use method::{Method, UnknownMethod};
pub use metrics::MetricsRegistry;
pub use middleware::{MetricsMiddleware, Middleware, Stack, TraceMiddleware};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{Match, Resolution, Router};
pub use server::Server;
pub use status::Status;
