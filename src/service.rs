//! Wires the greeting service: routes, scrape endpoint, middleware.

use crate::config::Config;
use crate::error::Error;
use crate::greet;
use crate::metrics::MetricsRegistry;
use crate::middleware::{MetricsMiddleware, TraceMiddleware};
use crate::{App, Router};

/// Builds the application around an already constructed registry.
///
/// Tracing is the outer layer so its span covers the counting. The scrape
/// route is excluded from counting, so consecutive scrapes read the same.
pub fn build(config: &Config, registry: &MetricsRegistry) -> Result<App, Error> {
    let router = Router::new()
        .get(&config.metrics_path, registry.handler())?
        .get("/", greet::hello)?
        .get("/greet/{name}", greet::greet)?;

    Ok(App::new(router)
        .layer(TraceMiddleware)
        .layer(MetricsMiddleware::new(registry.clone()).exclude(&config.metrics_path)))
}
