//! Per-route request counters.
//!
//! One counter family, `http_requests_total`, labelled by `path`. The label
//! is always a route *template* (`/greet/{name}`), never the literal request
//! path, so the number of series is bounded by the number of registered
//! routes plus the [`UNMATCHED`] sentinel.
//!
//! The registry is an ordinary value: build it once at startup and hand
//! clones to whoever records or renders. Clones share the same counters.

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Label recorded for requests that did not resolve to a registered route.
pub const UNMATCHED: &str = "<unmatched>";

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUESTS_HELP: &str = "Number of get requests.";

/// The metrics registry for one process.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    requests: IntCounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(Opts::new(REQUESTS_TOTAL, REQUESTS_HELP), &["path"])?;
        registry.register(Box::new(requests.clone()))?;
        Ok(Self { registry, requests })
    }

    /// Counts one request against `path`. The series starts at zero the
    /// first time a label is seen.
    pub fn observe(&self, path: &str) {
        self.requests.with_label_values(&[path]).inc();
    }

    /// Current count for `path`, or `None` if the label was never observed.
    ///
    /// Reading does not create the series.
    pub fn requests(&self, path: &str) -> Option<u64> {
        self.snapshot()
            .into_iter()
            .find(|(label, _)| label == path)
            .map(|(_, count)| count)
    }

    /// Every observed label with its count.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.requests
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .filter_map(|metric| {
                let label = metric.get_label().iter().find(|l| l.get_name() == "path")?;
                Some((label.get_value().to_owned(), metric.get_counter().get_value() as u64))
            })
            .collect()
    }

    /// Renders every registered family in the Prometheus text format.
    pub fn render(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(buf)
    }

    /// A route handler serving [`render`](Self::render) as the scrape page.
    pub fn handler(&self) -> impl Handler + use<> {
        let registry = self.clone();
        move |_req: Request| {
            let registry = registry.clone();
            async move { registry.scrape() }
        }
    }

    fn scrape(&self) -> Response {
        match self.render() {
            Ok(body) => Response::typed(TextEncoder::new().format_type(), body),
            Err(e) => {
                error!("metrics encoding failed: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(registry: &MetricsRegistry) -> String {
        String::from_utf8(registry.render().unwrap()).unwrap()
    }

    #[test]
    fn unseen_label_reads_as_none() {
        let registry = MetricsRegistry::new().unwrap();
        assert_eq!(registry.requests("/"), None);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn observe_counts_per_label() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe("/");
        registry.observe("/greet/{name}");
        registry.observe("/greet/{name}");

        assert_eq!(registry.requests("/"), Some(1));
        assert_eq!(registry.requests("/greet/{name}"), Some(2));
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn render_emits_help_type_and_one_line_per_label() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe("/");
        registry.observe("/greet/{name}");

        let text = rendered(&registry);
        assert!(text.contains("# HELP http_requests_total Number of get requests."));
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains("http_requests_total{path=\"/\"} 1"));
        assert!(text.contains("http_requests_total{path=\"/greet/{name}\"} 1"));
    }

    #[test]
    fn render_is_idempotent() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe("/");
        assert_eq!(rendered(&registry), rendered(&registry));
    }

    #[test]
    fn clones_share_counters() {
        let registry = MetricsRegistry::new().unwrap();
        registry.clone().observe("/");
        assert_eq!(registry.requests("/"), Some(1));
    }
}
