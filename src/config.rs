//! Service configuration.
//!
//! There are no flags or config files: the defaults below are the service.
//! Log verbosity is the one runtime knob, read from `RUST_LOG` by the binary.

/// Address the server binds.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9000";

/// Route serving the Prometheus scrape page.
pub const DEFAULT_METRICS_PATH: &str = "/prometheus";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `host:port` to listen on.
    pub listen_addr: String,

    /// Template of the scrape route. Requests to it are not counted.
    pub metrics_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}
