//! The greeting service: `/`, `/greet/{name}` and a Prometheus scrape page
//! at `/prometheus`, on port 9000.
//!
//! Run with:
//!   RUST_LOG=tally=debug cargo run
//!
//! Try:
//!   curl http://localhost:9000/
//!   curl http://localhost:9000/greet/Sam
//!   curl http://localhost:9000/prometheus

use std::process::ExitCode;

use tally::{Config, Error, MetricsRegistry, Server, service};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tally=info".into()))
        .init();

    match run(Config::default()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let registry = MetricsRegistry::new()?;
    let app = service::build(&config, &registry)?;

    Server::bind(&config.listen_addr).await?.serve(app).await
}
