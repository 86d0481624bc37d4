//! HTTP server.
//!
//! Accepts TCP connections and serves each on its own tokio task. Requests
//! on different connections never wait on each other; the only state they
//! share is the immutable [`App`] and the atomic counters behind it.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::App;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds `addr`, a `host:port` string.
    ///
    /// A malformed address is reported as an [`Error::Io`] with kind
    /// `InvalidInput`; a port already in use as the bind error itself.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), tally::Error> {
    /// let server = tally::Server::bind("0.0.0.0:9000").await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: &str) -> Result<Self, Error> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Serves on a listener bound elsewhere, e.g. `127.0.0.1:0` in tests.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listener }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections and dispatches their requests through `app`.
    ///
    /// Runs until the task is dropped. Accept errors are logged and skipped.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        // Shared across connection tasks without copying the routing table.
        let app = Arc::new(app);

        info!(addr = %self.local_addr()?, "serving requests");

        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    error!("accept error: {e}");
                    continue;
                }
            };

            let app = Arc::clone(&app);
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                // Called once per request on the connection, not once per connection.
                let svc = service_fn(move |req| {
                    let app = Arc::clone(&app);
                    async move { dispatch(app, req).await }
                });

                // `auto::Builder` handles both HTTP/1.1 and HTTP/2, whatever the client speaks.
                if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(io, svc)
                    .await
                {
                    error!(peer = %remote_addr, "connection error: {e}");
                }
            });
        }
    }
}

/// Converts one hyper request, runs it through the app, converts back.
///
/// The request body is never read: no handler takes one, and dropping it
/// lets hyper discard or close instead of buffering whatever the client sends.
///
/// The error type is [`Infallible`]: every failure becomes a status code, so
/// hyper never sees an error.
async fn dispatch<B>(
    app: Arc<App>,
    req: hyper::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };
    let path = req.uri().path().to_owned();
    drop(req);

    let response = app.handle(Request::new(method, path)).await;
    Ok(response.into_inner())
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use hyper::body::{Body, Frame};

    use super::*;
    use crate::{Config, MetricsRegistry, service};

    /// A body that fails the test if anything polls it.
    struct Untouched;

    impl Body for Untouched {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            panic!("request body was read");
        }
    }

    fn app() -> (Arc<App>, MetricsRegistry) {
        let registry = MetricsRegistry::new().unwrap();
        let app = service::build(&Config::default(), &registry).unwrap();
        (Arc::new(app), registry)
    }

    fn post(path: &str) -> hyper::Request<Untouched> {
        hyper::Request::post(path).body(Untouched).unwrap()
    }

    #[tokio::test]
    async fn request_body_is_never_buffered() {
        let (app, registry) = app();

        let res = dispatch(Arc::clone(&app), post("/nope")).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);

        let get = hyper::Request::get("/greet/Sam").body(Untouched).unwrap();
        let res = dispatch(app, get).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::OK);

        assert_eq!(registry.requests(crate::metrics::UNMATCHED), Some(1));
        assert_eq!(registry.requests("/greet/{name}"), Some(1));
    }

    #[tokio::test]
    async fn unknown_method_is_405_and_uncounted() {
        let (app, registry) = app();
        let req = hyper::Request::builder()
            .method("PURGE")
            .uri("/")
            .body(Untouched)
            .unwrap();

        let res = dispatch(app, req).await.unwrap();

        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert!(registry.snapshot().is_empty());
    }
}
