//! HTTP Surface
//!
//! Serves the probe endpoints over hyper's HTTP/1 server.
//!
//! | Path | Response |
//! |------|----------|
//! | `/live`, `/ready`, `/startup` | 204 when the category is healthy, 503 otherwise |
//! | `/health` | 200 with every probe's result as JSON |
//! | `/metrics` | Metrics exposition |
//! | `/` | Endpoint index |

mod routes;

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::domain::context::ProbeContext;
use crate::error::Result;
use crate::service::HealthService;

pub use routes::{endpoints, route, INDEX_ENDPOINT, METRICS_ENDPOINT};

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay before retrying after `failures` consecutive accept errors.
fn accept_backoff(failures: u32) -> Duration {
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1u32 << failures.saturating_sub(1).min(16))
        .min(ACCEPT_BACKOFF_MAX)
}

/// HTTP server exposing a [`HealthService`].
#[derive(Debug, Clone)]
pub struct HealthServer {
    config: ServerConfig,
    service: Arc<HealthService>,
}

impl HealthServer {
    pub fn new(config: ServerConfig, service: Arc<HealthService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled.
    ///
    /// Cancelling also cancels the probe rounds of in-flight requests.
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let addr = listener.local_addr()?;
        info!(%addr, "Health server listening");

        let mut accept_failures = 0u32;
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Health server shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(conn) => {
                    accept_failures = 0;
                    conn
                }
                Err(e) => {
                    accept_failures = accept_failures.saturating_add(1);
                    let delay = accept_backoff(accept_failures);
                    warn!(
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Health server accept error"
                    );
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let service = Arc::clone(&self.service);
            let request_timeout = self.config.request_timeout;
            let token = shutdown.clone();
            let conn_shutdown = shutdown.clone();

            tokio::spawn(async move {
                let handler = service_fn(move |req: Request<Incoming>| {
                    let service = Arc::clone(&service);
                    let ctx = ProbeContext::from_token(token.child_token())
                        .with_timeout(request_timeout);
                    async move {
                        let response =
                            route(&service, &ctx, req.method(), req.uri().path()).await;
                        Ok::<_, Infallible>(response)
                    }
                });

                // Keep-alive connections close once shutdown starts
                let conn = http1::Builder::new().serve_connection(io, handler);
                tokio::pin!(conn);
                let served = tokio::select! {
                    served = conn.as_mut() => served,
                    _ = conn_shutdown.cancelled() => {
                        conn.as_mut().graceful_shutdown();
                        conn.as_mut().await
                    }
                };

                if let Err(e) = served {
                    debug!(%peer, error = %e, "Health server connection error");
                }
            });
        }
    }
}
