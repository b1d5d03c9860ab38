//! Healthcheck Server
//!
//! Standalone binary serving `/live`, `/ready`, `/startup`, `/health` and
//! `/metrics` for probes declared on the command line.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healthcheck::domain::ports::{MetricsSink, ProbeStore};
use healthcheck::{
    liveness_probe, Error, HealthServer, HealthService, NoopMetricsSink, ProbeDefinition,
    PrometheusMetricsSink, Result, ServerConfig,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Health check server - Kubernetes probe endpoints and Prometheus metrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address for the probe endpoints
    #[arg(long, env = "HEALTHCHECK_ADDR", default_value = "0.0.0.0:5090")]
    addr: SocketAddr,

    /// Metric namespace prefix
    #[arg(long, env = "HEALTHCHECK_NAMESPACE", default_value = "healthcheck")]
    namespace: String,

    /// Deadline for one request's probe round, in seconds
    #[arg(long, env = "HEALTHCHECK_REQUEST_TIMEOUT_SECONDS", default_value = "10")]
    request_timeout_seconds: u64,

    /// Timeout for each built-in check, in seconds
    #[arg(long, env = "HEALTHCHECK_CHECK_TIMEOUT_SECONDS", default_value = "5")]
    check_timeout_seconds: u64,

    /// Disable the Prometheus gauge
    #[arg(long, env = "HEALTHCHECK_DISABLE_METRICS")]
    disable_metrics: bool,

    /// Probe as category:kind:target (kinds: tcp, dns, http); repeatable
    #[arg(long = "probe", env = "HEALTHCHECK_PROBES", value_delimiter = ',')]
    probes: Vec<ProbeDefinition>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.addr,
            namespace: self.namespace.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_seconds),
            metrics_enabled: !self.disable_metrics,
            check_timeout: Duration::from_secs(self.check_timeout_seconds),
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = args.server_config();
    config.validate()?;

    info!("Starting healthcheck server");
    info!("  Bind address: {}", config.bind_addr);
    info!("  Metrics: {}", config.metrics_enabled);
    info!("  Request timeout: {:?}", config.request_timeout);

    let metrics: Arc<dyn MetricsSink> = if config.metrics_enabled {
        Arc::new(PrometheusMetricsSink::new(config.namespace.clone())?)
    } else {
        Arc::new(NoopMetricsSink::new())
    };
    let service = Arc::new(HealthService::with_metrics(metrics));

    let mut probes = vec![liveness_probe()];
    for definition in args.probes.iter().cloned() {
        let probe = definition.into_probe(config.check_timeout)?;
        info!(probe = %probe.name(), kind = %probe.category(), "Registering probe");
        probes.push(probe);
    }
    service.store().add(probes)?;

    let shutdown = CancellationToken::new();
    let server = HealthServer::new(config, Arc::clone(&service));
    let mut server_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.run(shutdown).await })
    };

    tokio::select! {
        joined = &mut server_handle => {
            // Server stopped on its own, e.g. the bind failed
            return joined.map_err(|e| Error::Internal(format!("Server task failed: {}", e)))?;
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    shutdown.cancel();
    server_handle
        .await
        .map_err(|e| Error::Internal(format!("Server task failed: {}", e)))??;

    info!("Healthcheck server stopped");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
