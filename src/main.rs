//! PageScope main entry point
//!
//! Serves the analyzer over JSON/HTTP. Every option is env-backed with
//! a CLI override and a default, so a bare `pagescope` starts a
//! working server.

use clap::Parser;
use pagescope::analyzer::Analyzer;
use pagescope::config::{validate, Config, FetchConfig, ProbeConfig, ServerConfig};
use pagescope::fetch::HttpFetcher;
use pagescope::probe::LinkProbeEngine;
use pagescope::server::{router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PageScope: a web page structure and link health analyzer
#[derive(Parser, Debug)]
#[command(name = "pagescope")]
#[command(version)]
#[command(about = "Analyze a web page's structure and link health", long_about = None)]
struct Cli {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "PAGESCOPE_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Probe worker pool size per batch
    #[arg(long, env = "PAGESCOPE_WORKERS", default_value_t = 10)]
    workers: usize,

    /// Seconds before a single link probe is abandoned
    #[arg(long, env = "PAGESCOPE_LINK_TIMEOUT_SECS", default_value_t = 5)]
    link_timeout_secs: u64,

    /// Seconds before a whole probe batch is cut off
    #[arg(long, env = "PAGESCOPE_BATCH_TIMEOUT_SECS", default_value_t = 30)]
    batch_timeout_secs: u64,

    /// Seconds budgeted for one analysis request, root fetch included
    #[arg(long, env = "PAGESCOPE_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Seconds allowed for a TCP connect
    #[arg(long, env = "PAGESCOPE_CONNECT_TIMEOUT_SECS", default_value_t = 2)]
    connect_timeout_secs: u64,

    /// Maximum bytes read from any response body
    #[arg(long, env = "PAGESCOPE_MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024)]
    max_body_bytes: usize,

    /// Idle connections kept per remote host
    #[arg(long, env = "PAGESCOPE_MAX_IDLE_PER_HOST", default_value_t = 70)]
    max_idle_per_host: usize,

    /// Log verbosity filter (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            fetch: FetchConfig {
                request_timeout: Duration::from_secs(self.fetch_timeout_secs),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                max_body_bytes: self.max_body_bytes,
                max_idle_per_host: self.max_idle_per_host,
            },
            probe: ProbeConfig {
                worker_pool_size: self.workers,
                link_timeout: Duration::from_secs(self.link_timeout_secs),
                batch_timeout: Duration::from_secs(self.batch_timeout_secs),
            },
            server: ServerConfig { bind: self.bind },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level);

    let config = cli.into_config();
    if let Err(e) = validate(&config) {
        tracing::error!("invalid configuration: {}", e);
        return Err(e.into());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let engine = Arc::new(LinkProbeEngine::new(
        fetcher.clone(),
        config.probe.clone(),
    ));
    engine.start();

    let analyzer = Arc::new(Analyzer::new(fetcher, engine.clone()));

    let app = router(AppState {
        analyzer,
        engine: engine.clone(),
        request_budget: config.fetch.request_timeout,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %config.server.bind,
        workers = config.probe.worker_pool_size,
        "starting pagescope server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    engine.stop();

    Ok(())
}

/// Sets up the tracing subscriber from the configured log level.
///
/// `RUST_LOG` takes precedence when set, so targeted filters still
/// work in development.
fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pagescope={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
