//! logweave demo server.
//!
//! Loads a logging configuration, installs the configured handler as the
//! default logger, and serves a small axum app with request-scoped logging.
//!
//! ```text
//! request
//!     → TraceLayer (tower-http diagnostics)
//!     → request logger layer (request id, trace ids, request record)
//!     → handler (extracts `Logger`)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{routing::get, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use logweave::config::{self, Format, LoggingConfig};
use logweave::observability::{self, DEFAULT_FILTER};
use logweave::{Attr, Logger, Sink};

#[derive(Parser, Debug)]
#[command(name = "logweave", about = "Structured logging demo server", version)]
struct Args {
    /// Path to a TOML logging configuration. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Route `tracing` diagnostics through the configured handler.
    #[arg(long)]
    bridge_tracing: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => LoggingConfig::default(),
    };

    let logger = config::build_logger(&config, Sink::stdout())?;
    logweave::set_default(logger.clone());

    if args.bridge_tracing {
        observability::init_bridged(&logger, DEFAULT_FILTER)?;
    } else {
        observability::init_tracing(DEFAULT_FILTER)?;
    }

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        "logweave v0.1.0 starting"
    );

    let routes = Router::new().route("/", get(hello));
    let app = match config.format {
        Format::Cloud => routes.layer(config::cloud_layer(&config, logger)),
        Format::Pretty | Format::Json => routes.layer(config::request_layer(&config, logger)),
    }
    .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(args.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn hello(logger: Logger) -> &'static str {
    logger.info("Saying hello", [Attr::string("greeting", "hello")]);
    "hello\n"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
