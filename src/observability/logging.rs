//! Diagnostics setup.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the crate's own diagnostics
//! - Optionally route `tracing` events through a configured handler
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the default filter directives
//! - Initialization is fallible so embedding applications keep their own subscriber

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::bridge::HandlerLayer;
use crate::logger::Logger;

pub const DEFAULT_FILTER: &str = "logweave=debug,tower_http=debug";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Plain `fmt` output on stdout.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Events are formatted by `logger`'s handler instead of the `fmt` layer.
pub fn init_bridged(logger: &Logger, default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(HandlerLayer::new(logger.handler().clone()))
        .try_init()
}
