//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Crate diagnostics (tracing macros)
//!     → logging.rs (EnvFilter + fmt layer, or the bridge)
//!
//! Application tracing events
//!     → bridge.rs (HandlerLayer)
//!     → any Handler (pretty, cloud, json)
//! ```
//!
//! # Design Decisions
//! - The crate's own diagnostics use `tracing`, never a `Logger`
//! - Bridge failures go to stderr so they cannot loop back into the subscriber

pub mod bridge;
pub mod logging;

pub use bridge::{level_of, HandlerLayer};
pub use logging::{init_bridged, init_tracing, DEFAULT_FILTER};
