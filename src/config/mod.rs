//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoggingConfig (validated, immutable)
//!     → factory.rs (handler chain, logger, request middleware)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Static misconfiguration fails at setup, never per record

pub mod factory;
pub mod loader;
pub mod schema;
pub mod validation;

pub use factory::{build_handler, build_logger, cloud_layer, request_layer};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CloudSettings, Format, HttpSettings, LoggingConfig, PrettySettings};
pub use validation::{validate_config, ValidationError};
