//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, overlay PORT/APP_NAME/BACKENDS/INIT_SLEEP_SECONDS)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to the aggregator and server at construction
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never changes afterwards
//! - All fields have defaults so a bare container is a valid leaf node
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{HealthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServiceConfig, StartupConfig};
