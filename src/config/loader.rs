//! Configuration loading from disk and the environment.
//!
//! Precedence, lowest first: built-in defaults, the optional TOML file, then
//! the container environment (`PORT`, `APP_NAME`, `BACKENDS`,
//! `INIT_SLEEP_SECONDS`). Empty variables count as unset.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::aggregator::backends::parse_backend_list;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name} value {value:?}: {reason}")]
    Env {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document into a configuration (no validation).
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load, merge with the process environment, and validate.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ServiceConfig::default(),
    };

    apply_env(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(port) = var("PORT") {
        let port: u16 = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            name: "PORT",
            value: port.clone(),
            reason: e.to_string(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(name) = var("APP_NAME") {
        config.app_name = name;
    }

    if let Some(backends) = var("BACKENDS") {
        config.backends = parse_backend_list(&backends);
    }

    if let Some(secs) = var("INIT_SLEEP_SECONDS") {
        config.startup.init_sleep_secs =
            secs.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
                name: "INIT_SLEEP_SECONDS",
                value: secs.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(())
}
