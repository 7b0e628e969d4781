//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All problems are reported at
//! once so a bad deployment can be fixed in one pass.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app_name must not be blank")]
    BlankAppName,

    #[error("backends[{0}] is empty")]
    EmptyBackend(usize),

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error(
        "health.path {0:?} must start with '/', must not be the root path \
         and must not contain route syntax ('{{', '}}', '*')"
    )]
    InvalidHealthPath(String),
}

/// Validate a merged configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app_name.trim().is_empty() {
        errors.push(ValidationError::BlankAppName);
    }

    for (idx, backend) in config.backends.iter().enumerate() {
        if backend.trim().is_empty() {
            errors.push(ValidationError::EmptyBackend(idx));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let path = &config.health.path;
    if !path.starts_with('/') || path == "/" || path.contains(['{', '}', '*']) {
        errors.push(ValidationError::InvalidHealthPath(path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
