//! Configuration validation
//!
//! Bounds checks applied once at startup, before any component is
//! built from the configuration.

use crate::config::Config;
use crate::{ConfigError, ConfigResult};

/// Validates a configuration, returning the first violation found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.probe.worker_pool_size == 0 {
        return Err(ConfigError::Validation(
            "worker pool size must be at least 1".to_string(),
        ));
    }

    if config.probe.link_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "link probe timeout must be nonzero".to_string(),
        ));
    }

    if config.probe.batch_timeout < config.probe.link_timeout {
        return Err(ConfigError::Validation(
            "batch timeout must not be shorter than the link probe timeout".to_string(),
        ));
    }

    if config.fetch.request_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "fetch timeout must be nonzero".to_string(),
        ));
    }

    if config.fetch.connect_timeout >= config.fetch.request_timeout {
        return Err(ConfigError::Validation(
            "connect timeout must be shorter than the fetch timeout".to_string(),
        ));
    }

    if config.fetch.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "body cap must be nonzero".to_string(),
        ));
    }

    if config.server.bind.is_empty() {
        return Err(ConfigError::Validation(
            "bind address must not be empty".to_string(),
        ));
    }

    Ok(())
}
