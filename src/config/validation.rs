//! Configuration validation utilities

use super::*;
use crate::core::error::{Error, Result};
use log::warn;

/// Upper bound on the compiled runtime's worker pool
pub const MAX_WORKER_THREADS: usize = 4096;

/// Validate the entire configuration
pub fn validate_config(config: &GroupJitConfig) -> Result<()> {
    validate_engine_settings(&config.engine)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate engine configuration
pub fn validate_engine_settings(config: &EngineSettings) -> Result<()> {
    if config.max_threads > MAX_WORKER_THREADS {
        return Err(Error::ConfigurationError(format!(
            "max_threads must be at most {}, got {}",
            MAX_WORKER_THREADS, config.max_threads
        )));
    }

    let cpus = num_cpus::get();
    if config.max_threads > cpus {
        warn!(
            "max_threads = {} exceeds the {} available CPUs",
            config.max_threads, cpus
        );
    }

    if config.parallel && !config.nogil {
        warn!("parallel execution without nogil serializes groups on the execution lock");
    }

    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];

    if !valid_levels.contains(&config.level.to_ascii_lowercase().as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log level '{}'. Valid levels: {}",
            config.level,
            valid_levels.join(", ")
        )));
    }

    Ok(())
}
