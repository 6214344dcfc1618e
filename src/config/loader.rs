//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Load configuration from environment variables
pub fn load_from_env() -> Result<GroupJitConfig> {
    let mut config = GroupJitConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overwrite the fields whose environment variables are set
pub fn apply_env_overrides(config: &mut GroupJitConfig) -> Result<()> {
    // Engine configuration
    if let Ok(engine) = env::var("GROUPJIT_ENGINE") {
        config.engine.default_engine = Engine::from_str(&engine)
            .map_err(|e| Error::ConfigurationError(format!("Invalid GROUPJIT_ENGINE: {}", e)))?;
    }

    if let Some(nopython) = parse_var::<bool>("GROUPJIT_NOPYTHON")? {
        config.engine.nopython = nopython;
    }

    if let Some(nogil) = parse_var::<bool>("GROUPJIT_NOGIL")? {
        config.engine.nogil = nogil;
    }

    if let Some(parallel) = parse_var::<bool>("GROUPJIT_PARALLEL")? {
        config.engine.parallel = parallel;
    }

    if let Some(threads) = parse_var::<usize>("GROUPJIT_MAX_THREADS")? {
        config.engine.max_threads = threads;
    }

    // Cache configuration
    if let Some(enabled) = parse_var::<bool>("GROUPJIT_CACHE_ENABLED")? {
        config.cache.enabled = enabled;
    }

    // Logging configuration
    if let Ok(log_level) = env::var("GROUPJIT_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
        config.logging.level = log_level;
    }

    Ok(())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<GroupJitConfig> {
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_from_yaml(&contents),
        Some("toml") => load_from_toml(&contents),
        Some(ext) => Err(Error::ConfigurationError(format!(
            "Unsupported config file format: {}",
            ext
        ))),
        None => load_from_yaml(&contents).or_else(|_| load_from_toml(&contents)),
    }
}

/// Load configuration from YAML string
pub fn load_from_yaml(yaml: &str) -> Result<GroupJitConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<GroupJitConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<GroupJitConfig> {
    let mut config = GroupJitConfig::default();

    if let Some(file_path) = config_file {
        let file_config = load_from_file(file_path.as_ref())?;
        config.merge(&file_config);
    }

    // Environment has the highest precedence
    apply_env_overrides(&mut config)?;

    config.validate()?;

    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &GroupJitConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?,
    };

    fs::write(path, contents).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}
