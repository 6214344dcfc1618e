//! Configuration management for groupjit
//!
//! This module provides library-wide defaults with support for:
//! - Environment variables
//! - YAML/TOML configuration files
//! - Configuration validation

use crate::core::error::{Error, Result};
use crate::optimized::jit::{Engine, ExecutionConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupJitConfig {
    /// Engine selection and compiled-backend defaults
    pub engine: EngineSettings,
    /// Compiled function cache settings
    pub cache: CacheSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Engine configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine used when a transform does not name one
    pub default_engine: Engine,
    /// Forbid the interpreter fallback in compiled code
    pub nopython: bool,
    /// Release the execution lock while compiled code runs
    pub nogil: bool,
    /// Run groups concurrently on the compiled runtime's pool
    pub parallel: bool,
    /// Worker pool size for the compiled runtime (0 = auto-detect)
    pub max_threads: usize,
}

/// Cache configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Keep compiled functions for reuse
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let flags = ExecutionConfig::default();
        Self {
            default_engine: Engine::Native,
            nopython: flags.nopython,
            nogil: flags.nogil,
            parallel: flags.parallel,
            max_threads: 0, // Auto-detect
        }
    }
}

impl EngineSettings {
    /// Compiled-backend flags described by these settings
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig::new()
            .with_nopython(self.nopython)
            .with_nogil(self.nogil)
            .with_parallel(self.parallel)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GroupJitConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        loader::load_from_yaml(yaml)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        loader::load_from_toml(toml)
    }

    /// Load configuration with precedence: defaults -> file -> env
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        loader::save_to_file(self, path.as_ref())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to YAML: {}", e))
        })
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to TOML: {}", e))
        })
    }

    /// Merge another configuration into this one.
    ///
    /// Only values of `other` that differ from the defaults are taken.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.engine.default_engine != defaults.engine.default_engine {
            self.engine.default_engine = other.engine.default_engine;
        }
        if other.engine.nopython != defaults.engine.nopython {
            self.engine.nopython = other.engine.nopython;
        }
        if other.engine.nogil != defaults.engine.nogil {
            self.engine.nogil = other.engine.nogil;
        }
        if other.engine.parallel != defaults.engine.parallel {
            self.engine.parallel = other.engine.parallel;
        }
        if other.engine.max_threads != defaults.engine.max_threads {
            self.engine.max_threads = other.engine.max_threads;
        }

        if other.cache.enabled != defaults.cache.enabled {
            self.cache.enabled = other.cache.enabled;
        }

        if other.logging.level != defaults.logging.level {
            self.logging.level = other.logging.level.clone();
        }
    }
}
