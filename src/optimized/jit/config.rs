//! # JIT Configuration Module
//!
//! Flags handed to the compiled backend. The dispatcher never interprets
//! them; they only travel to the compiler and form part of the cache key.

use serde::{Deserialize, Serialize};

/// Configuration for one compilation of a transform function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Compile without any fallback to dynamically dispatched code
    pub nopython: bool,
    /// Invocations may run without holding the runtime's execution lock
    pub nogil: bool,
    /// Group invocations may run concurrently on the runtime's worker pool
    pub parallel: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            nopython: true,
            nogil: false,
            parallel: false,
        }
    }
}

impl ExecutionConfig {
    /// Create a new configuration with default flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable no-fallback compilation
    pub fn with_nopython(mut self, enabled: bool) -> Self {
        self.nopython = enabled;
        self
    }

    /// Enable or disable lock-free invocation
    pub fn with_nogil(mut self, enabled: bool) -> Self {
        self.nogil = enabled;
        self
    }

    /// Enable or disable parallel group invocation
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Every combination of the three flags
    pub fn all_combinations() -> Vec<Self> {
        let mut configs = Vec::with_capacity(8);
        for nopython in [true, false] {
            for nogil in [true, false] {
                for parallel in [true, false] {
                    configs.push(Self {
                        nopython,
                        nogil,
                        parallel,
                    });
                }
            }
        }
        configs
    }
}

impl std::fmt::Display for ExecutionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nopython={} nogil={} parallel={}",
            self.nopython, self.nogil, self.parallel
        )
    }
}
