//! Compiled Function Caching System
//!
//! Each grouping object owns one cache mapping (function identity,
//! execution configuration) to the artifact compiled for that pair, so
//! repeated transforms never pay compilation twice.
//!
//! Entries are never evicted; the cache lives exactly as long as its
//! grouping object. Population is strictly single-compile: the cache mutex
//! is held across the compile call, so concurrent first use of a key
//! compiles once and every caller receives the same artifact.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use super::compiler::{CompiledArtifact, Compiler};
use super::config::ExecutionConfig;
use super::core::{FunctionId, TransformFunction};
use crate::core::error::{Error, Result};

/// Key of one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: FunctionId,
    pub config: ExecutionConfig,
}

impl CacheKey {
    pub fn new(function: &TransformFunction, config: &ExecutionConfig) -> Self {
        Self {
            function: function.id(),
            config: *config,
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Arc<CompiledArtifact>>,
    hits: u64,
    misses: u64,
    compilations: u64,
}

/// Per-grouping cache of compiled transform functions
pub struct CompiledFunctionCache {
    state: Mutex<CacheState>,
    enabled: bool,
}

impl Default for CompiledFunctionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompiledFunctionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFunctionCache")
            .field("enabled", &self.enabled)
            .field("entries", &self.len())
            .finish()
    }
}

impl CompiledFunctionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            enabled: true,
        }
    }

    /// Create a cache that compiles on every request and stores nothing
    pub fn disabled() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>> {
        self.state
            .lock()
            .map_err(|_| Error::Cache("compiled function cache lock poisoned".to_string()))
    }

    /// Return the artifact for `(function, config)`, compiling it on first use
    pub fn get_or_compile(
        &self,
        function: &TransformFunction,
        config: &ExecutionConfig,
        compiler: &dyn Compiler,
    ) -> Result<Arc<CompiledArtifact>> {
        let key = CacheKey::new(function, config);
        let mut state = self.lock()?;

        if let Some(artifact) = state.entries.get(&key) {
            let artifact = Arc::clone(artifact);
            state.hits += 1;
            debug!("cache hit for `{}` ({})", function.name(), config);
            return Ok(artifact);
        }

        state.misses += 1;
        debug!("cache miss for `{}` ({})", function.name(), config);

        let artifact = Arc::new(compiler.compile(function, config)?);
        state.compilations += 1;

        if self.enabled {
            state.entries.insert(key, Arc::clone(&artifact));
        }

        Ok(artifact)
    }

    /// Look up an artifact without compiling
    pub fn get(
        &self,
        function: &TransformFunction,
        config: &ExecutionConfig,
    ) -> Option<Arc<CompiledArtifact>> {
        let key = CacheKey::new(function, config);
        self.lock().ok()?.entries.get(&key).cloned()
    }

    /// Whether `function` has been compiled under any configuration
    pub fn contains(&self, function: &TransformFunction) -> bool {
        let id = function.id();
        self.lock()
            .map(|state| state.entries.keys().any(|k| k.function == id))
            .unwrap_or(false)
    }

    /// Whether `function` has been compiled under `config`
    pub fn contains_key(&self, function: &TransformFunction, config: &ExecutionConfig) -> bool {
        self.get(function, config).is_some()
    }

    /// Number of cached artifacts
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        match self.lock() {
            Ok(state) => {
                let lookups = state.hits + state.misses;
                let hit_rate = if lookups > 0 {
                    state.hits as f64 / lookups as f64
                } else {
                    0.0
                };
                CacheStats {
                    hits: state.hits,
                    misses: state.misses,
                    compilations: state.compilations,
                    entries: state.entries.len(),
                    hit_rate,
                }
            }
            Err(_) => CacheStats::default(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of compiler invocations
    pub compilations: u64,
    /// Number of cached functions
    pub entries: usize,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}
