//! # Just-In-Time (JIT) Transform Module
//!
//! Dual-engine execution for grouped transforms: a native path that calls
//! user functions directly, and a compiled path that validates the
//! `(values, index)` signature, compiles once per (function, configuration)
//! and reuses the artifact from a per-grouping cache.

pub mod cache;
pub mod compiler;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod signature;

pub use cache::{CacheKey, CacheStats, CompiledFunctionCache};
pub use compiler::{CompiledArtifact, CompiledRuntime, Compiler, KernelCompiler};
pub use config::ExecutionConfig;
pub use self::core::{ArgValue, FunctionBody, FunctionId, FunctionSignature, Kwargs, TransformFunction};
pub use dispatch::{TransformDispatcher, TransformOptions};
pub use engine::{Engine, ExecutionEngine};

/// Errors reported by the compiler service
#[derive(Debug, Clone)]
pub enum JitError {
    /// Compilation failed
    CompilationFailed(String),
    /// Runtime execution failed
    ExecutionFailed(String),
    /// Invalid configuration
    InvalidConfig(String),
}

impl std::fmt::Display for JitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JitError::CompilationFailed(msg) => write!(f, "JIT compilation failed: {}", msg),
            JitError::ExecutionFailed(msg) => write!(f, "JIT execution failed: {}", msg),
            JitError::InvalidConfig(msg) => write!(f, "Invalid JIT configuration: {}", msg),
        }
    }
}

impl std::error::Error for JitError {}

/// JIT Result type
pub type JitResult<T> = std::result::Result<T, JitError>;
