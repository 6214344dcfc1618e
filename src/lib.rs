//! Grouped transforms with a choice of execution engine.
//!
//! A [`DataFrame`] is split by one or more key columns; a user
//! [`TransformFunction`] then runs once per group and its results are
//! scattered back into the original row order. The native engine calls
//! the function directly. The compiled engine validates the
//! `f(values, index)` convention, compiles the function once per
//! [`ExecutionConfig`] and reuses the artifact from a cache owned by the
//! grouping object.

#![allow(clippy::needless_lifetimes)]
#![allow(clippy::too_many_arguments)]

// Core module with fundamental data structures and errors
pub mod core;

pub mod config;
pub mod dataframe;
pub mod groupby;
pub mod optimized;
pub mod series;

// Re-export core types
pub use crate::core::column::{Column, ColumnType};
pub use crate::core::error::{Error, Result};
pub use crate::core::index::Index;

pub use config::GroupJitConfig;
pub use dataframe::DataFrame;
pub use groupby::{GroupBy, GroupKey, KeyPart, SeriesGroupBy};
pub use optimized::jit::{
    ArgValue, CacheStats, CompiledArtifact, CompiledFunctionCache, Compiler, Engine,
    ExecutionConfig, FunctionId, JitError, JitResult, KernelCompiler, Kwargs, TransformFunction,
    TransformOptions,
};
pub use series::Series;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
