//! Accelerated execution paths.

pub mod jit;

pub use jit::{Engine, ExecutionConfig, TransformFunction, TransformOptions};
