//! Execution engines: the native per-group path and the compiled path.

use std::str::FromStr;
use std::sync::Arc;

use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::compiler::CompiledArtifact;
use super::core::{FunctionBody, Kwargs, TransformFunction};
use crate::core::error::{Error, Result};
use crate::groupby::partition::GroupSlice;

/// Engine selected by the caller of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Call the function directly, whatever its argument convention
    #[default]
    Native,
    /// Compile `f(values, index)` once and call the compiled artifact
    Compiled,
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "cython" => Ok(Engine::Native),
            "compiled" | "numba" | "jit" => Ok(Engine::Compiled),
            other => Err(Error::InvalidInput(format!(
                "unknown engine '{}', expected 'native' or 'compiled'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Native => write!(f, "native"),
            Engine::Compiled => write!(f, "compiled"),
        }
    }
}

/// A ready-to-run engine: everything needed to turn a group slice into results
pub enum ExecutionEngine<'a> {
    Native {
        function: &'a TransformFunction,
        kwargs: &'a Kwargs,
    },
    Compiled {
        artifact: Arc<CompiledArtifact>,
    },
}

impl<'a> ExecutionEngine<'a> {
    pub fn native(function: &'a TransformFunction, kwargs: &'a Kwargs) -> Self {
        ExecutionEngine::Native { function, kwargs }
    }

    pub fn compiled(artifact: Arc<CompiledArtifact>) -> Self {
        ExecutionEngine::Compiled { artifact }
    }

    pub fn kind(&self) -> Engine {
        match self {
            ExecutionEngine::Native { .. } => Engine::Native,
            ExecutionEngine::Compiled { .. } => Engine::Compiled,
        }
    }

    /// Transform one group; the result has one value per row of the group
    pub fn apply(&self, slice: &GroupSlice) -> Result<Vec<f64>> {
        trace!("{} engine: group {} ({} rows)", self.kind(), slice.key, slice.len());

        match self {
            ExecutionEngine::Native { function, kwargs } => {
                let result = call_native(function, kwargs, slice)?;
                broadcast_to_group(result, slice)
            }
            ExecutionEngine::Compiled { artifact } => {
                let result = artifact.invoke(&slice.values, &slice.index)?;
                check_shape(result, slice)
            }
        }
    }

    /// Transform every group, in the order given.
    ///
    /// A compiled artifact built with `parallel` runs groups concurrently on
    /// its runtime's pool; results still come back in input order.
    pub fn apply_all(&self, slices: &[GroupSlice]) -> Result<Vec<Vec<f64>>> {
        match self {
            ExecutionEngine::Compiled { artifact } if artifact.config().parallel => {
                artifact.install(|| slices.par_iter().map(|s| self.apply(s)).collect())
            }
            _ => slices.iter().map(|s| self.apply(s)).collect(),
        }
    }
}

fn call_native(function: &TransformFunction, kwargs: &Kwargs, slice: &GroupSlice) -> Result<Vec<f64>> {
    match function.body() {
        FunctionBody::Keywords(f) => f(&slice.values, &slice.index, kwargs),
        _ if !kwargs.is_empty() => {
            let name = kwargs.keys().next().map(String::as_str).unwrap_or_default();
            Err(Error::InvalidInput(format!(
                "{}() got an unexpected keyword argument '{}'",
                function.name(),
                name
            )))
        }
        FunctionBody::Elementwise(f) => Ok(slice.values.iter().map(|&x| f(x)).collect()),
        FunctionBody::Values(f) => f(&slice.values),
        FunctionBody::ValuesIndex(f) => f(&slice.values, &slice.index),
    }
}

fn check_shape(result: Vec<f64>, slice: &GroupSlice) -> Result<Vec<f64>> {
    if result.len() != slice.len() {
        return Err(Error::Shape {
            group: slice.key.to_string(),
            expected: slice.len(),
            actual: result.len(),
        });
    }
    Ok(result)
}

/// Native results may be a single value, repeated over the group
fn broadcast_to_group(result: Vec<f64>, slice: &GroupSlice) -> Result<Vec<f64>> {
    if result.len() == 1 && slice.len() > 1 {
        return Ok(vec![result[0]; slice.len()]);
    }
    check_shape(result, slice)
}
