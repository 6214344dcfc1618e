//! # Core Transform Function Module
//!
//! User-supplied transform functions and the identity token the compiled
//! function cache keys on.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::error::Result;

/// Keyword argument value forwarded to native transform functions
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v as i64)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl ArgValue {
    /// Numeric view of the argument, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            ArgValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            ArgValue::Str(_) => None,
        }
    }
}

/// Keyword arguments, ordered by name
pub type Kwargs = BTreeMap<String, ArgValue>;

/// Kernel shape the compiled engine accepts: `(values, index) -> values`
pub type KernelFn = dyn Fn(&[f64], &[i64]) -> Result<Vec<f64>> + Send + Sync;

/// Process-unique identity of a transform function handle.
///
/// Clones of a handle share the id; two handles built separately never
/// compare equal, even when they wrap identical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u64);

static NEXT_FUNCTION_ID: AtomicU64 = AtomicU64::new(1);

impl FunctionId {
    fn next() -> Self {
        FunctionId(NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Declared parameters of a transform function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name, used in error messages
    pub name: String,
    /// Positional parameter names, in order
    pub positional: Vec<String>,
    /// Whether the function captures arbitrary keyword arguments
    pub var_keyword: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, positional: &[&str], var_keyword: bool) -> Self {
        Self {
            name: name.into(),
            positional: positional.iter().map(|p| p.to_string()).collect(),
            var_keyword,
        }
    }

    /// Number of positional parameters
    pub fn arity(&self) -> usize {
        self.positional.len()
    }
}

/// The callable behind a transform function, by argument convention
#[derive(Clone)]
pub enum FunctionBody {
    /// `f(x)` applied to every element
    Elementwise(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
    /// `f(values)` applied to a whole group
    Values(Arc<dyn Fn(&[f64]) -> Result<Vec<f64>> + Send + Sync>),
    /// `f(values, index)` applied to a whole group
    ValuesIndex(Arc<KernelFn>),
    /// `f(values, index, **kwargs)` applied to a whole group
    Keywords(Arc<dyn Fn(&[f64], &[i64], &Kwargs) -> Result<Vec<f64>> + Send + Sync>),
}

impl std::fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            FunctionBody::Elementwise(_) => "Elementwise",
            FunctionBody::Values(_) => "Values",
            FunctionBody::ValuesIndex(_) => "ValuesIndex",
            FunctionBody::Keywords(_) => "Keywords",
        };
        f.write_str(kind)
    }
}

/// A transform function handle
#[derive(Clone, Debug)]
pub struct TransformFunction {
    id: FunctionId,
    signature: FunctionSignature,
    body: FunctionBody,
    precompiled: bool,
    object_mode: bool,
}

impl TransformFunction {
    fn from_parts(signature: FunctionSignature, body: FunctionBody) -> Self {
        Self {
            id: FunctionId::next(),
            signature,
            body,
            precompiled: false,
            object_mode: false,
        }
    }

    /// `f(x)` over each element of a group
    pub fn elementwise<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::from_parts(
            FunctionSignature::new(name, &["x"], false),
            FunctionBody::Elementwise(Arc::new(f)),
        )
    }

    /// `f(values)` over a whole group
    pub fn unary<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::from_parts(
            FunctionSignature::new(name, &["x"], false),
            FunctionBody::Values(Arc::new(move |values: &[f64]| Ok(f(values)))),
        )
    }

    /// `f(values, index)` over a whole group; the compiled engine's shape
    pub fn binary<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[f64], &[i64]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::try_binary(name, move |values: &[f64], index: &[i64]| Ok(f(values, index)))
    }

    /// Fallible `f(values, index)`; errors propagate to the caller unchanged
    pub fn try_binary<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[f64], &[i64]) -> Result<Vec<f64>> + Send + Sync + 'static,
    {
        Self::from_parts(
            FunctionSignature::new(name, &["values", "index"], false),
            FunctionBody::ValuesIndex(Arc::new(f)),
        )
    }

    /// A function that declares `positional` parameters followed by `**kwargs`
    pub fn with_kwargs<F>(name: impl Into<String>, positional: &[&str], f: F) -> Self
    where
        F: Fn(&[f64], &[i64], &Kwargs) -> Result<Vec<f64>> + Send + Sync + 'static,
    {
        Self::from_parts(
            FunctionSignature::new(name, positional, true),
            FunctionBody::Keywords(Arc::new(f)),
        )
    }

    /// Mark the function as already compiled by the caller
    pub fn precompiled(mut self) -> Self {
        self.precompiled = true;
        self
    }

    /// Mark the function as needing dynamically dispatched fallback code
    pub fn requires_object_mode(mut self) -> Self {
        self.object_mode = true;
        self
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn is_precompiled(&self) -> bool {
        self.precompiled
    }

    pub fn is_object_mode(&self) -> bool {
        self.object_mode
    }

    /// Identity comparison, not behavioural equality
    pub fn same_function(&self, other: &TransformFunction) -> bool {
        self.id == other.id
    }
}
