//! Transform dispatch: validation, engine preparation, per-group invocation
//! and reassembly into the original row order.

use log::debug;

use super::cache::CompiledFunctionCache;
use super::compiler::Compiler;
use super::config::ExecutionConfig;
use super::core::{ArgValue, Kwargs, TransformFunction};
use super::engine::{Engine, ExecutionEngine};
use super::signature;
use crate::core::error::{Error, Result};
use crate::core::index::Index;
use crate::groupby::partition::GroupPartition;

/// How a transform should run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOptions {
    /// Engine to run on
    pub engine: Engine,
    /// Compiled-backend flags; only valid with [`Engine::Compiled`]
    pub engine_config: Option<ExecutionConfig>,
    /// Extra keyword arguments, forwarded to native functions only
    pub kwargs: Kwargs,
}

impl TransformOptions {
    pub fn native() -> Self {
        Self::default()
    }

    pub fn compiled() -> Self {
        Self {
            engine: Engine::Compiled,
            ..Self::default()
        }
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_engine_config(mut self, config: ExecutionConfig) -> Self {
        self.engine_config = Some(config);
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// Runs one transform over one grouping
pub struct TransformDispatcher<'a> {
    partition: &'a GroupPartition,
    cache: &'a CompiledFunctionCache,
    compiler: &'a dyn Compiler,
    default_config: ExecutionConfig,
}

impl<'a> TransformDispatcher<'a> {
    pub fn new(
        partition: &'a GroupPartition,
        cache: &'a CompiledFunctionCache,
        compiler: &'a dyn Compiler,
    ) -> Self {
        Self {
            partition,
            cache,
            compiler,
            default_config: ExecutionConfig::default(),
        }
    }

    /// Flags used when a compiled call does not bring its own
    pub fn with_default_config(mut self, config: ExecutionConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Validate the call and resolve the engine.
    ///
    /// Nothing runs and the cache is untouched if validation fails. For the
    /// compiled engine this fetches the artifact, compiling it on first use.
    pub fn prepare<'f>(
        &self,
        function: &'f TransformFunction,
        options: &'f TransformOptions,
    ) -> Result<ExecutionEngine<'f>> {
        signature::validate(function, options.engine, &options.kwargs)?;

        match options.engine {
            Engine::Native => {
                if options.engine_config.is_some() {
                    return Err(Error::InvalidInput(
                        "engine_config is only valid with the compiled engine".to_string(),
                    ));
                }
                debug!("transform `{}` on the native engine", function.name());
                Ok(ExecutionEngine::native(function, &options.kwargs))
            }
            Engine::Compiled => {
                let config = options.engine_config.unwrap_or(self.default_config);
                debug!(
                    "transform `{}` on the compiled engine ({})",
                    function.name(),
                    config
                );
                let artifact = self.cache.get_or_compile(function, &config, self.compiler)?;
                Ok(ExecutionEngine::compiled(artifact))
            }
        }
    }

    /// Run a prepared engine over every group of `values` and restore row order
    pub fn run(&self, engine: &ExecutionEngine<'_>, values: &[f64], index: &Index) -> Result<Vec<f64>> {
        let slices = self.partition.slices(values, index)?;
        let results = engine.apply_all(&slices)?;

        let mut output = vec![f64::NAN; self.partition.row_count()];
        for (slice, result) in slices.iter().zip(results) {
            for (&position, value) in slice.positions.iter().zip(result) {
                output[position] = value;
            }
        }
        Ok(output)
    }

    /// Validate, prepare and run in one step
    pub fn transform(
        &self,
        function: &TransformFunction,
        options: &TransformOptions,
        values: &[f64],
        index: &Index,
    ) -> Result<Vec<f64>> {
        let engine = self.prepare(function, options)?;
        self.run(&engine, values, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column::Column;
    use crate::optimized::jit::compiler::KernelCompiler;

    fn partition() -> GroupPartition {
        let key = Column::String(
            ["a", "a", "b", "b", "a"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        GroupPartition::from_key_columns(&[&key], 5, true).unwrap()
    }

    #[test]
    fn test_engines_agree_and_keep_row_order() {
        let partition = partition();
        let cache = CompiledFunctionCache::new();
        let compiler = KernelCompiler::new();
        let dispatcher = TransformDispatcher::new(&partition, &cache, &compiler);
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let index = Index::range(5);

        let compiled = TransformFunction::binary("plus_one", |v: &[f64], _: &[i64]| {
            v.iter().map(|x| x + 1.0).collect()
        });
        let native = TransformFunction::elementwise("plus_one", |x| x + 1.0);

        let a = dispatcher
            .transform(&compiled, &TransformOptions::compiled(), &values, &index)
            .unwrap();
        let b = dispatcher
            .transform(&native, &TransformOptions::native(), &values, &index)
            .unwrap();
        assert_eq!(a, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejected_call_leaves_cache_empty() {
        let partition = partition();
        let cache = CompiledFunctionCache::new();
        let compiler = KernelCompiler::new();
        let dispatcher = TransformDispatcher::new(&partition, &cache, &compiler);

        let f = TransformFunction::unary("incorrect_function", |v: &[f64]| v.to_vec());
        let err = dispatcher
            .transform(&f, &TransformOptions::compiled(), &[0.0; 5], &Index::range(5))
            .unwrap_err();
        assert!(matches!(err, Error::Arity { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_native_rejects_engine_config() {
        let partition = partition();
        let cache = CompiledFunctionCache::new();
        let compiler = KernelCompiler::new();
        let dispatcher = TransformDispatcher::new(&partition, &cache, &compiler);

        let f = TransformFunction::elementwise("inc", |x| x + 1.0);
        let options = TransformOptions::native().with_engine_config(ExecutionConfig::default());
        assert!(matches!(
            dispatcher.prepare(&f, &options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_default_config_is_used_when_none_given() {
        let partition = partition();
        let cache = CompiledFunctionCache::new();
        let compiler = KernelCompiler::new();
        let parallel = ExecutionConfig::new().with_parallel(true);
        let dispatcher =
            TransformDispatcher::new(&partition, &cache, &compiler).with_default_config(parallel);

        let f = TransformFunction::binary("id", |v: &[f64], _: &[i64]| v.to_vec());
        dispatcher
            .transform(&f, &TransformOptions::compiled(), &[0.0; 5], &Index::range(5))
            .unwrap();
        assert!(cache.contains_key(&f, &parallel));
        assert!(!cache.contains_key(&f, &ExecutionConfig::default()));
    }
}
