//! Compiler service and the artifacts it produces.
//!
//! The dispatcher only sees the [`Compiler`] trait. [`KernelCompiler`] is the
//! in-process backend: it lowers `(values, index)` kernels into artifacts
//! bound to a runtime that owns the execution lock and the worker pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::ThreadPool;

use super::config::ExecutionConfig;
use super::core::{FunctionBody, FunctionId, KernelFn, TransformFunction};
use super::{JitError, JitResult};
use crate::core::error::Result;

/// External compilation service: `compile(function, config) -> artifact`
pub trait Compiler: Send + Sync {
    fn compile(
        &self,
        function: &TransformFunction,
        config: &ExecutionConfig,
    ) -> JitResult<CompiledArtifact>;
}

/// Execution resources shared by every artifact of one compiler
#[derive(Clone)]
pub struct CompiledRuntime {
    execution_lock: Arc<Mutex<()>>,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for CompiledRuntime {
    fn default() -> Self {
        Self {
            execution_lock: Arc::new(Mutex::new(())),
            pool: None,
        }
    }
}

impl CompiledRuntime {
    /// Runtime whose parallel invocations use a dedicated pool of `threads` workers
    pub fn with_threads(threads: usize) -> JitResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("groupjit-worker-{}", i))
            .build()
            .map_err(|e| JitError::InvalidConfig(format!("failed to build worker pool: {}", e)))?;
        Ok(Self {
            execution_lock: Arc::new(Mutex::new(())),
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of workers available to parallel invocations
    pub fn worker_count(&self) -> usize {
        self.pool
            .as_ref()
            .map(|p| p.current_num_threads())
            .unwrap_or_else(rayon::current_num_threads)
    }
}

/// A compiled transform, immutable once built.
///
/// Cached artifacts are shared read-only across groups and across calls.
pub struct CompiledArtifact {
    function_id: FunctionId,
    name: String,
    config: ExecutionConfig,
    kernel: Arc<KernelFn>,
    runtime: CompiledRuntime,
    holds_lock: bool,
    precompiled: bool,
    compile_time: Duration,
    invocations: AtomicU64,
}

impl std::fmt::Debug for CompiledArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledArtifact")
            .field("function_id", &self.function_id)
            .field("name", &self.name)
            .field("config", &self.config)
            .field("holds_lock", &self.holds_lock)
            .field("precompiled", &self.precompiled)
            .field("compile_time", &self.compile_time)
            .finish()
    }
}

impl CompiledArtifact {
    /// Wrap a kernel for `function` under `config`.
    ///
    /// Invocations hold the runtime's execution lock unless `config.nogil`
    /// is set and the function does not need object-mode fallback.
    pub fn new(
        function: &TransformFunction,
        config: ExecutionConfig,
        kernel: Arc<KernelFn>,
        runtime: CompiledRuntime,
        compile_time: Duration,
    ) -> Self {
        Self {
            function_id: function.id(),
            name: function.name().to_string(),
            config,
            kernel,
            runtime,
            holds_lock: !config.nogil || function.is_object_mode(),
            precompiled: function.is_precompiled(),
            compile_time,
            invocations: AtomicU64::new(0),
        }
    }

    pub fn function_id(&self) -> FunctionId {
        self.function_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Whether invocations serialize on the execution lock
    pub fn holds_lock(&self) -> bool {
        self.holds_lock
    }

    pub fn is_precompiled(&self) -> bool {
        self.precompiled
    }

    pub fn compile_time(&self) -> Duration {
        self.compile_time
    }

    /// Number of kernel invocations so far
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Call the kernel with `(values, index)`
    pub fn invoke(&self, values: &[f64], index: &[i64]) -> Result<Vec<f64>> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        if self.holds_lock {
            // the lock guards no data, so a poisoned lock is still usable
            let _guard = self
                .runtime
                .execution_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            (self.kernel)(values, index)
        } else {
            (self.kernel)(values, index)
        }
    }

    /// Run `op` on the runtime's worker pool, or the global rayon pool
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.runtime.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// In-process compiler for `(values, index)` kernels
#[derive(Clone, Default)]
pub struct KernelCompiler {
    runtime: CompiledRuntime,
}

impl KernelCompiler {
    /// Create a compiler backed by the global rayon pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with a dedicated worker pool (0 = one worker per CPU)
    pub fn with_max_threads(max_threads: usize) -> JitResult<Self> {
        let threads = if max_threads == 0 {
            num_cpus::get()
        } else {
            max_threads
        };
        Ok(Self {
            runtime: CompiledRuntime::with_threads(threads)?,
        })
    }

    pub fn runtime(&self) -> &CompiledRuntime {
        &self.runtime
    }
}

impl Compiler for KernelCompiler {
    fn compile(
        &self,
        function: &TransformFunction,
        config: &ExecutionConfig,
    ) -> JitResult<CompiledArtifact> {
        let start = Instant::now();

        if function.is_object_mode() && config.nopython {
            return Err(JitError::CompilationFailed(format!(
                "`{}` needs object-mode fallback, which nopython=true forbids",
                function.name()
            )));
        }

        let kernel = match function.body() {
            FunctionBody::ValuesIndex(kernel) => Arc::clone(kernel),
            other => {
                return Err(JitError::CompilationFailed(format!(
                    "cannot lower `{}`: compiled kernels take (values, index), found a {:?} body",
                    function.name(),
                    other
                )))
            }
        };

        if function.is_precompiled() {
            debug!("adopting precompiled kernel `{}`", function.name());
        }
        if config.parallel && (!config.nogil || function.is_object_mode()) {
            warn!(
                "`{}` compiled with parallel=true but holds the execution lock; \
                 group invocations will serialize",
                function.name()
            );
        }

        let elapsed = start.elapsed();
        info!(
            "compiled `{}` ({}) in {:?}",
            function.name(),
            config,
            elapsed
        );

        Ok(CompiledArtifact::new(
            function,
            *config,
            kernel,
            self.runtime.clone(),
            elapsed,
        ))
    }
}
