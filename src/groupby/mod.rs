//! Grouping objects and their transforms.
//!
//! A [`GroupBy`] transforms every numeric non-key column of a frame; a
//! [`SeriesGroupBy`] transforms a single column. Each owns its own compiled
//! function cache, created empty and dropped with the grouping object.

pub mod partition;

use std::sync::Arc;

use log::debug;

use crate::config::GroupJitConfig;
use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::optimized::jit::{
    CompiledFunctionCache, Compiler, Engine, ExecutionConfig, KernelCompiler, TransformDispatcher,
    TransformFunction, TransformOptions,
};
use crate::series::Series;

pub use partition::{Group, GroupKey, GroupPartition, GroupSlice, KeyPart};

/// State shared by both kinds of grouping object
struct Grouping {
    partition: Arc<GroupPartition>,
    cache: CompiledFunctionCache,
    compiler: Arc<dyn Compiler>,
    default_config: ExecutionConfig,
    default_engine: Engine,
}

impl Grouping {
    fn new(partition: GroupPartition) -> Self {
        Self {
            partition: Arc::new(partition),
            cache: CompiledFunctionCache::new(),
            compiler: Arc::new(KernelCompiler::new()),
            default_config: ExecutionConfig::default(),
            default_engine: Engine::Native,
        }
    }

    /// Same partition and backend, fresh cache
    fn derive(&self) -> Self {
        Self {
            partition: Arc::clone(&self.partition),
            cache: if self.cache.is_enabled() {
                CompiledFunctionCache::new()
            } else {
                CompiledFunctionCache::disabled()
            },
            compiler: Arc::clone(&self.compiler),
            default_config: self.default_config,
            default_engine: self.default_engine,
        }
    }

    fn configure(&mut self, config: &GroupJitConfig) -> Result<()> {
        config.validate()?;
        self.default_engine = config.engine.default_engine;
        self.default_config = config.engine.execution_config();
        if config.engine.max_threads > 0 {
            self.compiler = Arc::new(KernelCompiler::with_max_threads(config.engine.max_threads)?);
        }
        self.cache = if config.cache.enabled {
            CompiledFunctionCache::new()
        } else {
            CompiledFunctionCache::disabled()
        };
        Ok(())
    }

    fn dispatcher(&self) -> TransformDispatcher<'_> {
        TransformDispatcher::new(&self.partition, &self.cache, self.compiler.as_ref())
            .with_default_config(self.default_config)
    }

    fn default_options(&self) -> TransformOptions {
        TransformOptions::default().with_engine(self.default_engine)
    }
}

/// Structure representing grouping results
pub struct GroupBy<'a> {
    df: &'a DataFrame,
    group_by_columns: Vec<String>,
    grouping: Grouping,
}

impl DataFrame {
    /// Group DataFrame by key columns, groups in sorted key order
    pub fn group_by<I, S>(&self, columns: I) -> Result<GroupBy<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.group_by_with_options(columns, true)
    }

    /// Group DataFrame with options
    ///
    /// # Arguments
    /// * `columns` - Column names for grouping
    /// * `sort` - Iterate groups in sorted key order rather than first appearance
    pub fn group_by_with_options<I, S>(&self, columns: I, sort: bool) -> Result<GroupBy<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let group_by_columns: Vec<String> = columns
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let key_columns = group_by_columns
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>>>()?;

        let partition = GroupPartition::from_key_columns(&key_columns, self.row_count(), sort)?;
        debug!(
            "grouped {} rows by {:?} into {} groups",
            self.row_count(),
            group_by_columns,
            partition.len()
        );

        Ok(GroupBy {
            df: self,
            group_by_columns,
            grouping: Grouping::new(partition),
        })
    }
}

impl<'a> GroupBy<'a> {
    /// Apply library configuration: default engine and flags, worker pool, caching
    pub fn with_config(mut self, config: &GroupJitConfig) -> Result<Self> {
        self.grouping.configure(config)?;
        Ok(self)
    }

    /// Use a different compiler service
    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.grouping.compiler = compiler;
        self
    }

    /// Key columns
    pub fn group_by_columns(&self) -> &[String] {
        &self.group_by_columns
    }

    /// Get the number of groups
    pub fn group_count(&self) -> usize {
        self.grouping.partition.len()
    }

    pub fn partition(&self) -> &GroupPartition {
        &self.grouping.partition
    }

    /// Compiled functions owned by this grouping
    pub fn compiled_cache(&self) -> &CompiledFunctionCache {
        &self.grouping.cache
    }

    /// Options preset with the configured default engine
    pub fn default_options(&self) -> TransformOptions {
        self.grouping.default_options()
    }

    /// Columns a whole-frame transform touches: numeric and not a key
    pub fn value_columns(&self) -> Vec<&str> {
        self.df
            .iter_columns()
            .filter(|(name, column)| {
                column.is_numeric() && !self.group_by_columns.iter().any(|k| k == name)
            })
            .map(|(name, _)| name)
            .collect()
    }

    /// Select one column for a single-column transform
    pub fn column(&self, name: &str) -> Result<SeriesGroupBy<'a>> {
        if !self.df.contains_column(name) {
            return Err(Error::ColumnNotFound(name.to_string()));
        }
        Ok(SeriesGroupBy {
            df: self.df,
            column: name.to_string(),
            grouping: self.grouping.derive(),
        })
    }

    /// Transform every value column group by group.
    ///
    /// The result has the value columns, in frame order, indexed exactly
    /// like the source frame.
    pub fn transform(
        &self,
        function: &TransformFunction,
        options: &TransformOptions,
    ) -> Result<DataFrame> {
        let dispatcher = self.grouping.dispatcher();
        let engine = dispatcher.prepare(function, options)?;
        let index = self.df.index();

        let mut result = DataFrame::with_index(index.clone());
        for name in self.value_columns() {
            let values = self.df.get_float_column(name)?;
            let transformed = dispatcher.run(&engine, &values, &index)?;
            result.add_float_column(name, transformed)?;
        }
        Ok(result)
    }
}

/// Grouping of a single column
pub struct SeriesGroupBy<'a> {
    df: &'a DataFrame,
    column: String,
    grouping: Grouping,
}

impl<'a> SeriesGroupBy<'a> {
    /// Apply library configuration: default engine and flags, worker pool, caching
    pub fn with_config(mut self, config: &GroupJitConfig) -> Result<Self> {
        self.grouping.configure(config)?;
        Ok(self)
    }

    /// Use a different compiler service
    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.grouping.compiler = compiler;
        self
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    pub fn group_count(&self) -> usize {
        self.grouping.partition.len()
    }

    pub fn compiled_cache(&self) -> &CompiledFunctionCache {
        &self.grouping.cache
    }

    pub fn default_options(&self) -> TransformOptions {
        self.grouping.default_options()
    }

    /// Transform the column group by group, keeping the frame's row order and index
    pub fn transform(
        &self,
        function: &TransformFunction,
        options: &TransformOptions,
    ) -> Result<Series> {
        let dispatcher = self.grouping.dispatcher();
        let engine = dispatcher.prepare(function, options)?;
        let values = self.df.get_float_column(&self.column)?;
        let index = self.df.index();

        let transformed = dispatcher.run(&engine, &values, &index)?;
        Series::new(transformed, index, Some(self.column.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_string_column(
            "key",
            ["a", "a", "b", "b", "a"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        df.add_float_column("data", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        df.add_int_column("count", vec![1, 1, 2, 2, 3]).unwrap();
        df.add_string_column(
            "label",
            ["p", "q", "r", "s", "t"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        df
    }

    #[test]
    fn test_value_columns_skip_keys_and_strings() {
        let df = frame();
        let grouped = df.group_by(["key"]).unwrap();
        assert_eq!(grouped.value_columns(), vec!["data", "count"]);
        assert_eq!(grouped.group_count(), 2);
    }

    #[test]
    fn test_unknown_columns() {
        let df = frame();
        assert!(matches!(
            df.group_by(["missing"]),
            Err(Error::ColumnNotFound(_))
        ));
        let grouped = df.group_by(["key"]).unwrap();
        assert!(matches!(
            grouped.column("missing"),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_selected_column_has_its_own_cache() {
        let df = frame();
        let grouped = df.group_by(["key"]).unwrap();
        let series = grouped.column("data").unwrap();
        let f = TransformFunction::binary("id", |v: &[f64], _: &[i64]| v.to_vec());

        series.transform(&f, &TransformOptions::compiled()).unwrap();
        assert!(series.compiled_cache().contains(&f));
        assert!(!grouped.compiled_cache().contains(&f));
    }

    #[test]
    fn test_int_columns_are_widened() {
        let df = frame();
        let grouped = df.group_by(["key"]).unwrap();
        let f = TransformFunction::elementwise("double", |x| x * 2.0);
        let out = grouped.transform(&f, &TransformOptions::native()).unwrap();
        assert_eq!(
            out.get_float_column("count").unwrap(),
            vec![2.0, 2.0, 4.0, 4.0, 6.0]
        );
        assert!(!out.contains_column("label"));
        assert!(!out.contains_column("key"));
    }
}
