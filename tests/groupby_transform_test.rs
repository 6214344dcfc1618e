use groupjit::{
    DataFrame, Engine, Error, ExecutionConfig, Index, Result, TransformFunction, TransformOptions,
};

fn keyed_frame() -> Result<DataFrame> {
    let mut df = DataFrame::new();
    df.add_string_column(
        "key",
        ["a", "a", "b", "b", "a"].iter().map(|s| s.to_string()).collect(),
    )?;
    df.add_float_column("data", vec![1.0, 2.0, 3.0, 4.0, 5.0])?;
    Ok(df)
}

fn plus_one_compiled() -> TransformFunction {
    TransformFunction::binary("plus_one", |values: &[f64], _index: &[i64]| {
        values.iter().map(|v| v + 1.0).collect()
    })
}

fn plus_one_native() -> TransformFunction {
    TransformFunction::elementwise("plus_one", |x| x + 1.0)
}

#[test]
fn test_compiled_and_native_match_in_row_order() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;

    let compiled = grouped.transform(&plus_one_compiled(), &TransformOptions::compiled())?;
    let native = grouped.transform(&plus_one_native(), &TransformOptions::native())?;

    let expected = vec![2.0, 3.0, 4.0, 5.0, 6.0];
    assert_eq!(compiled.get_float_column("data")?, expected);
    assert_eq!(native.get_float_column("data")?, expected);
    assert_eq!(compiled.index(), df.index());
    Ok(())
}

#[test]
fn test_series_transform_matches_scenario() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let data = grouped.column("data")?;

    let compiled = data.transform(&plus_one_compiled(), &TransformOptions::compiled())?;
    let native = data.transform(&plus_one_native(), &TransformOptions::native())?;

    assert_eq!(compiled.values(), &[2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(compiled.values(), native.values());
    assert_eq!(compiled.name(), Some("data"));
    assert_eq!(compiled.index(), &df.index());
    Ok(())
}

#[test]
fn test_wrong_arity_is_rejected_before_any_group_runs() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let incorrect_function = TransformFunction::unary("incorrect_function", |v: &[f64]| {
        v.iter().map(|x| x + 1.0).collect()
    });

    let err = grouped
        .transform(&incorrect_function, &TransformOptions::compiled())
        .unwrap_err();
    assert!(matches!(err, Error::Arity { expected: 2, found: 1, .. }));
    assert!(err
        .to_string()
        .contains("the first 2 positional arguments"));

    let err = grouped
        .column("data")?
        .transform(&incorrect_function, &TransformOptions::compiled())
        .unwrap_err();
    assert!(matches!(err, Error::Arity { .. }));

    assert!(grouped.compiled_cache().is_empty());
    Ok(())
}

#[test]
fn test_keyword_arguments_are_rejected_for_compiled() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let options = TransformOptions::compiled().with_kwarg("a", 1);

    let err = grouped
        .transform(&plus_one_native(), &options)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedKeyword(_)));

    let err = grouped
        .column("data")?
        .transform(&plus_one_compiled(), &options)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedKeyword(_)));
    Ok(())
}

#[test]
fn test_variadic_keyword_function_is_rejected_for_compiled() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let f = TransformFunction::with_kwargs("scaled", &["values", "index"], |v, _, _| {
        Ok(v.to_vec())
    });

    let err = grouped.transform(&f, &TransformOptions::compiled()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedKeyword(_)));

    // the native engine accepts the same function and forwards the keyword
    let scaled = TransformFunction::with_kwargs("scaled", &["values", "index"], |v, _, kw| {
        let factor = kw.get("factor").and_then(|a| a.as_f64()).unwrap_or(1.0);
        Ok(v.iter().map(|x| x * factor).collect())
    });
    let out = grouped.column("data")?.transform(
        &scaled,
        &TransformOptions::native().with_kwarg("factor", 10.0),
    )?;
    assert_eq!(out.values(), &[10.0, 20.0, 30.0, 40.0, 50.0]);
    Ok(())
}

#[test]
fn test_engines_agree_for_every_flag_combination() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let compiled_fn = plus_one_compiled();
    let native = grouped.transform(&plus_one_native(), &TransformOptions::native())?;
    let native_series = grouped
        .column("data")?
        .transform(&plus_one_native(), &TransformOptions::native())?;

    for config in ExecutionConfig::all_combinations() {
        let options = TransformOptions::compiled().with_engine_config(config);

        let frame = grouped.transform(&compiled_fn, &options)?;
        assert_eq!(
            frame.get_float_column("data")?,
            native.get_float_column("data")?,
            "frame mismatch for {}",
            config
        );

        let series = grouped.column("data")?.transform(&compiled_fn, &options)?;
        assert_eq!(series.values(), native_series.values(), "series mismatch for {}", config);
    }

    assert_eq!(grouped.compiled_cache().len(), 8);
    Ok(())
}

#[test]
fn test_row_order_and_index_survive_unsorted_groups() -> Result<()> {
    let mut df = DataFrame::with_index(Index::from_labels(vec![40, 10, 30, 20, 50, 60]));
    df.add_int_column("key", vec![3, 1, 3, 2, 1, 2])?;
    df.add_float_column("data", vec![6.0, 5.0, 4.0, 3.0, 2.0, 1.0])?;

    let echo_index = TransformFunction::binary("echo_index", |_: &[f64], index: &[i64]| {
        index.iter().map(|&i| i as f64).collect()
    });

    for sort in [true, false] {
        let grouped = df.group_by_with_options(["key"], sort)?;
        for options in [TransformOptions::compiled(), TransformOptions::native()] {
            let out = grouped.transform(&echo_index, &options)?;
            assert_eq!(
                out.get_float_column("data")?,
                vec![40.0, 10.0, 30.0, 20.0, 50.0, 60.0]
            );
            assert_eq!(out.index(), df.index());
        }
    }
    Ok(())
}

#[test]
fn test_group_values_follow_row_order_within_group() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let cumulative = TransformFunction::binary("cumsum", |values: &[f64], _: &[i64]| {
        values
            .iter()
            .scan(0.0, |acc, v| {
                *acc += v;
                Some(*acc)
            })
            .collect()
    });

    let out = grouped
        .column("data")?
        .transform(&cumulative, &TransformOptions::compiled())?;
    // a: 1, 2, 5 -> 1, 3, 8; b: 3, 4 -> 3, 7
    assert_eq!(out.values(), &[1.0, 3.0, 3.0, 7.0, 8.0]);
    Ok(())
}

#[test]
fn test_multi_column_keys() -> Result<()> {
    let mut df = DataFrame::new();
    df.add_string_column(
        "k1",
        ["x", "x", "y", "x", "y"].iter().map(|s| s.to_string()).collect(),
    )?;
    df.add_int_column("k2", vec![1, 2, 1, 1, 1])?;
    df.add_float_column("data", vec![1.0, 10.0, 100.0, 3.0, 200.0])?;

    let grouped = df.group_by(["k1", "k2"])?;
    assert_eq!(grouped.group_count(), 3);

    let demean = TransformFunction::binary("demean", |values: &[f64], _: &[i64]| {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| v - mean).collect()
    });
    let out = grouped.transform(&demean, &TransformOptions::compiled())?;
    assert_eq!(out.column_names(), &["data".to_string()]);
    assert_eq!(
        out.get_float_column("data")?,
        vec![-1.0, 0.0, -50.0, 1.0, 50.0]
    );
    Ok(())
}

#[test]
fn test_native_broadcasts_reductions_compiled_does_not() -> Result<()> {
    let df = keyed_frame()?;
    let data = df.group_by(["key"])?.column("data")?;

    let mean = TransformFunction::unary("mean", |v: &[f64]| {
        vec![v.iter().sum::<f64>() / v.len() as f64]
    });
    let out = data.transform(&mean, &TransformOptions::native())?;
    assert_eq!(out.values(), &[8.0 / 3.0, 8.0 / 3.0, 3.5, 3.5, 8.0 / 3.0]);

    let first = TransformFunction::binary("first", |v: &[f64], _: &[i64]| vec![v[0]]);
    let err = data
        .transform(&first, &TransformOptions::compiled())
        .unwrap_err();
    assert!(matches!(err, Error::Shape { .. }));
    Ok(())
}

#[test]
fn test_user_function_errors_propagate_unmodified() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let failing = TransformFunction::try_binary("failing", |values: &[f64], _: &[i64]| {
        if values.contains(&4.0) {
            Err(Error::Function("saw a four".to_string()))
        } else {
            Ok(values.to_vec())
        }
    });

    for options in [TransformOptions::compiled(), TransformOptions::native()] {
        let err = grouped.transform(&failing, &options).unwrap_err();
        assert!(matches!(err, Error::Function(ref m) if m == "saw a four"));
    }
    Ok(())
}

#[test]
fn test_engine_config_requires_compiled_engine() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let options = TransformOptions::native().with_engine_config(ExecutionConfig::default());

    let err = grouped
        .transform(&plus_one_native(), &options)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    Ok(())
}

#[test]
fn test_engine_by_name() -> Result<()> {
    let df = keyed_frame()?;
    let grouped = df.group_by(["key"])?;
    let engine: Engine = "numba".parse()?;
    let out = grouped.transform(
        &plus_one_compiled(),
        &TransformOptions::default().with_engine(engine),
    )?;
    assert_eq!(out.get_float_column("data")?, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn test_empty_frame() -> Result<()> {
    let mut df = DataFrame::new();
    df.add_string_column("key", Vec::new())?;
    df.add_float_column("data", Vec::new())?;

    let grouped = df.group_by(["key"])?;
    assert_eq!(grouped.group_count(), 0);
    let out = grouped
        .column("data")?
        .transform(&plus_one_compiled(), &TransformOptions::compiled())?;
    assert!(out.is_empty());
    Ok(())
}
