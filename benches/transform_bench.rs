use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use groupjit::{DataFrame, ExecutionConfig, Result, TransformFunction, TransformOptions};
use std::time::Duration;

fn create_test_dataframe(size: usize) -> Result<DataFrame> {
    let mut df = DataFrame::new();

    let categories = ["A", "B", "C", "D", "E"];
    let mut cat_data = Vec::with_capacity(size);
    let mut int_data = Vec::with_capacity(size);
    let mut float_data = Vec::with_capacity(size);

    for i in 0..size {
        cat_data.push(categories[i % categories.len()].to_string());
        int_data.push((i % 1000) as i64);
        float_data.push((i as f64) * 0.1 + (i % 100) as f64);
    }

    df.add_string_column("category", cat_data)?;
    df.add_int_column("value", int_data)?;
    df.add_float_column("score", float_data)?;

    Ok(df)
}

fn demean() -> TransformFunction {
    TransformFunction::binary("demean", |values: &[f64], _: &[i64]| {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| v - mean).collect()
    })
}

fn benchmark_engines(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_engines");
    group.measurement_time(Duration::from_secs(10));

    for size in [10_000, 100_000].iter() {
        let df = create_test_dataframe(*size).unwrap();
        let grouped = df.group_by(["category"]).unwrap();
        let f = demean();

        group.bench_with_input(BenchmarkId::new("native", size), &grouped, |b, grouped| {
            b.iter(|| black_box(grouped.transform(&f, &TransformOptions::native()).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("compiled", size), &grouped, |b, grouped| {
            b.iter(|| black_box(grouped.transform(&f, &TransformOptions::compiled()).unwrap()));
        });

        let parallel = TransformOptions::compiled()
            .with_engine_config(ExecutionConfig::new().with_nogil(true).with_parallel(true));
        group.bench_with_input(
            BenchmarkId::new("compiled_parallel", size),
            &grouped,
            |b, grouped| {
                b.iter(|| black_box(grouped.transform(&f, &parallel).unwrap()));
            },
        );
    }

    group.finish();
}

fn benchmark_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiled_cache");
    let df = create_test_dataframe(1_000).unwrap();

    // a fresh grouping per iteration pays the compile step
    group.bench_function("cold", |b| {
        b.iter(|| {
            let grouped = df.group_by(["category"]).unwrap();
            black_box(grouped.transform(&demean(), &TransformOptions::compiled()).unwrap())
        });
    });

    let grouped = df.group_by(["category"]).unwrap();
    let f = demean();
    grouped.transform(&f, &TransformOptions::compiled()).unwrap();
    group.bench_function("warm", |b| {
        b.iter(|| black_box(grouped.transform(&f, &TransformOptions::compiled()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_engines, benchmark_cache);
criterion_main!(benches);
