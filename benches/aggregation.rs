//! Aggregation benchmark suite
//!
//! Measures folding a run record into summaries, ratios and totals, plus
//! rendering the comparison table, over synthetic records of growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use udf_bench::catalog::CatalogFilter;
use udf_bench::engine::{EngineId, Execution};
use udf_bench::error::ExecutionError;
use udf_bench::schema::{ConfigSnapshot, FunctionRef, RunRecord, TrialPhase, TrialResult};
use udf_bench::{report, stats, Catalog};

/// Builtin functions on every engine with `runs` trials per pair; ~5% fail.
fn synthetic_record(runs: u32, seed: u64) -> RunRecord {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let catalog = Catalog::builtin();
    let config = ConfigSnapshot {
        row_count: Some(10_000_000),
        data_path: PathBuf::from("data/bench_data.parquet"),
        warmup_runs: 1,
        bench_runs: runs,
        max_retries: 0,
        timeout_secs: 300.0,
        primary: Some(EngineId::DataFusion),
        parallel_engines: false,
        binaries: BTreeMap::new(),
        filter: CatalogFilter::default(),
        fingerprint: String::new(),
    }
    .sealed();

    let functions = catalog
        .iter()
        .map(|f| FunctionRef {
            name: f.name.clone(),
            category: f.category,
        })
        .collect();
    let mut record = RunRecord::new(config, EngineId::ALL.to_vec(), functions);

    for spec in catalog.iter() {
        for engine in EngineId::ALL {
            if !spec.supports(engine) {
                record.record_skip(&spec.name, engine);
                continue;
            }
            let trials: Vec<TrialResult> = (0..runs)
                .map(|i| {
                    let execution = if rng.gen_bool(0.05) {
                        Execution::failed(Duration::ZERO, ExecutionError::timeout(Duration::from_secs(300)))
                    } else {
                        Execution::ok(Duration::from_micros(rng.gen_range(500..500_000)))
                    };
                    TrialResult::from_execution(&spec.name, engine, TrialPhase::Measured, i, 1, execution)
                })
                .collect();
            record.record_trials(trials);
        }
    }
    record.finish(false);
    record
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for runs in [3u32, 10, 50] {
        let record = synthetic_record(runs, 42);
        group.bench_with_input(BenchmarkId::new("runs", runs), &record, |bencher, record| {
            bencher.iter(|| stats::aggregate(black_box(record), Some(EngineId::DataFusion)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let record = synthetic_record(3, 7);
    let aggregation = stats::aggregate(&record, Some(EngineId::DataFusion));

    c.bench_function("render_table", |bencher| {
        bencher.iter(|| report::render(black_box(&aggregation)))
    });
}

fn bench_median(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let samples: Vec<f64> = (0..1_000).map(|_| rng.gen_range(0.001..2.0)).collect();

    c.bench_function("median_1000", |bencher| {
        bencher.iter(|| stats::median(black_box(&samples)))
    });
}

criterion_group!(benches, bench_aggregate, bench_render, bench_median);
criterion_main!(benches);
