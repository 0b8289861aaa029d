use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use stream_insights::{
    ParameterSet, SongRecord, SongTable, YearMode, compute_defaults, filter, run_pass,
};

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const ROWS: usize = 50_000;
const KEYS: [&str; 4] = ["C#", "G", "D", "A"];

fn synthetic_table(rows: usize) -> SongTable {
    let mut rng = StdRng::seed_from_u64(2023);
    let records = (0..rows)
        .map(|i| {
            SongRecord::new(format!("artist {}", rng.random_range(0..500)), format!("song {i}"))
                .with_release(rng.random_range(1990..=2023), rng.random_range(1..=12))
                .with_streams(rng.random_range(1e6..3.5e9))
                .with_bpm(rng.random_range(60.0..210.0))
                .with_features(
                    rng.random_range(10.0..97.0),
                    rng.random_range(20.0..98.0),
                    rng.random_range(3.0..98.0),
                )
                .with_playlists(
                    rng.random_range(0.0..50_000.0),
                    rng.random_range(0.0..600.0),
                    rng.random_range(0.0..12_000.0),
                )
                .with_key_mode(KEYS[i % KEYS.len()], if i % 3 == 0 { "Minor" } else { "Major" })
        })
        .collect();
    SongTable::from_records(records)
}

fn pass_benchmarks(c: &mut Criterion) {
    let table = synthetic_table(ROWS);
    let defaults = compute_defaults(&table).unwrap();

    let mut group = c.benchmark_group("Pipeline");
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("compute_defaults", |b| {
        b.iter(|| compute_defaults(&table))
    });

    group.bench_function("filter_only", |b| {
        b.iter(|| filter(&table, &defaults.params).len())
    });

    group.bench_function("run_pass_defaults", |b| {
        b.iter(|| run_pass(&table, &defaults.params))
    });

    let everything = ParameterSet {
        year_threshold: 0,
        stream_threshold: 0.0,
        tempo_threshold: 0.0,
        year_mode: YearMode::AllTime,
    };
    group.bench_function("run_pass_all_rows", |b| {
        b.iter(|| run_pass(&table, &everything))
    });

    group.finish();
}

criterion_group!(benches, pass_benchmarks);
criterion_main!(benches);
