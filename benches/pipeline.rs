//! Pipeline benchmark: CSV bytes → raw table → validation → grouped summary.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use postop_pain::analytics::{summarize, validate_outcomes};
use postop_pain::config::AnalyticsConfig;
use postop_pain::schema::{FeatureSchema, ANAESTHESIA_TYPES, SURGERY_DURATIONS};
use postop_pain::source::{Source, SourceReader};
use postop_pain::validate::validate_table;

fn make_csv(n: usize) -> Vec<u8> {
    let mut out = String::from("Age,BMI,Surgery_Duration,Anaesthesia,Pain_Score\n");
    for i in 0..n {
        out.push_str(&format!(
            "{},{:.1},{},{},{}\n",
            15 + i % 36,
            15.0 + (i % 300) as f64 / 10.0,
            SURGERY_DURATIONS[i % 3],
            ANAESTHESIA_TYPES[i % 2],
            i % 11
        ));
    }
    out.into_bytes()
}

fn bench_ingest(c: &mut Criterion) {
    let reader = SourceReader::new(Default::default());
    let mut g = c.benchmark_group("ingest_by_rows");
    for n in [100, 1_000, 10_000] {
        let src = Source::Upload {
            filename: "bench.csv".to_string(),
            bytes: make_csv(n),
        };
        g.bench_function(format!("rows_{}", n).as_str(), |b| {
            b.iter(|| {
                let table = reader.read(black_box(&src)).unwrap().table().unwrap();
                validate_table(&table, FeatureSchema::clinical())
            })
        });
    }
    g.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let reader = SourceReader::new(Default::default());
    let src = Source::Upload {
        filename: "bench.csv".to_string(),
        bytes: make_csv(10_000),
    };
    let table = reader.read(&src).unwrap().table().unwrap();
    let records = validate_outcomes(&table, "Pain_Score").records;
    let config = AnalyticsConfig::default();

    c.bench_function("summarize_10k", |b| {
        b.iter(|| summarize(black_box(&records), &config))
    });
}

criterion_group!(benches, bench_ingest, bench_summarize);
criterion_main!(benches);
