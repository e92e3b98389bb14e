use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use term_stats::median::weighted_median;
use term_stats::prelude::*;

fn random_column(n: usize) -> (Vec<Cell>, Vec<Cell>) {
    let mut rng = rand::rng();
    let values = (0..n)
        .map(|i| {
            if i % 50 == 0 {
                Cell::Text(String::new())
            } else {
                Cell::Number(rng.random_range(0.0..1000.0))
            }
        })
        .collect();
    let weights = (0..n)
        .map(|_| Cell::Number(rng.random_range(0.5..3.0)))
        .collect();
    (values, weights)
}

fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptives_compute");
    let variable = VariableDescriptor::new("x", VariableType::Numeric, MeasurementLevel::Scale);
    let options = DescriptivesOptions::default()
        .with_standardize(true)
        .with_log_config(LogConfig::production());

    for n in [1_000, 10_000, 100_000].iter() {
        let (values, weights) = random_column(*n);
        group.throughput(Throughput::Elements(*n as u64));

        group.bench_with_input(BenchmarkId::new("unweighted", n), &values, |b, values| {
            b.iter(|| compute(&variable, std::hint::black_box(values), None, &options).unwrap());
        });
        group.bench_with_input(
            BenchmarkId::new("weighted", n),
            &(values.clone(), weights),
            |b, (values, weights)| {
                b.iter(|| {
                    compute(
                        &variable,
                        std::hint::black_box(values),
                        Some(weights),
                        &options,
                    )
                    .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_median(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_median");
    let mut rng = rand::rng();

    for n in [1_000, 100_000].iter() {
        let rows: Vec<(f64, f64)> = (0..*n)
            .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.5..3.0)))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| weighted_median(std::hint::black_box(rows)));
        });
    }

    group.finish();
}

fn benchmark_nominal(c: &mut Criterion) {
    let variable = VariableDescriptor::new("city", VariableType::String, MeasurementLevel::Nominal);
    let labels = ["north", "south", "east", "west", ""];
    let cells: Vec<Cell> = (0..50_000)
        .map(|i| Cell::from(labels[i % labels.len()]))
        .collect();
    let options = DescriptivesOptions::default().with_log_config(LogConfig::production());

    c.bench_function("describe_nominal_50k", |b| {
        b.iter(|| describe(&variable, std::hint::black_box(&cells), None, &options).unwrap());
    });
}

criterion_group!(benches, benchmark_compute, benchmark_median, benchmark_nominal);
criterion_main!(benches);
