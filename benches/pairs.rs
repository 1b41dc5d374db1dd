use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use specpair::encoder::{EncoderConfig, SpectrumEncoder};
use specpair::metadata::MetadataRow;
use specpair::pairs::{negative_pairs, positive_pairs};
use specpair::spectrum::{Spectrum, SpectrumBuilder};

/// Metadata rows with a few hundred peptides spread over a narrow m/z range
fn create_rows(num_rows: usize) -> Vec<MetadataRow> {
    (0..num_rows)
        .map(|i| MetadataRow {
            dataset: format!("MSV{:06}", i % 20),
            filename: format!("run_{}.mzML", i % 7),
            scan: i as i64,
            sequence: format!("PEPTIDE{}K", i % 300),
            charge: 2 + (i % 3) as u32,
            mz: 400.0 + ((i * 7919) % 100_000) as f64 * 0.01,
            row_num: i,
        })
        .collect()
}

fn create_spectrum(i: usize) -> Spectrum {
    let mut builder = SpectrumBuilder::new(format!("scan={}", i)).precursor(450.0 + i as f64, 2);
    for j in 0..150 {
        builder = builder.add_peak(100.0 + j as f64 * 9.7, 100.0 + ((i + j) % 50) as f32);
    }
    builder.build()
}

/// Benchmark negative pair generation
fn bench_negative_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("negative_pairs");

    for num_rows in [1_000, 10_000, 50_000] {
        let rows = create_rows(num_rows);
        group.throughput(Throughput::Elements(num_rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), &rows, |b, rows| {
            b.iter(|| negative_pairs(black_box(rows), 0.1).unwrap().len())
        });
    }

    group.finish();
}

/// Benchmark positive pair generation
fn bench_positive_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("positive_pairs");

    for num_rows in [1_000, 10_000] {
        let rows = create_rows(num_rows);
        group.throughput(Throughput::Elements(num_rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), &rows, |b, rows| {
            b.iter(|| positive_pairs(black_box(rows)).len())
        });
    }

    group.finish();
}

/// Benchmark the standard precursor and fragment encoder
fn bench_encode(c: &mut Criterion) {
    let encoder = EncoderConfig::default().build(None).unwrap();
    let spectra: Vec<Spectrum> = (0..100).map(create_spectrum).collect();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(spectra.len() as u64));
    group.bench_function("composite_100_spectra", |b| {
        b.iter(|| {
            spectra
                .iter()
                .map(|s| encoder.encode(black_box(s)).len())
                .sum::<usize>()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_negative_pairs, bench_positive_pairs, bench_encode);
criterion_main!(benches);
