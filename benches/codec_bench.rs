// In benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tambak_intcodec::{build_codec, CodecConfig, CodecKind};

// --- Mock Data Generation ---

/// Gaps of a dense postings list: mostly tiny, with rare large jumps.
fn generate_postings_gaps(size: usize, rng: &mut StdRng) -> Vec<u32> {
    (0..size)
        .map(|_| {
            if rng.random_ratio(1, 64) {
                rng.random_range(1 << 12..1 << 24)
            } else {
                rng.random_range(0..32)
            }
        })
        .collect()
}

/// Long zero runs broken by small values, the case VSEncoding's zero catalog targets.
fn generate_sparse(size: usize, rng: &mut StdRng) -> Vec<u32> {
    (0..size)
        .map(|_| if rng.random_ratio(1, 200) { rng.random_range(1..1000) } else { 0 })
        .collect()
}

// --- Benchmark Suite ---

const BENCH_DATA_SIZE: usize = 65536;

fn bench_codecs(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x7a3b);
    let datasets = [
        ("gaps", generate_postings_gaps(BENCH_DATA_SIZE, &mut rng)),
        ("sparse", generate_sparse(BENCH_DATA_SIZE, &mut rng)),
    ];
    let config = CodecConfig::default();

    for (name, data) in &datasets {
        let mut group = c.benchmark_group(format!("Codecs ({})", name));
        group.throughput(Throughput::Elements(BENCH_DATA_SIZE as u64));

        for kind in CodecKind::ALL {
            let codec = build_codec(kind, &config).unwrap();
            // Prepare encoded data once to benchmark decoding accurately.
            let mut encoded = Vec::new();
            codec.encode_array(data, &mut encoded).unwrap();

            group.bench_function(format!("Encode {}", kind), |b| {
                b.iter(|| {
                    let mut out = Vec::with_capacity(encoded.len());
                    codec.encode_array(black_box(data), &mut out).unwrap();
                    black_box(out)
                })
            });
            group.bench_function(format!("Decode {}", kind), |b| {
                let mut out = vec![0u32; data.len()];
                b.iter(|| {
                    codec.decode_array(black_box(&encoded), &mut out).unwrap();
                    black_box(&out);
                })
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
