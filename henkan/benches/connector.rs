//! 接続コスト行列の参照ベンチマーク
//!
//! 合成した行列を簡潔形式に変換し、キャッシュの大きさを変えて
//! `transition_cost` の速度を計測します。

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use henkan::dictionary::{Connector, ConnectorBuilder, MatrixConnector};

const SIZE: usize = 1024;

fn synthetic_matrix() -> MatrixConnector {
    let mut data = vec![0u16; SIZE * SIZE];
    for l in 0..SIZE {
        for r in 0..SIZE {
            data[l * SIZE + r] = match (l * 31 + r * 17) % 11 {
                0 => 30000,
                1..=3 => ((l * 7 + r * 13) % 2000) as u16,
                _ => 500,
            };
        }
    }
    MatrixConnector::new(data, SIZE, SIZE).unwrap()
}

/// 変換中の参照に近い、少数の左文脈IDに偏ったペア列
fn lookup_pairs() -> Vec<(u16, u16)> {
    let mut pairs = Vec::with_capacity(10_000);
    let mut state = 12345u32;
    for _ in 0..10_000 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        let left = (state >> 16) % 64;
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        let right = (state >> 16) % SIZE as u32;
        pairs.push((left as u16, right as u16));
    }
    pairs
}

fn bench_transition_cost(c: &mut Criterion) {
    let matrix = synthetic_matrix();
    let pairs = lookup_pairs();

    let mut group = c.benchmark_group("TransitionCost");
    group.throughput(Throughput::Elements(pairs.len() as u64));

    for resolution in [1, 10] {
        let bytes = ConnectorBuilder::new()
            .resolution(resolution)
            .unwrap()
            .build(&matrix)
            .unwrap();
        for cache_size in [1, 1024, 16384] {
            let conn = Connector::new(&bytes, cache_size).unwrap();
            let name = format!("resolution={resolution}/cache={cache_size}");
            group.bench_function(name, |b| {
                b.iter(|| {
                    let mut total = 0i64;
                    for &(l, r) in &pairs {
                        total += i64::from(conn.transition_cost(black_box(l), black_box(r)));
                    }
                    total
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_transition_cost);
criterion_main!(benches);
