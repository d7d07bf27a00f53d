use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sweeper_core::*;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for difficulty in [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Expert] {
        let config = difficulty.config();
        group.bench_function(format!("{:?}", difficulty), |b| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                black_box(RandomMinefieldGenerator::new(seed, StartCell::Random).generate(config))
            })
        });
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    let grid = Grid::from_mine_coords((255, 255), &[(254, 254)]).unwrap();
    c.bench_function("flood_fill_255x255", |b| {
        b.iter(|| {
            let mut grid = grid.clone();
            black_box(board::reveal(&mut grid, (0, 0)).unwrap())
        })
    });
}

criterion_group!(benches, bench_generate, bench_flood_fill);
criterion_main!(benches);
