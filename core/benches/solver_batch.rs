use criterion::{Criterion, criterion_group, criterion_main};
use sweeper_core::*;

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver_batch");
    group.sample_size(20);
    for (name, safety_rule) in [("any_flag", SafetyRule::AnyFlag), ("saturated", SafetyRule::Saturated)] {
        group.bench_function(name, |b| {
            let mut session = Session::new(Difficulty::Intermediate.config(), 1).unwrap();
            let mut solver = Solver::new(
                SolverConfig {
                    safety_rule,
                    ..Default::default()
                },
                1,
            );
            b.iter(|| solver.run_batch(&mut session, 10).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch);
criterion_main!(benches);
