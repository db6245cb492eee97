mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::{
    Emitter, Plan, PrototypeId, RecordingInstantiator, RotationPolicy, RunConfig, ScalePolicy,
    Scatterer, ShapeConfig, SpawnShape, Species,
};

const POSITIONS: [usize; 3] = [256, 1_024, 4_096];

fn build_plan(species: usize, spacing: f32) -> Plan {
    let emitter = Emitter::new(
        "bench",
        Vec3::new(0.0, 8.0, 0.0),
        ShapeConfig::new(SpawnShape::Hemisphere, 40.0).with_randomized_origin(true),
    );
    let mut plan = Plan::new(emitter);
    for i in 0..species {
        plan = plan.with_species(
            Species::new(format!("sp_{i}"), PrototypeId::new(format!("proto_{i}")))
                .with_spacing(spacing * (1.0 + i as f32 * 0.25), 2)
                .with_max_angle(40.0)
                .with_rotation(RotationPolicy::Random { range: 360.0 })
                .with_scale(ScalePolicy::Uniform { min: 0.8, max: 1.25 }),
        );
    }
    plan
}

fn scatter_benches(c: &mut Criterion) {
    let scene = common::boulder_field(24);
    let plan = build_plan(4, 1.5);

    let mut group = c.benchmark_group("scatter/hemisphere");
    for &positions in &POSITIONS {
        let config = RunConfig::new(positions).with_population_passes(2);

        // Preview a run to set meaningful throughput in "placements per iteration".
        let mut preview_rng = StdRng::seed_from_u64(0xD3ADB33F);
        let mut preview = Scatterer::new(RecordingInstantiator::new());
        let expected = preview
            .scatter(&plan, &config, &scene, &(), &mut preview_rng)
            .map(|r| r.placements.len())
            .unwrap_or(0);
        group.throughput(common::elements_throughput(expected));

        group.bench_with_input(
            BenchmarkId::from_parameter(positions),
            &positions,
            |b, _| {
                b.iter_batched(
                    || {
                        (
                            StdRng::seed_from_u64(12345),
                            Scatterer::new(RecordingInstantiator::new()),
                        )
                    },
                    |(mut rng, mut scatterer)| {
                        let result = scatterer.scatter(&plan, &config, &scene, &(), &mut rng);
                        black_box(result.map(|r| r.placements.len()).unwrap_or(0));
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = scatter_benches
}
criterion_main!(benches);
