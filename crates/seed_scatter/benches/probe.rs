mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::{
    CoherentNoise, MarchParams, ProbeMode, ShapeConfig, ShapeSampler, SpawnShape, SurfaceProber,
    TurbulenceKind,
};

const PROBES: usize = 1_000;
const STEP_DISTANCES: [f32; 4] = [2.0, 1.0, 0.5, 0.25];

fn probe_batch(prober: &SurfaceProber<'_>, mode: &ProbeMode, rng: &mut StdRng) -> usize {
    let sampler = ShapeSampler::new(
        Vec3::new(0.0, 6.0, 0.0),
        Quat::IDENTITY,
        ShapeConfig::new(SpawnShape::Hemisphere, 20.0).with_randomized_origin(true),
    );
    let mut found = 0;
    for _ in 0..PROBES {
        let origin = sampler.sample_origin(rng);
        let direction = sampler.sample_direction(rng);
        let outcome = prober.probe(mode, origin, direction, sampler.config.radius, rng);
        found += usize::from(outcome.point.is_some());
    }
    found
}

fn probe_direct_benches(c: &mut Criterion) {
    let scene = common::boulder_field(16);
    let noise = CoherentNoise::new(7);
    let prober = SurfaceProber::new(&scene, &(), &noise);

    let mut group = c.benchmark_group("probe/direct");
    group.throughput(common::elements_throughput(PROBES));
    let mut rng = StdRng::seed_from_u64(0xD1EC7);
    group.bench_function("hemisphere", |b| {
        b.iter(|| black_box(probe_batch(&prober, &ProbeMode::Direct, &mut rng)));
    });
    group.finish();
}

fn probe_marched_benches(c: &mut Criterion) {
    let scene = common::boulder_field(16);
    let noise = CoherentNoise::new(7);
    let prober = SurfaceProber::new(&scene, &(), &noise);

    for kind in [TurbulenceKind::Uniform, TurbulenceKind::Coherent] {
        let mut group = c.benchmark_group(format!("probe/marched/{kind:?}").to_lowercase());
        group.throughput(common::elements_throughput(PROBES));

        for &step in &STEP_DISTANCES {
            let mode = ProbeMode::Marched(
                MarchParams::new(step)
                    .with_wind(Vec3::new(2.0, 0.0, 0.5))
                    .with_turbulence(kind, 0.2, 0.5),
            );
            let mut rng = StdRng::seed_from_u64(0x3A7C4 ^ step.to_bits() as u64);
            group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, _| {
                b.iter(|| black_box(probe_batch(&prober, &mode, &mut rng)));
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = probe_direct_benches, probe_marched_benches
}
criterion_main!(benches);
