use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::*;
use seed_scatter_examples::{
    init_tracing, render_run_to_png, Heightfield, RenderConfig, SpeciesStyle,
};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let ground = Heightfield::new(11, 1.5, 0.05);

    // Seeds blown from a sideways-facing sphere emitter. Compare per-step uniform
    // turbulence with coherent noise turbulence under the same wind.
    for (kind, out_path) in [
        (TurbulenceKind::Uniform, "marched-cast-wind-uniform.png"),
        (TurbulenceKind::Coherent, "marched-cast-wind-coherent.png"),
    ] {
        let march = MarchParams::new(0.5)
            .with_gravity(-9.81)
            .with_wind(Vec3::new(6.0, 0.0, 1.5))
            .with_turbulence(kind, 0.15, 0.6);
        let emitter = Emitter::new(
            "dandelion",
            Vec3::new(-25.0, 10.0, 0.0),
            ShapeConfig::new(SpawnShape::Sphere, 30.0).with_randomized_origin(true),
        )
        .with_orientation(Quat::from_rotation_z(-0.3))
        .with_probe(ProbeMode::Marched(march));
        let plan = Plan::new(emitter).with_species(
            Species::new("flower", PrototypeId::new("flower"))
                .with_spacing(1.0, 1)
                .with_rotation(RotationPolicy::Random { range: 360.0 })
                .with_scale(ScalePolicy::Uniform { min: 0.7, max: 1.3 }),
        );
        let config = RunConfig::new(400)
            .with_noise_seed(7)
            .with_align_to_surface(true)
            .with_debug(DebugLevel::Rays);

        let mut rng = StdRng::seed_from_u64(7);
        let mut sink = VecSink::only([ScatterEventKind::ProbeTraced]);
        let mut scatterer = Scatterer::new(RecordingInstantiator::new());
        let result =
            scatterer.scatter_with_events(&plan, &config, &ground, &(), &mut rng, &mut sink)?;

        let mut rc = RenderConfig::new((1000, 1000), Vec2::ZERO, Vec2::splat(70.0))
            .with_ground(ground.clone())
            .with_debug(config.debug);
        rc.set_species_style(
            "flower",
            SpeciesStyle {
                color: [230, 190, 30],
                radius: 3,
            },
        );
        render_run_to_png(&result, sink.as_slice(), &rc, out_path)?;
    }

    Ok(())
}
