use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::*;
use seed_scatter_examples::{
    init_tracing, render_run_to_png, Heightfield, RenderConfig, SpeciesStyle,
};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let ground = Heightfield::new(3, 2.5, 0.06);

    // Hemisphere emitter hovering over rolling terrain, straight rays only.
    let emitter = Emitter::new(
        "hemisphere",
        Vec3::new(0.0, 12.0, 0.0),
        ShapeConfig::new(SpawnShape::Hemisphere, 40.0),
    );
    let plan = Plan::new(emitter)
        .with_species(
            Species::new("pine", PrototypeId::new("pine"))
                .with_spacing(4.0, 0)
                .with_max_angle(30.0),
        )
        .with_species(
            Species::new("shrub", PrototypeId::new("shrub"))
                .with_spacing(1.5, 2)
                .with_max_angle(45.0),
        );
    let config = RunConfig::new(600)
        .with_population_passes(3)
        .with_debug(DebugLevel::Rays);

    let mut rng = StdRng::seed_from_u64(42);
    let mut sink = VecSink::only([ScatterEventKind::ProbeTraced]);
    let mut scatterer = Scatterer::new(RecordingInstantiator::new());
    let result = scatterer.scatter_with_events(&plan, &config, &ground, &(), &mut rng, &mut sink)?;

    let mut rc = RenderConfig::new((1000, 1000), Vec2::ZERO, Vec2::splat(80.0))
        .with_ground(ground)
        .with_debug(config.debug);
    rc.set_species_style(
        "pine",
        SpeciesStyle {
            color: [20, 90, 40],
            radius: 5,
        },
    );
    rc.set_species_style(
        "shrub",
        SpeciesStyle {
            color: [120, 160, 40],
            radius: 3,
        },
    );
    render_run_to_png(&result, sink.as_slice(), &rc, "direct-cast-hemisphere.png")?;

    Ok(())
}
