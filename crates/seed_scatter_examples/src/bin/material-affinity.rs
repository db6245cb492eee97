use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::*;
use seed_scatter_examples::{init_tracing, render_run_to_png, RenderConfig, SpeciesStyle};

const SOIL: MaterialId = MaterialId(1);
const STONE: MaterialId = MaterialId(2);

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Flat soil with a few stone boulders. Grass only grows on soil, moss only on stone.
    let mut scene: Vec<Box<dyn SceneProbe>> =
        vec![Box::new(InfinitePlane::ground(0.0, ColliderId(0)))];
    let mut surfaces = SurfaceRegistry::new();
    surfaces.set_material(ColliderId(0), SOIL);

    let boulders = [
        (Vec3::new(-8.0, 0.0, 4.0), 4.0),
        (Vec3::new(7.0, 0.0, -6.0), 5.0),
        (Vec3::new(3.0, 0.0, 10.0), 2.5),
    ];
    for (i, (center, radius)) in boulders.into_iter().enumerate() {
        let id = ColliderId(i as u64 + 1);
        scene.push(Box::new(SphereCollider::new(center, radius, id)));
        surfaces.set_material(id, STONE);
    }

    let emitter = Emitter::new(
        "meadow",
        Vec3::new(0.0, 15.0, 0.0),
        ShapeConfig::new(SpawnShape::HemiDisc, 24.0).with_randomized_origin(true),
    );
    let plan = Plan::new(emitter)
        .with_species(
            Species::new("grass", PrototypeId::new("grass"))
                .with_spacing(1.2, 1)
                .with_materials([SOIL]),
        )
        .with_species(
            Species::new("moss", PrototypeId::new("moss"))
                .with_spacing(0.6, 2)
                .with_max_angle(70.0)
                .with_materials([STONE]),
        );
    let config = RunConfig::new(1500)
        .with_population_passes(2)
        .with_match_mode(MatchMode::Material)
        .with_align_to_surface(true)
        .with_debug(DebugLevel::Verbose);

    let mut rng = StdRng::seed_from_u64(5);
    let mut sink = VecSink::only([ScatterEventKind::PlacementRejected]);
    let mut scatterer = Scatterer::new(RecordingInstantiator::new());
    let result =
        scatterer.scatter_with_events(&plan, &config, &scene, &surfaces, &mut rng, &mut sink)?;

    let mut rc = RenderConfig::new((1000, 1000), Vec2::ZERO, Vec2::splat(60.0))
        .with_background([200, 180, 150])
        .with_debug(config.debug);
    rc.set_species_style(
        "grass",
        SpeciesStyle {
            color: [60, 150, 50],
            radius: 2,
        },
    );
    rc.set_species_style(
        "moss",
        SpeciesStyle {
            color: [30, 90, 70],
            radius: 2,
        },
    );
    render_run_to_png(&result, sink.as_slice(), &rc, "material-affinity.png")?;

    Ok(())
}
