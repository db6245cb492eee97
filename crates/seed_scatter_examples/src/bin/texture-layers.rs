use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::*;
use seed_scatter_examples::{
    init_tracing, render_run_to_png, Heightfield, RenderConfig, SpeciesStyle,
};

const SAND: TextureId = TextureId(10);
const GRASS: TextureId = TextureId(11);
const ROCK: TextureId = TextureId(12);

fn main() -> anyhow::Result<()> {
    init_tracing();
    let ground = Heightfield::new(21, 4.0, 0.04).with_collider(ColliderId(7));

    // Layered terrain: sand in the valleys, grass on the slopes, rock on the peaks.
    let mut surfaces = SurfaceRegistry::new();
    let layers = ground.clone();
    surfaces.register_terrain(
        ground.collider,
        TerrainId(0),
        vec![SAND, GRASS, ROCK],
        move |p: Vec3| {
            let h = layers.height(p.x, p.z);
            if h < -1.0 {
                0
            } else if h < 1.5 {
                1
            } else {
                2
            }
        },
    );

    let emitter = Emitter::new(
        "valley",
        Vec3::new(0.0, 20.0, 0.0),
        ShapeConfig::new(SpawnShape::HemiDisc, 45.0).with_randomized_origin(true),
    );
    let plan = Plan::new(emitter)
        .with_species(
            Species::new("reed", PrototypeId::new("reed"))
                .with_spacing(1.0, 3)
                .with_textures([SAND]),
        )
        .with_species(
            Species::new("birch", PrototypeId::new("birch"))
                .with_spacing(3.0, 0)
                .with_max_angle(35.0)
                .with_textures([GRASS]),
        )
        .with_species(
            Species::new("boulder", PrototypeId::new("boulder"))
                .with_spacing(4.0, 0)
                .with_textures([ROCK]),
        );
    let config = RunConfig::new(2000).with_match_mode(MatchMode::Texture);

    let mut rng = StdRng::seed_from_u64(99);
    let mut scatterer = Scatterer::new(RecordingInstantiator::new());
    let result = scatterer.scatter(&plan, &config, &ground, &surfaces, &mut rng)?;

    let mut rc =
        RenderConfig::new((1000, 1000), Vec2::ZERO, Vec2::splat(90.0)).with_ground(ground);
    for (species, color, radius) in [
        ("reed", [200, 170, 60], 2),
        ("birch", [40, 110, 40], 4),
        ("boulder", [90, 90, 90], 5),
    ] {
        rc.set_species_style(species, SpeciesStyle { color, radius });
    }
    render_run_to_png(&result, &[], &rc, "texture-layers.png")?;

    Ok(())
}
