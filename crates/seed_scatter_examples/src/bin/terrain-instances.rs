use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_scatter::prelude::*;
use seed_scatter_examples::{init_tracing, Heightfield};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let ground = Heightfield::new(5, 2.0, 0.05);

    let emitter = Emitter::new(
        "forest",
        Vec3::new(0.0, 10.0, 0.0),
        ShapeConfig::new(SpawnShape::Hemisphere, 30.0).with_randomized_origin(true),
    );
    let plan = Plan::new(emitter)
        .with_species(
            Species::new("oak", PrototypeId::new("oak"))
                .with_spacing(5.0, 0)
                .with_rotation(RotationPolicy::Random { range: 360.0 })
                .with_scale(ScalePolicy::Uniform { min: 0.9, max: 1.4 }),
        )
        .with_species(
            Species::new("fir", PrototypeId::new("fir"))
                .with_spacing(3.0, 1)
                .with_rotation(RotationPolicy::Random { range: 360.0 })
                .with_scale(ScalePolicy::PerAxis {
                    min: Vec3::new(0.8, 1.0, 0.8),
                    max: Vec3::new(1.0, 1.6, 1.0),
                }),
        );
    let config = RunConfig::new(800).with_align_to_surface(true);

    let mut rng = StdRng::seed_from_u64(2024);
    let mut scatterer = Scatterer::new(RecordingInstantiator::new());
    let result = scatterer.scatter(&plan, &config, &ground, &(), &mut rng)?;

    // The terrain already knows about firs; oaks get appended.
    let bounds = TerrainBounds::new(Vec3::new(-25.0, -5.0, -25.0), Vec3::new(50.0, 20.0, 50.0));
    let batch = export_terrain_instances(&result.placements, &bounds, &[PrototypeId::new("fir")])?;

    let summary = result.summary();
    println!(
        "{} probes, {} points, {} placed, {} unoccupied",
        summary.positions_attempted, summary.points_found, summary.placed, summary.unoccupied
    );
    println!(
        "exported {} instances over {:?}, {} outside terrain",
        batch.instances.len(), batch.prototypes, batch.skipped
    );
    for instance in batch.instances.iter().take(5) {
        println!(
            "  proto {} at ({:.3}, {:.3}) yaw {:.2} rad, {:.2}x{:.2}",
            instance.prototype_index,
            instance.position.x,
            instance.position.z,
            instance.rotation,
            instance.width_scale,
            instance.height_scale
        );
    }

    let cleared = scatterer.clear();
    println!("cleared {cleared} scene objects");

    Ok(())
}
