//! Export of scatter placements as terrain tree instances.
//!
//! Terrain instances only carry a yaw, so any tilt from surface alignment is dropped.
use std::collections::HashMap;
use std::f32::consts::TAU;

use glam::Vec3;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::scatter::runner::Placement;
use crate::scatter::species::PrototypeId;

/// World-space placement and extent of a terrain.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainBounds {
    pub origin: Vec3,
    pub size: Vec3,
}

impl TerrainBounds {
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self { origin, size }
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if !ok(self.size.x) || !ok(self.size.z) {
            return Err(Error::InvalidConfig(format!(
                "terrain size must be positive on x and z, got {:?}",
                self.size
            )));
        }
        Ok(())
    }

    /// Position relative to the terrain, scaled to `[0, 1]` on x and z. Y is always 0.
    pub fn normalize(&self, world: Vec3) -> Vec3 {
        let local = world - self.origin;
        Vec3::new(local.x / self.size.x, 0.0, local.z / self.size.z)
    }
}

/// A tree instance in terrain-normalized coordinates.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainInstance {
    pub position: Vec3,
    /// Index into [`TerrainInstanceBatch::prototypes`].
    pub prototype_index: usize,
    /// Yaw in radians, in `[0, 2π)`.
    pub rotation: f32,
    pub width_scale: f32,
    pub height_scale: f32,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainInstanceBatch {
    pub prototypes: Vec<PrototypeId>,
    pub instances: Vec<TerrainInstance>,
    /// Placements outside the terrain rectangle.
    pub skipped: usize,
}

/// Converts `placements` into terrain instances.
///
/// The prototype table starts as `existing_prototypes` and gains each new prototype once.
pub fn export_terrain_instances(
    placements: &[Placement],
    bounds: &TerrainBounds,
    existing_prototypes: &[PrototypeId],
) -> Result<TerrainInstanceBatch> {
    bounds.validate()?;

    let mut batch = TerrainInstanceBatch {
        prototypes: existing_prototypes.to_vec(),
        instances: Vec::with_capacity(placements.len()),
        skipped: 0,
    };
    let mut index_of: HashMap<PrototypeId, usize> = HashMap::new();
    for (i, prototype) in batch.prototypes.iter().enumerate() {
        index_of.entry(prototype.clone()).or_insert(i);
    }

    for placement in placements {
        let position = bounds.normalize(placement.transform.position);
        if !(0.0..=1.0).contains(&position.x) || !(0.0..=1.0).contains(&position.z) {
            batch.skipped += 1;
            continue;
        }

        let prototype_index = match index_of.get(&placement.prototype) {
            Some(&i) => i,
            None => {
                let i = batch.prototypes.len();
                batch.prototypes.push(placement.prototype.clone());
                index_of.insert(placement.prototype.clone(), i);
                i
            }
        };

        let transform = &placement.transform;
        batch.instances.push(TerrainInstance {
            position,
            prototype_index,
            rotation: transform.yaw().rem_euclid(TAU),
            width_scale: transform.scale.x,
            height_scale: transform.scale.y,
        });
    }

    if batch.skipped > 0 {
        warn!("{} placements lie outside the terrain and were not exported.", batch.skipped);
    }
    debug!(
        "Exported {} terrain instances over {} prototypes.",
        batch.instances.len(), batch.prototypes.len()
    );

    Ok(batch)
}
