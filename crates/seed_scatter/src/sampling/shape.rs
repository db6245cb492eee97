//! Bounding shapes that emit probe origins and directions.
use glam::{Quat, Vec3};
use rand::RngCore;

use crate::error::{Error, Result};
use crate::sampling::{inside_unit_ball, on_unit_hemisphere, on_unit_sphere};

/// Shape of the emitter volume.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpawnShape {
    #[default]
    Sphere,
    /// Lower half of a sphere; probes always point downwards.
    Hemisphere,
    /// Flat disc in the emitter's XZ plane.
    Disc,
    /// Flat disc whose probes always point downwards.
    HemiDisc,
}

impl SpawnShape {
    /// Whether sampled directions are forced to point down.
    #[inline]
    pub fn is_hemi(self) -> bool {
        matches!(self, SpawnShape::Hemisphere | SpawnShape::HemiDisc)
    }

    /// Whether sampled origins are flattened onto the emitter plane.
    #[inline]
    pub fn is_flat(self) -> bool {
        matches!(self, SpawnShape::Disc | SpawnShape::HemiDisc)
    }
}

/// Emitter shape configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeConfig {
    pub shape: SpawnShape,
    /// Radius of the shape in world units. Also bounds probe distance.
    pub radius: f32,
    /// When false every probe starts at the emitter anchor.
    pub randomize_origin: bool,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            shape: SpawnShape::Sphere,
            radius: 1.0,
            randomize_origin: false,
        }
    }
}

impl ShapeConfig {
    pub fn new(shape: SpawnShape, radius: f32) -> Self {
        Self {
            shape,
            radius,
            ..Default::default()
        }
    }

    pub fn with_randomized_origin(mut self, randomize: bool) -> Self {
        self.randomize_origin = randomize;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidConfig("shape radius must be > 0".into()));
        }
        Ok(())
    }
}

/// Samples probe origins and directions for an emitter placed at `anchor` with `orientation`.
///
/// Offsets and directions are drawn in the emitter's local frame and rotated into
/// world space, so "down" for hemispherical shapes follows the emitter.
#[derive(Clone, Copy, Debug)]
pub struct ShapeSampler {
    pub anchor: Vec3,
    pub orientation: Quat,
    pub config: ShapeConfig,
}

impl ShapeSampler {
    pub fn new(anchor: Vec3, orientation: Quat, config: ShapeConfig) -> Self {
        Self {
            anchor,
            orientation,
            config,
        }
    }

    /// Draws a probe origin. Does not touch the RNG when origin randomization is off.
    pub fn sample_origin(&self, rng: &mut dyn RngCore) -> Vec3 {
        if !self.config.randomize_origin {
            return self.anchor;
        }

        let mut offset = inside_unit_ball(rng) * self.config.radius;
        if self.config.shape.is_hemi() {
            offset.y = -offset.y.abs();
        }
        if self.config.shape.is_flat() {
            offset.y = 0.0;
        }

        self.anchor + self.orientation * offset
    }

    /// Draws a unit probe direction.
    pub fn sample_direction(&self, rng: &mut dyn RngCore) -> Vec3 {
        let dir = if self.config.shape.is_hemi() {
            on_unit_hemisphere(rng)
        } else {
            on_unit_sphere(rng)
        };
        (self.orientation * dir).normalize()
    }
}
