//! Random sources for candidate generation.
//!
//! This module provides the uniform draws every stochastic step of a scatter run
//! is built from, plus the [`ShapeSampler`] that turns them into probe origins and
//! directions and the [`CoherentNoise`] used by marched probes.
//!
//! All helpers take `&mut dyn RngCore` and consume a fixed number of draws, so a
//! seeded generator reproduces the exact same run.
use std::f32::consts::TAU;

use glam::Vec3;
use rand::RngCore;

pub mod noise;
pub mod shape;

pub use noise::CoherentNoise;
pub use shape::{ShapeConfig, ShapeSampler, SpawnShape};

/// Generate a random float in the range [0, 1).
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    let v = (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0);
    // u32 -> f32 rounding can land exactly on 1.0 for the largest inputs.
    v.min(next_down(1.0))
}

/// Generate a random float in `[min, max)`. Returns `min` for empty or inverted ranges.
#[inline]
pub fn rand_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    let t = rand01(rng);
    if max <= min {
        return min;
    }
    min + (max - min) * t
}

/// Uniform point on the unit sphere. Consumes two draws.
pub fn on_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let y = 1.0 - 2.0 * rand01(rng);
    let phi = TAU * rand01(rng);
    let r = (1.0 - y * y).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), y, r * phi.sin())
}

/// Uniform point on the lower unit hemisphere (`y <= 0`). Consumes two draws.
pub fn on_unit_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let mut dir = on_unit_sphere(rng);
    dir.y = -dir.y.abs();
    dir
}

/// Uniform point inside the unit ball. Consumes three draws.
pub fn inside_unit_ball(rng: &mut dyn RngCore) -> Vec3 {
    let dir = on_unit_sphere(rng);
    dir * rand01(rng).cbrt()
}

/// Compute the next smaller representable float value.
///
/// Returns a value that is strictly less than the input, useful for
/// keeping half-open ranges half-open. Handles edge cases
/// safely including very small positive values and zero.
#[inline]
pub fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}
