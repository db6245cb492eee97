//! Coherent 3D noise used for turbulence in marched probes.
use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// Seeded Perlin noise sampled in 3D.
#[derive(Clone)]
pub struct CoherentNoise {
    perlin: Perlin,
    seed: u32,
}

impl CoherentNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the noise at `p`, clamped to `[-1, 1]`.
    #[inline]
    pub fn sample(&self, p: Vec3) -> f32 {
        let v = self.perlin.get([p.x as f64, p.y as f64, p.z as f64]) as f32;
        v.clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for CoherentNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoherentNoise")
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_bounded() {
        let noise = CoherentNoise::new(3);
        for i in 0..200 {
            let t = i as f32 * 0.173;
            let v = noise.sample(Vec3::new(t, t * 0.5 + 11.0, 37.0 - t));
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn same_seed_same_values() {
        let a = CoherentNoise::new(42);
        let b = CoherentNoise::new(42);
        let p = Vec3::new(1.3, 4.7, -2.2);
        assert_eq!(a.sample(p), b.sample(p));
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn field_is_continuous() {
        let noise = CoherentNoise::new(5);
        let p = Vec3::new(0.31, 0.77, 1.9);
        let q = p + Vec3::splat(1e-4);
        assert!((noise.sample(p) - noise.sample(q)).abs() < 0.01);
    }
}
