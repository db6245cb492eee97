use glam::Vec3;
use noise::{NoiseFn, Perlin};
use seed_scatter::prelude::{ColliderId, LayerMask, RayHit, SceneProbe};
use seed_scatter::probe::scene::Vector3;

const MARCH_STEP: f32 = 0.25;
const REFINE_ITERATIONS: usize = 16;
const NORMAL_EPSILON: f32 = 0.05;

/// Rolling Perlin terrain used as the example scene. Heights are `base + amplitude * noise`.
#[derive(Clone, Debug)]
pub struct Heightfield {
    perlin: Perlin,
    pub base: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub collider: ColliderId,
    pub layer: u8,
}

impl Heightfield {
    pub fn new(seed: u32, amplitude: f32, frequency: f32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base: 0.0,
            amplitude,
            frequency,
            collider: ColliderId(1),
            layer: 0,
        }
    }

    pub fn with_collider(mut self, collider: ColliderId) -> Self {
        self.collider = collider;
        self
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        let n = self
            .perlin
            .get([(x * self.frequency) as f64, (z * self.frequency) as f64]);
        self.base + self.amplitude * n as f32
    }

    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let dx = self.height(x + NORMAL_EPSILON, z) - self.height(x - NORMAL_EPSILON, z);
        let dz = self.height(x, z + NORMAL_EPSILON) - self.height(x, z - NORMAL_EPSILON);
        Vec3::new(-dx, 2.0 * NORMAL_EPSILON, -dz).normalize_or(Vec3::Y)
    }

    fn below(&self, p: Vec3) -> bool {
        p.y <= self.height(p.x, p.z)
    }
}

impl SceneProbe for Heightfield {
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        if !layers.contains(self.layer) {
            return None;
        }
        let origin = Vec3::from(origin);
        let direction = Vec3::from(direction);
        // Rays starting underground see the terrain from behind.
        if self.below(origin) {
            return None;
        }

        let mut near = 0.0;
        while near < max_distance {
            let far = (near + MARCH_STEP).min(max_distance);
            if self.below(origin + direction * far) {
                let (mut lo, mut hi) = (near, far);
                for _ in 0..REFINE_ITERATIONS {
                    let mid = 0.5 * (lo + hi);
                    if self.below(origin + direction * mid) {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                let point = origin + direction * hi;
                return Some(RayHit {
                    point: point.into(),
                    normal: self.normal(point.x, point.z).into(),
                    distance: hi,
                    collider: self.collider,
                });
            }
            near = far;
        }
        None
    }
}
