//! Analytic colliders implementing [`SceneProbe`].
//!
//! Useful as stand-in geometry for tools and tests. Both shapes are one-sided:
//! a ray starting inside a sphere or behind a plane does not hit it, matching
//! how mesh colliders behave in most engines.
use glam::Vec3;
use mint::Vector3;

use crate::probe::scene::{ColliderId, LayerMask, RayHit, SceneProbe};

const PARALLEL_EPSILON: f32 = 1e-8;

/// Infinite plane through `point` facing `normal`.
#[derive(Clone, Copy, Debug)]
pub struct InfinitePlane {
    pub point: Vec3,
    pub normal: Vec3,
    pub collider: ColliderId,
    pub layer: u8,
}

impl InfinitePlane {
    pub fn new(point: Vec3, normal: Vec3, collider: ColliderId) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            collider,
            layer: 0,
        }
    }

    /// Horizontal ground plane at height `y` facing up.
    pub fn ground(y: f32, collider: ColliderId) -> Self {
        Self::new(Vec3::new(0.0, y, 0.0), Vec3::Y, collider)
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

impl SceneProbe for InfinitePlane {
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

        let denom = self.normal.dot(direction);
        if denom > -PARALLEL_EPSILON {
            return None;
        }
        let t = self.normal.dot(self.point - origin) / denom;
        if t < 0.0 || t > max_distance {
            return None;
        }

        Some(RayHit {
            point: (origin + direction * t).into(),
            normal: self.normal.into(),
            distance: t,
            collider: self.collider,
        })
    }
}

/// Solid sphere.
#[derive(Clone, Copy, Debug)]
pub struct SphereCollider {
    pub center: Vec3,
    pub radius: f32,
    pub collider: ColliderId,
    pub layer: u8,
}

impl SphereCollider {
    pub fn new(center: Vec3, radius: f32, collider: ColliderId) -> Self {
        Self {
            center,
            radius,
            collider,
            layer: 0,
        }
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

impl SceneProbe for SphereCollider {
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        if !layers.contains(self.layer) || self.radius <= 0.0 {
            return None;
        }
        let origin = Vec3::from(origin);
        let direction = Vec3::from(direction);

        let oc = origin - self.center;
        let b = oc.dot(direction);
        let c = oc.length_squared() - self.radius * self.radius;
        if c < 0.0 {
            // Origin inside the sphere.
            return None;
        }
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        if t < 0.0 || t > max_distance {
            return None;
        }

        let point = origin + direction * t;
        Some(RayHit {
            point: point.into(),
            normal: ((point - self.center) / self.radius).into(),
            distance: t,
            collider: self.collider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(probe: &dyn SceneProbe, origin: Vec3, dir: Vec3, max: f32) -> Option<RayHit> {
        probe.raycast(origin.into(), dir.normalize().into(), max, LayerMask::ALL)
    }

    #[test]
    fn ground_plane_hit_from_above() {
        let plane = InfinitePlane::ground(2.0, ColliderId(1));
        let hit = cast(&plane, Vec3::new(1.0, 5.0, 1.0), Vec3::NEG_Y, 10.0).expect("hit");
        assert_eq!(Vec3::from(hit.point), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(Vec3::from(hit.normal), Vec3::Y);
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ground_plane_respects_distance_and_side() {
        let plane = InfinitePlane::ground(0.0, ColliderId(1));
        assert!(cast(&plane, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 4.9).is_none());
        assert!(cast(&plane, Vec3::new(0.0, -1.0, 0.0), Vec3::Y, 10.0).is_none());
        assert!(cast(&plane, Vec3::new(0.0, 1.0, 0.0), Vec3::X, 10.0).is_none());
    }

    #[test]
    fn plane_filtered_by_layer() {
        let plane = InfinitePlane::ground(0.0, ColliderId(1)).on_layer(4);
        let origin = Vec3::new(0.0, 1.0, 0.0);
        assert!(plane
            .raycast(origin.into(), Vec3::NEG_Y.into(), 5.0, LayerMask::layer(3))
            .is_none());
        assert!(plane
            .raycast(origin.into(), Vec3::NEG_Y.into(), 5.0, LayerMask::layer(4))
            .is_some());
    }

    #[test]
    fn sphere_hit_reports_outward_normal() {
        let sphere = SphereCollider::new(Vec3::ZERO, 1.0, ColliderId(7));
        let hit = cast(&sphere, Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 10.0).expect("hit");
        assert!((Vec3::from(hit.point) - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((Vec3::from(hit.normal) - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(hit.collider, ColliderId(7));
    }

    #[test]
    fn sphere_misses_from_inside_and_when_off_axis() {
        let sphere = SphereCollider::new(Vec3::ZERO, 1.0, ColliderId(7));
        assert!(cast(&sphere, Vec3::ZERO, Vec3::X, 10.0).is_none());
        assert!(cast(&sphere, Vec3::new(0.0, 2.0, -5.0), Vec3::Z, 10.0).is_none());
        assert!(cast(&sphere, Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 10.0).is_none());
    }
}
