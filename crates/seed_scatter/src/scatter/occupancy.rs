//! Discovered surface points and the occupancy field that holds them.
use glam::Vec3;

use crate::probe::scene::RayHit;
use crate::probe::surface::{MaterialId, SurfaceTags, TextureId};
use crate::sampling::next_down;

/// A surface location found by a probe; a candidate slot for one species.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    /// Set once a species has been committed here. Never reset within a run.
    pub occupied: bool,
    /// Angle between world up and the surface normal in degrees, in `[0, 180)`.
    pub angle: f32,
    pub normal: Vec3,
    pub material: Option<MaterialId>,
    pub texture: Option<TextureId>,
}

impl SurfacePoint {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            position,
            occupied: false,
            angle: surface_angle(normal),
            normal,
            material: None,
            texture: None,
        }
    }

    /// Builds an unoccupied point from a probe hit.
    pub fn from_hit(hit: &RayHit, tags: SurfaceTags) -> Self {
        Self::new(Vec3::from(hit.point), Vec3::from(hit.normal)).with_tags(tags)
    }

    pub fn with_tags(mut self, tags: SurfaceTags) -> Self {
        self.material = tags.material;
        self.texture = tags.texture;
        self
    }
}

/// Angle between world up and `normal`, in degrees, kept strictly below 180.
pub fn surface_angle(normal: Vec3) -> f32 {
    if normal == Vec3::ZERO {
        return 0.0;
    }
    let angle = Vec3::Y
        .cross(normal)
        .length()
        .atan2(Vec3::Y.dot(normal))
        .to_degrees();
    if angle.is_nan() {
        0.0
    } else {
        angle.clamp(0.0, next_down(180.0))
    }
}

/// Ordered collection of surface points in discovery order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OccupancyField {
    points: Vec<SurfacePoint>,
}

impl OccupancyField {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            points: Vec::with_capacity(cap),
        }
    }

    /// Appends a point and returns its index.
    pub fn push(&mut self, point: SurfacePoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SurfacePoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SurfacePoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Marks the point at `index` occupied. Returns `true` if it was free before.
    pub fn mark_occupied(&mut self, index: usize) -> bool {
        match self.points.get_mut(index) {
            Some(p) if !p.occupied => {
                p.occupied = true;
                true
            }
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.points.iter().filter(|p| p.occupied).count()
    }

    pub fn unoccupied_count(&self) -> usize {
        self.len() - self.occupied_count()
    }

    /// Counts occupied points strictly closer than `distance` to `position`.
    pub fn neighbours_within(&self, position: Vec3, distance: f32) -> usize {
        self.points
            .iter()
            .filter(|p| p.occupied && p.position.distance(position) < distance)
            .count()
    }
}

impl<'a> IntoIterator for &'a OccupancyField {
    type Item = &'a SurfacePoint;
    type IntoIter = std::slice::Iter<'a, SurfacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_at(x: f32) -> SurfacePoint {
        SurfacePoint::new(Vec3::new(x, 0.0, 0.0), Vec3::Y)
    }

    #[test]
    fn angle_is_measured_from_up() {
        assert_eq!(surface_angle(Vec3::Y), 0.0);
        assert!((surface_angle(Vec3::X) - 90.0).abs() < 1e-4);
        assert_eq!(surface_angle(Vec3::new(1.0, 1.0, 0.0).normalize()), 45.0);
        assert_eq!(surface_angle(Vec3::new(0.0, 1.0, -1.0).normalize()), 45.0);
    }

    #[test]
    fn upside_down_normal_stays_below_180() {
        let angle = surface_angle(Vec3::NEG_Y);
        assert!(angle < 180.0);
        assert!(angle > 179.9);
    }

    #[test]
    fn new_points_start_unoccupied() {
        let p = SurfacePoint::new(Vec3::ONE, Vec3::new(0.0, 2.0, 0.0));
        assert!(!p.occupied);
        assert_eq!(p.normal, Vec3::Y);
        assert_eq!(p.material, None);
    }

    #[test]
    fn mark_occupied_is_monotonic() {
        let mut field = OccupancyField::new();
        let idx = field.push(point_at(0.0));
        assert!(field.mark_occupied(idx));
        assert!(!field.mark_occupied(idx));
        assert!(!field.mark_occupied(42));
        assert_eq!(field.occupied_count(), 1);
        assert_eq!(field.unoccupied_count(), 0);
    }

    #[test]
    fn neighbour_count_is_strict_and_ignores_free_points() {
        let mut field = OccupancyField::new();
        for x in [0.0, 1.0, 2.0, 3.0] {
            let i = field.push(point_at(x));
            if x != 3.0 {
                field.mark_occupied(i);
            }
        }
        // Distance exactly 2 to x=2 is excluded; x=3 is free.
        assert_eq!(field.neighbours_within(Vec3::ZERO, 2.0), 2);
        assert_eq!(field.neighbours_within(Vec3::ZERO, 2.5), 3);
        assert_eq!(field.neighbours_within(Vec3::ZERO, 0.0), 0);
    }

    #[test]
    fn clear_empties_field() {
        let mut field = OccupancyField::with_capacity(4);
        field.push(point_at(0.0));
        field.clear();
        assert!(field.is_empty());
        field.clear();
        assert_eq!(field.len(), 0);
    }
}
