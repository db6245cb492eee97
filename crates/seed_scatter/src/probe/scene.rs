//! Raycast boundary between the scatter engine and the host scene.
//!
//! Hosts implement [`SceneProbe`] on top of their own collision system. The trait speaks
//! `mint` vectors so it can be implemented without depending on `glam`.
pub use mint::Vector3;

/// Opaque identity of the collider a ray hit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Bit set of collision layers a probe may hit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask containing only `layer` (0..32).
    pub fn layer(layer: u8) -> Self {
        debug_assert!(layer < 32, "layer index out of range");
        LayerMask(1u32.checked_shl(layer as u32).unwrap_or(0))
    }

    /// Mask containing every listed layer.
    pub fn from_layers(layers: &[u8]) -> Self {
        layers
            .iter()
            .fold(LayerMask::NONE, |mask, l| mask.with(*l))
    }

    pub fn with(self, layer: u8) -> Self {
        LayerMask(self.0 | LayerMask::layer(layer).0)
    }

    #[inline]
    pub fn contains(self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// Result of a successful raycast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vector3<f32>,
    /// Surface normal at the hit point.
    pub normal: Vector3<f32>,
    /// Distance from the ray origin.
    pub distance: f32,
    pub collider: ColliderId,
}

/// Answers whether a bounded ray intersects scene geometry.
pub trait SceneProbe {
    /// Casts a ray from `origin` along the unit `direction` for at most `max_distance`,
    /// considering only colliders on `layers`. Returns the nearest hit.
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit>;
}

impl<P: SceneProbe + ?Sized> SceneProbe for &P {
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, layers)
    }
}

impl<P: SceneProbe + ?Sized> SceneProbe for Box<P> {
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, layers)
    }
}

/// A list of probes acts as one scene; the nearest hit wins.
impl<P: SceneProbe> SceneProbe for Vec<P> {
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        self.iter()
            .filter_map(|p| p.raycast(origin, direction, max_distance, layers))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// A scene with no geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl SceneProbe for EmptyScene {
    fn raycast(
        &self,
        _origin: Vector3<f32>,
        _direction: Vector3<f32>,
        _max_distance: f32,
        _layers: LayerMask,
    ) -> Option<RayHit> {
        None
    }
}
