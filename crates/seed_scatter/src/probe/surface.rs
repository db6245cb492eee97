//! Surface material and texture lookup for probe hits.
//!
//! This module defines how the engine learns what a probe landed on:
//! - Hosts answer material/texture/terrain queries by implementing [`SurfaceCatalog`].
//! - [`SurfaceRegistry`] is a ready-made table-backed catalog.
//! - [`resolve_tags`] turns a [`RayHit`] into the [`SurfaceTags`] stored on a surface point.
use std::collections::HashMap;
use std::fmt;

use glam::Vec3;

use crate::probe::scene::{ColliderId, RayHit};
use crate::scatter::selection::MatchMode;

/// Identity of a surface material.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Identity of a surface texture.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Identity of a layered terrain surface.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerrainId(pub u32);

/// Texture slot names tried, in order, when resolving a material's texture.
pub const TEXTURE_SLOT_PRIORITY: [&str; 4] =
    ["_BaseMap", "_MainTex", "_BaseColorMap", "_AlbedoMap"];

/// Host-side surface information. Every query defaults to "unknown".
pub trait SurfaceCatalog {
    /// Material exposed by the collider, if any.
    fn material_of(&self, _collider: ColliderId) -> Option<MaterialId> {
        None
    }

    /// Texture bound to the first slot in `slots` that the material has.
    fn texture_of(&self, _material: MaterialId, _slots: &[&str]) -> Option<TextureId> {
        None
    }

    /// Terrain behind the collider, when the collider is a large layered terrain.
    fn terrain_of(&self, _collider: ColliderId) -> Option<TerrainId> {
        None
    }

    /// Index of the layer with the highest weight at `point`.
    fn dominant_layer(&self, _terrain: TerrainId, _point: Vec3) -> Option<usize> {
        None
    }

    /// Texture of the terrain layer at `index`.
    fn layer_texture(&self, _terrain: TerrainId, _index: usize) -> Option<TextureId> {
        None
    }
}

/// A catalog with no surface information.
impl SurfaceCatalog for () {}

impl<S: SurfaceCatalog + ?Sized> SurfaceCatalog for &S {
    fn material_of(&self, collider: ColliderId) -> Option<MaterialId> {
        (**self).material_of(collider)
    }

    fn texture_of(&self, material: MaterialId, slots: &[&str]) -> Option<TextureId> {
        (**self).texture_of(material, slots)
    }

    fn terrain_of(&self, collider: ColliderId) -> Option<TerrainId> {
        (**self).terrain_of(collider)
    }

    fn dominant_layer(&self, terrain: TerrainId, point: Vec3) -> Option<usize> {
        (**self).dominant_layer(terrain, point)
    }

    fn layer_texture(&self, terrain: TerrainId, index: usize) -> Option<TextureId> {
        (**self).layer_texture(terrain, index)
    }
}

/// Material and texture tags resolved for a hit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceTags {
    pub material: Option<MaterialId>,
    pub texture: Option<TextureId>,
}

/// Resolves the surface tags for `hit`.
///
/// Terrains never expose a material. Textures are only looked up in
/// [`MatchMode::Texture`], since the dominant-layer query is the costliest one.
pub fn resolve_tags(hit: &RayHit, surfaces: &dyn SurfaceCatalog, mode: MatchMode) -> SurfaceTags {
    let terrain = surfaces.terrain_of(hit.collider);
    let material = match terrain {
        Some(_) => None,
        None => surfaces.material_of(hit.collider),
    };

    let texture = if mode == MatchMode::Texture {
        match terrain {
            Some(t) => surfaces
                .dominant_layer(t, Vec3::from(hit.point))
                .and_then(|index| surfaces.layer_texture(t, index)),
            None => material.and_then(|m| surfaces.texture_of(m, &TEXTURE_SLOT_PRIORITY)),
        }
    } else {
        None
    };

    SurfaceTags { material, texture }
}

type LayerWeights = Box<dyn Fn(Vec3) -> usize>;

struct TerrainEntry {
    layers: Vec<TextureId>,
    dominant: LayerWeights,
}

/// Table-backed [`SurfaceCatalog`].
#[derive(Default)]
pub struct SurfaceRegistry {
    materials: HashMap<ColliderId, MaterialId>,
    slots: HashMap<MaterialId, HashMap<String, TextureId>>,
    terrain_colliders: HashMap<ColliderId, TerrainId>,
    terrains: HashMap<TerrainId, TerrainEntry>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `material` to `collider`.
    pub fn set_material(&mut self, collider: ColliderId, material: MaterialId) {
        self.materials.insert(collider, material);
    }

    /// Binds `texture` to the named slot of `material`.
    pub fn set_texture_slot(
        &mut self,
        material: MaterialId,
        slot: impl Into<String>,
        texture: TextureId,
    ) {
        self.slots
            .entry(material)
            .or_default()
            .insert(slot.into(), texture);
    }

    /// Registers `collider` as the terrain `terrain` with ordered layer textures and a
    /// function returning the dominant layer index at a world point.
    pub fn register_terrain<F>(
        &mut self,
        collider: ColliderId,
        terrain: TerrainId,
        layers: Vec<TextureId>,
        dominant: F,
    ) where
        F: Fn(Vec3) -> usize + 'static,
    {
        self.terrain_colliders.insert(collider, terrain);
        self.terrains.insert(
            terrain,
            TerrainEntry {
                layers,
                dominant: Box::new(dominant),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.materials.len() + self.terrain_colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("materials", &self.materials)
            .field("slots", &self.slots)
            .field("terrain_colliders", &self.terrain_colliders)
            .field("terrains", &self.terrains.len())
            .finish()
    }
}

impl SurfaceCatalog for SurfaceRegistry {
    fn material_of(&self, collider: ColliderId) -> Option<MaterialId> {
        self.materials.get(&collider).copied()
    }

    fn texture_of(&self, material: MaterialId, slots: &[&str]) -> Option<TextureId> {
        let bound = self.slots.get(&material)?;
        slots.iter().find_map(|slot| bound.get(*slot).copied())
    }

    fn terrain_of(&self, collider: ColliderId) -> Option<TerrainId> {
        self.terrain_colliders.get(&collider).copied()
    }

    fn dominant_layer(&self, terrain: TerrainId, point: Vec3) -> Option<usize> {
        self.terrains.get(&terrain).map(|t| (t.dominant)(point))
    }

    fn layer_texture(&self, terrain: TerrainId, index: usize) -> Option<TextureId> {
        self.terrains.get(&terrain)?.layers.get(index).copied()
    }
}
