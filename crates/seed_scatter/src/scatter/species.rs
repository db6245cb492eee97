//! Species definitions and the catalog a scatter run draws from.
use std::collections::HashSet;

use glam::{Quat, Vec3};
use rand::RngCore;

use crate::error::{Error, Result};
use crate::probe::surface::{MaterialId, TextureId};
use crate::sampling::rand_range;

pub type SpeciesId = String;

/// Reference to the host-side prototype a species instantiates.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeId(pub String);

impl PrototypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rotation around world Y applied to a placed object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationPolicy {
    /// Fixed yaw in degrees.
    Fixed(f32),
    /// Random yaw in `[0, range)` degrees.
    Random { range: f32 },
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy::Fixed(0.0)
    }
}

impl RotationPolicy {
    /// Draws a yaw rotation. `Random` consumes one draw.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Quat {
        let degrees = match *self {
            RotationPolicy::Fixed(deg) => deg,
            RotationPolicy::Random { range } => rand_range(rng, 0.0, range),
        };
        Quat::from_rotation_y(degrees.to_radians())
    }
}

/// Scale applied to a placed object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ScalePolicy {
    /// Unit scale.
    #[default]
    None,
    /// Same random factor on all axes.
    Uniform { min: f32, max: f32 },
    /// Independent random factor per axis.
    PerAxis { min: Vec3, max: Vec3 },
}

impl ScalePolicy {
    /// Draws a scale. `Uniform` consumes one draw, `PerAxis` three.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        match *self {
            ScalePolicy::None => Vec3::ONE,
            ScalePolicy::Uniform { min, max } => Vec3::splat(rand_range(rng, min, max)),
            ScalePolicy::PerAxis { min, max } => Vec3::new(
                rand_range(rng, min.x, max.x),
                rand_range(rng, min.y, max.y),
                rand_range(rng, min.z, max.z),
            ),
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        match *self {
            ScalePolicy::None => Ok(()),
            ScalePolicy::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    Err("uniform scale range must be finite with min <= max")
                } else {
                    Ok(())
                }
            }
            ScalePolicy::PerAxis { min, max } => {
                if !min.is_finite() || !max.is_finite() || min.cmpgt(max).any() {
                    Err("per-axis scale range must be finite with min <= max")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A placeable object kind together with its placement rules.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    pub id: SpeciesId,
    pub prototype: PrototypeId,
    /// Offset added to the surface point when placing.
    pub offset: Vec3,
    pub rotation: RotationPolicy,
    pub scale: ScalePolicy,
    /// Occupied points closer than this count as neighbours.
    pub closest_allowed_neighbour: f32,
    /// Placement is rejected when more neighbours than this are found.
    pub maximum_neighbours: usize,
    /// Steepest surface angle in degrees, exclusive.
    pub max_angle: f32,
    /// Surface materials this species accepts in material match mode.
    pub materials: Vec<MaterialId>,
    /// Surface textures this species accepts in texture match mode.
    pub textures: Vec<TextureId>,
}

impl Species {
    pub fn new(id: impl Into<SpeciesId>, prototype: PrototypeId) -> Self {
        Self {
            id: id.into(),
            prototype,
            offset: Vec3::ZERO,
            rotation: RotationPolicy::default(),
            scale: ScalePolicy::default(),
            closest_allowed_neighbour: 0.0,
            maximum_neighbours: 10,
            max_angle: 90.0,
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: ScalePolicy) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the neighbour distance and the number of neighbours tolerated inside it.
    pub fn with_spacing(
        mut self,
        closest_allowed_neighbour: f32,
        maximum_neighbours: usize,
    ) -> Self {
        self.closest_allowed_neighbour = closest_allowed_neighbour;
        self.maximum_neighbours = maximum_neighbours;
        self
    }

    pub fn with_max_angle(mut self, max_angle: f32) -> Self {
        self.max_angle = max_angle;
        self
    }

    pub fn with_materials(mut self, materials: impl IntoIterator<Item = MaterialId>) -> Self {
        self.materials.extend(materials);
        self
    }

    pub fn with_textures(mut self, textures: impl IntoIterator<Item = TextureId>) -> Self {
        self.textures.extend(textures);
        self
    }

    pub fn accepts_material(&self, material: MaterialId) -> bool {
        self.materials.contains(&material)
    }

    pub fn accepts_texture(&self, texture: TextureId) -> bool {
        self.textures.contains(&texture)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::InvalidConfig(format!("species '{}': {msg}", self.id)));
        if !self.closest_allowed_neighbour.is_finite() || self.closest_allowed_neighbour < 0.0 {
            return fail("closest_allowed_neighbour must be >= 0");
        }
        if self.max_angle.is_nan() {
            return fail("max_angle must not be NaN");
        }
        if !self.offset.is_finite() {
            return fail("offset must be finite");
        }
        if let RotationPolicy::Fixed(v) | RotationPolicy::Random { range: v } = self.rotation {
            if !v.is_finite() {
                return fail("rotation must be finite");
            }
        }
        if let Err(msg) = self.scale.validate() {
            return fail(msg);
        }
        Ok(())
    }
}

/// Ordered set of species available to a scatter run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeciesCatalog {
    species: Vec<Species>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self {
            species: Vec::new(),
        }
    }

    pub fn with_species(mut self, species: Species) -> Self {
        self.species.push(species);
        self
    }

    pub fn push(&mut self, species: Species) {
        self.species.push(species);
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Species> {
        self.species.iter()
    }

    /// Checks the catalog is usable for a run: non-empty, unique ids, valid species.
    pub fn validate(&self) -> Result<()> {
        if self.species.is_empty() {
            return Err(Error::InvalidConfig("species catalog is empty".into()));
        }
        let mut seen = HashSet::with_capacity(self.species.len());
        for s in &self.species {
            if !seen.insert(s.id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate species id '{}'",
                    s.id
                )));
            }
            s.validate()?;
        }
        Ok(())
    }
}

impl FromIterator<Species> for SpeciesCatalog {
    fn from_iter<T: IntoIterator<Item = Species>>(iter: T) -> Self {
        Self {
            species: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SpeciesCatalog {
    type Item = &'a Species;
    type IntoIter = std::slice::Iter<'a, Species>;

    fn into_iter(self) -> Self::IntoIter {
        self.species.iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn species(id: &str) -> Species {
        Species::new(id, PrototypeId::new(format!("{id}.prefab")))
    }

    #[test]
    fn builder_sets_rules() {
        let s = species("fern")
            .with_offset(Vec3::new(0.0, -0.1, 0.0))
            .with_spacing(2.0, 3)
            .with_max_angle(35.0)
            .with_materials([MaterialId(1), MaterialId(2)])
            .with_textures([TextureId(9)]);
        assert_eq!(s.closest_allowed_neighbour, 2.0);
        assert_eq!(s.maximum_neighbours, 3);
        assert_eq!(s.max_angle, 35.0);
        assert!(s.accepts_material(MaterialId(2)));
        assert!(!s.accepts_material(MaterialId(3)));
        assert!(s.accepts_texture(TextureId(9)));
        assert_eq!(s.prototype.as_str(), "fern.prefab");
    }

    #[test]
    fn fixed_rotation_consumes_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = RotationPolicy::Fixed(90.0).sample(&mut rng);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn random_rotation_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..64 {
            let q = RotationPolicy::Random { range: 45.0 }.sample(&mut rng);
            let (axis, angle) = q.to_axis_angle();
            assert!(angle.to_degrees() < 45.0 + 1e-3);
            if angle > 1e-4 {
                assert!(axis.abs_diff_eq(Vec3::Y, 1e-4));
            }
        }
    }

    #[test]
    fn scale_policies_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ScalePolicy::None.sample(&mut rng), Vec3::ONE);

        let s = ScalePolicy::Uniform { min: 0.5, max: 1.5 }.sample(&mut rng);
        assert_eq!(s.x, s.y);
        assert_eq!(s.y, s.z);
        assert!((0.5..1.5).contains(&s.x));

        let min = Vec3::new(1.0, 2.0, 3.0);
        let max = Vec3::new(1.5, 2.5, 3.5);
        let s = ScalePolicy::PerAxis { min, max }.sample(&mut rng);
        assert!(s.cmpge(min).all() && s.cmplt(max).all());
    }

    #[test]
    fn catalog_validation() {
        assert!(SpeciesCatalog::new().validate().is_err());

        let dup: SpeciesCatalog = [species("a"), species("a")].into_iter().collect();
        assert!(dup.validate().is_err());

        let bad_spacing = SpeciesCatalog::new().with_species(species("a").with_spacing(-1.0, 0));
        assert!(bad_spacing.validate().is_err());

        let bad_scale = SpeciesCatalog::new().with_species(
            species("a").with_scale(ScalePolicy::Uniform { min: 2.0, max: 1.0 }),
        );
        assert!(bad_scale.validate().is_err());

        let ok = SpeciesCatalog::new()
            .with_species(species("a"))
            .with_species(species("b"));
        assert!(ok.validate().is_ok());
        assert_eq!(ok.find("b").map(|s| s.id.as_str()), Some("b"));
        assert!(ok.find("c").is_none());
    }
}
