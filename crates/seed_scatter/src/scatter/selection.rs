//! Selection utilities for choosing a [crate::scatter::species::Species] for a surface point.
//!
//! This module provides the per-point species choice of a scatter run:
//! - [MatchMode::None]: uniform choice among every species in the catalog.
//! - [MatchMode::Material]: uniform choice among species accepting the point's material.
//! - [MatchMode::Texture]: uniform choice among species accepting the point's texture.
//!
//! Matching compares identities ([crate::probe::surface::MaterialId],
//! [crate::probe::surface::TextureId]) resolved when the point was probed; see
//! [crate::probe::surface::resolve_tags].
use rand::RngCore;

use crate::sampling::rand01;
use crate::scatter::occupancy::SurfacePoint;
use crate::scatter::species::SpeciesCatalog;

/// How species are matched against the surface a point lies on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    #[default]
    None,
    Material,
    Texture,
}

/// Picks one element of `candidates` uniformly. Consumes a draw only when non-empty.
pub fn pick_uniform<T: Copy>(candidates: &[T], rng: &mut dyn RngCore) -> Option<T> {
    if candidates.is_empty() {
        return None;
    }
    let idx = (rand01(rng) * candidates.len() as f32) as usize;
    candidates.get(idx.min(candidates.len() - 1)).copied()
}

/// Chooses the catalog index of the species to try at `point`, or `None` when no species fits.
pub fn select_species(
    catalog: &SpeciesCatalog,
    point: &SurfacePoint,
    mode: MatchMode,
    rng: &mut dyn RngCore,
) -> Option<usize> {
    let candidates: Vec<usize> = match mode {
        MatchMode::None => (0..catalog.len()).collect(),
        MatchMode::Material => {
            let material = point.material?;
            catalog
                .iter()
                .enumerate()
                .filter(|(_, s)| s.accepts_material(material))
                .map(|(i, _)| i)
                .collect()
        }
        MatchMode::Texture => {
            let texture = point.texture?;
            catalog
                .iter()
                .enumerate()
                .filter(|(_, s)| s.accepts_texture(texture))
                .map(|(i, _)| i)
                .collect()
        }
    };

    pick_uniform(&candidates, rng)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::probe::surface::{MaterialId, SurfaceTags, TextureId};
    use crate::scatter::species::{PrototypeId, Species};

    struct FixedRng {
        value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    fn species(id: &str) -> Species {
        Species::new(id, PrototypeId::new(id))
    }

    fn catalog() -> SpeciesCatalog {
        SpeciesCatalog::new()
            .with_species(
                species("a")
                    .with_materials([MaterialId(1)])
                    .with_textures([TextureId(10)]),
            )
            .with_species(
                species("b")
                    .with_materials([MaterialId(2)])
                    .with_textures([TextureId(10), TextureId(20)]),
            )
    }

    fn point(material: Option<u32>, texture: Option<u32>) -> SurfacePoint {
        SurfacePoint::new(Vec3::ZERO, Vec3::Y).with_tags(SurfaceTags {
            material: material.map(MaterialId),
            texture: texture.map(TextureId),
        })
    }

    #[test]
    fn pick_uniform_covers_extremes() {
        let items = [7, 8, 9];
        assert_eq!(pick_uniform(&items, &mut FixedRng { value: 0 }), Some(7));
        assert_eq!(
            pick_uniform(&items, &mut FixedRng { value: u32::MAX }),
            Some(9)
        );
        assert_eq!(pick_uniform::<u8>(&[], &mut FixedRng { value: 0 }), None);
    }

    #[test]
    fn no_match_mode_uses_whole_catalog() {
        let cat = catalog();
        let p = point(None, None);
        assert_eq!(
            select_species(&cat, &p, MatchMode::None, &mut FixedRng { value: 0 }),
            Some(0)
        );
        assert_eq!(
            select_species(&cat, &p, MatchMode::None, &mut FixedRng { value: u32::MAX }),
            Some(1)
        );
    }

    #[test]
    fn material_mode_never_crosses_materials() {
        let cat = catalog();
        let p = point(Some(2), None);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..64 {
            assert_eq!(select_species(&cat, &p, MatchMode::Material, &mut rng), Some(1));
        }
    }

    #[test]
    fn unresolved_or_unmatched_material_selects_nothing() {
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(
            select_species(&cat, &point(None, Some(10)), MatchMode::Material, &mut rng),
            None
        );
        assert_eq!(
            select_species(&cat, &point(Some(3), None), MatchMode::Material, &mut rng),
            None
        );
    }

    #[test]
    fn texture_mode_chooses_among_matches() {
        let cat = catalog();
        let shared = point(None, Some(10));
        assert_eq!(
            select_species(&cat, &shared, MatchMode::Texture, &mut FixedRng { value: 0 }),
            Some(0)
        );
        assert_eq!(
            select_species(
                &cat,
                &shared,
                MatchMode::Texture,
                &mut FixedRng { value: u32::MAX }
            ),
            Some(1)
        );

        let only_b = point(Some(1), Some(20));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(
                select_species(&cat, &only_b, MatchMode::Texture, &mut rng),
                Some(1)
            );
        }
        assert_eq!(
            select_species(&cat, &point(Some(1), None), MatchMode::Texture, &mut rng),
            None
        );
    }
}
