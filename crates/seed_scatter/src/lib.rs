#![forbid(unsafe_code)]
//! seed_scatter: Surface-probing object scattering with spacing and slope rules.
//!
//! Modules:
//! - sampling: uniform draws, emitter shapes, coherent noise
//! - probe: scene raycast seam, surface tags, direct and marched probes
//! - scatter: species, occupancy, validation, runner, events, terrain export
//!
//! For examples and docs, see README and docs.rs.
pub mod error;
pub mod probe;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use seed_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::probe::collider::{InfinitePlane, SphereCollider};
    pub use crate::probe::scene::{ColliderId, EmptyScene, LayerMask, RayHit, SceneProbe};
    pub use crate::probe::surface::{
        MaterialId, SurfaceCatalog, SurfaceRegistry, SurfaceTags, TerrainId, TextureId,
    };
    pub use crate::probe::{MarchParams, ProbeMode, ProbeOutcome, SurfaceProber, TurbulenceKind};
    pub use crate::sampling::{CoherentNoise, ShapeConfig, ShapeSampler, SpawnShape};
    pub use crate::scatter::events::{
        EventSink, FnSink, MultiSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::host::{
        Instantiator, PlacementTransform, RecordedObject, RecordingInstantiator,
    };
    pub use crate::scatter::occupancy::{OccupancyField, SurfacePoint};
    pub use crate::scatter::plan::{Emitter, EmitterId, Plan};
    pub use crate::scatter::runner::{
        DebugLevel, Placement, PlacementFailure, RunConfig, RunResult, RunSummary, ScatterRunner,
        ScatterState, Scatterer,
    };
    pub use crate::scatter::selection::{select_species, MatchMode};
    pub use crate::scatter::species::{
        PrototypeId, RotationPolicy, ScalePolicy, Species, SpeciesCatalog, SpeciesId,
    };
    pub use crate::scatter::terrain::{
        export_terrain_instances, TerrainBounds, TerrainInstance, TerrainInstanceBatch,
    };
    pub use crate::scatter::validator::{try_reserve, Reservation};
}
