//! Planning module for defining emitters and scatter plans.
use glam::{Quat, Vec3};

use crate::error::Result;
use crate::probe::ProbeMode;
use crate::sampling::{ShapeConfig, ShapeSampler};
use crate::scatter::species::{Species, SpeciesCatalog};

pub type EmitterId = String;

/// Where probes come from and how they travel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    /// Identifier; placed objects are parented to it.
    pub id: EmitterId,
    /// World-space anchor of the emitter shape.
    pub anchor: Vec3,
    /// Orientation of the emitter's local frame.
    pub orientation: Quat,
    pub shape: ShapeConfig,
    pub probe: ProbeMode,
}

impl Emitter {
    /// Create a new emitter with required fields.
    pub fn new(id: impl Into<EmitterId>, anchor: Vec3, shape: ShapeConfig) -> Self {
        Self {
            id: id.into(),
            anchor,
            orientation: Quat::IDENTITY,
            shape,
            probe: ProbeMode::Direct,
        }
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_probe(mut self, probe: ProbeMode) -> Self {
        self.probe = probe;
        self
    }

    /// Shape sampler positioned at this emitter.
    pub fn sampler(&self) -> ShapeSampler {
        ShapeSampler::new(self.anchor, self.orientation, self.shape)
    }

    pub fn validate(&self) -> Result<()> {
        self.shape.validate()?;
        self.probe.validate()
    }
}

/// An emitter together with the species it scatters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub emitter: Emitter,
    pub catalog: SpeciesCatalog,
}

impl Plan {
    /// Create a new plan with an empty catalog.
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            catalog: SpeciesCatalog::new(),
        }
    }

    /// Add a single species to the plan.
    pub fn with_species(mut self, species: Species) -> Self {
        self.catalog.push(species);
        self
    }

    /// Replace the catalog.
    pub fn with_catalog(mut self, catalog: SpeciesCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.emitter.validate()?;
        self.catalog.validate()
    }
}
