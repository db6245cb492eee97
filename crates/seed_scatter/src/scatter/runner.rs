//! High-level runner that generates surface points and populates them with species.
//!
//! A run goes through three states (see [`ScatterState`]):
//! 1. the previous run's objects are destroyed,
//! 2. `max_positions` probes fill a fresh [`OccupancyField`],
//! 3. `population_passes` passes walk the field in discovery order and commit species.
//!
//! Each point's select, validate and commit sequence finishes before the next point is
//! looked at, so validation always sees every earlier commitment.
use glam::{Quat, Vec3};
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::probe::scene::{LayerMask, SceneProbe};
use crate::probe::surface::SurfaceCatalog;
use crate::probe::SurfaceProber;
use crate::sampling::CoherentNoise;
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::host::{Instantiator, PlacementTransform};
use crate::scatter::occupancy::{OccupancyField, SurfacePoint};
use crate::scatter::plan::Plan;
use crate::scatter::selection::{select_species, MatchMode};
use crate::scatter::species::{PrototypeId, Species, SpeciesId};
use crate::scatter::validator::try_reserve;

/// How much debug output the caller wants to draw. The runner itself does not branch on it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DebugLevel {
    #[default]
    Off,
    /// Probe rays and hits.
    Rays,
    /// Rays plus rejected placements.
    Verbose,
}

/// Configuration for running a scatter plan.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Number of probes issued during position generation.
    pub max_positions: usize,
    /// Number of population passes over the discovered points.
    pub population_passes: usize,
    /// Tilt placed objects so their up axis follows the surface normal.
    pub align_to_surface: bool,
    /// How species are matched against surfaces.
    pub match_mode: MatchMode,
    /// Collision layers probes may hit.
    pub layers: LayerMask,
    /// Seed of the coherent turbulence noise.
    pub noise_seed: u32,
    pub debug: DebugLevel,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_positions: 1,
            population_passes: 1,
            align_to_surface: false,
            match_mode: MatchMode::None,
            layers: LayerMask::ALL,
            noise_seed: 0,
            debug: DebugLevel::Off,
        }
    }
}

impl RunConfig {
    /// Creates a new [`RunConfig`] issuing `max_positions` probes.
    pub fn new(max_positions: usize) -> Self {
        Self {
            max_positions,
            ..Default::default()
        }
    }

    /// Sets the number of population passes.
    pub fn with_population_passes(mut self, passes: usize) -> Self {
        self.population_passes = passes;
        self
    }

    /// Enables or disables alignment to the surface normal.
    pub fn with_align_to_surface(mut self, align: bool) -> Self {
        self.align_to_surface = align;
        self
    }

    /// Sets the surface match mode.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Sets the layers probes may hit.
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Sets the coherent noise seed.
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = seed;
        self
    }

    /// Sets the debug level reported back to the caller.
    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_positions == 0 {
            return Err(Error::InvalidConfig("max_positions must be > 0".into()));
        }
        if self.population_passes == 0 {
            return Err(Error::InvalidConfig("population_passes must be > 0".into()));
        }
        Ok(())
    }
}

/// A species committed to a surface point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Index of the surface point in the run's [`OccupancyField`].
    pub point_index: usize,
    pub species_id: SpeciesId,
    pub prototype: PrototypeId,
    pub transform: PlacementTransform,
    /// Population pass that committed it.
    pub pass: usize,
}

/// A placement the host could not carry out.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementFailure {
    pub point_index: usize,
    pub species_id: SpeciesId,
    pub prototype: PrototypeId,
    pub message: String,
}

/// Counters describing a finished run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub positions_attempted: usize,
    pub points_found: usize,
    pub placed: usize,
    pub failed: usize,
    pub unoccupied: usize,
}

/// Result of running a scatter plan. Owns the run's occupancy field.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub field: OccupancyField,
    pub placements: Vec<Placement>,
    pub failures: Vec<PlacementFailure>,
    pub positions_attempted: usize,
}

impl RunResult {
    /// Points left without a species.
    pub fn unoccupied(&self) -> usize {
        self.field.unoccupied_count()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            positions_attempted: self.positions_attempted,
            points_found: self.field.len(),
            placed: self.placements.len(),
            failed: self.failures.len(),
            unoccupied: self.unoccupied(),
        }
    }
}

/// Phase a [`Scatterer`] is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScatterState {
    #[default]
    Idle,
    GeneratingPositions,
    PopulatingObjects,
}

/// Runs scatter plans against a host scene and owns the objects it created.
pub struct ScatterRunner<I: Instantiator> {
    instantiator: I,
    spawned: Vec<I::Handle>,
    state: ScatterState,
}

/// The orchestrator of a scatter run.
pub type Scatterer<I> = ScatterRunner<I>;

impl<I: Instantiator> ScatterRunner<I> {
    pub fn new(instantiator: I) -> Self {
        Self {
            instantiator,
            spawned: Vec::new(),
            state: ScatterState::Idle,
        }
    }

    pub fn state(&self) -> ScatterState {
        self.state
    }

    /// Number of objects created by the last run that are still alive.
    pub fn live_objects(&self) -> usize {
        self.spawned.len()
    }

    pub fn instantiator(&self) -> &I {
        &self.instantiator
    }

    pub fn instantiator_mut(&mut self) -> &mut I {
        &mut self.instantiator
    }

    /// Consumes the runner and returns the instantiator. Live objects are left in place.
    pub fn into_inner(self) -> I {
        self.instantiator
    }

    /// Destroys every object created by earlier runs. Returns how many were destroyed.
    pub fn clear(&mut self) -> usize {
        self.clear_with_events(&mut ())
    }

    pub fn clear_with_events(&mut self, sink: &mut dyn EventSink) -> usize {
        let destroyed = self.spawned.len();
        for handle in self.spawned.drain(..) {
            self.instantiator.destroy(handle);
        }
        self.state = ScatterState::Idle;
        if sink.wants(ScatterEventKind::Cleared) {
            sink.send(ScatterEvent::Cleared { destroyed });
        }
        destroyed
    }

    /// Runs `plan`: clears the previous run, generates surface points and populates them.
    pub fn scatter(
        &mut self,
        plan: &Plan,
        config: &RunConfig,
        scene: &dyn SceneProbe,
        surfaces: &dyn SurfaceCatalog,
        rng: &mut impl RngCore,
    ) -> Result<RunResult> {
        self.scatter_with_events(plan, config, scene, surfaces, rng, &mut ())
    }

    pub fn scatter_with_events(
        &mut self,
        plan: &Plan,
        config: &RunConfig,
        scene: &dyn SceneProbe,
        surfaces: &dyn SurfaceCatalog,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<RunResult> {
        plan.validate()?;
        config.validate()?;

        info!(
            "Scatter '{}': {} positions, {} passes, {} species.",
            plan.emitter.id, config.max_positions, config.population_passes, plan.catalog.len()
        );
        if sink.wants(ScatterEventKind::RunStarted) {
            sink.send(ScatterEvent::RunStarted {
                emitter_id: plan.emitter.id.clone(),
                config: config.clone(),
                species_count: plan.catalog.len(),
            });
        }

        self.clear_with_events(sink);

        self.state = ScatterState::GeneratingPositions;
        let noise = CoherentNoise::new(config.noise_seed);
        let prober = SurfaceProber::new(scene, surfaces, &noise)
            .with_layers(config.layers)
            .with_match_mode(config.match_mode)
            .with_trace(sink.wants(ScatterEventKind::ProbeTraced));
        let mut field = generate_positions(plan, config, &prober, &mut *rng, sink);

        self.state = ScatterState::PopulatingObjects;
        let (placements, failures) = self.populate(plan, config, &mut field, &mut *rng, sink);

        self.state = ScatterState::Idle;
        let result = RunResult {
            field,
            placements,
            failures,
            positions_attempted: config.max_positions,
        };
        let summary = result.summary();
        info!(
            "Scatter '{}' finished: {} points, {} placed, {} failed, {} unoccupied.",
            plan.emitter.id,
            summary.points_found,
            summary.placed,
            summary.failed,
            summary.unoccupied
        );
        if sink.wants(ScatterEventKind::RunFinished) {
            sink.send(ScatterEvent::RunFinished { summary });
        }

        Ok(result)
    }

    fn populate(
        &mut self,
        plan: &Plan,
        config: &RunConfig,
        field: &mut OccupancyField,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> (Vec<Placement>, Vec<PlacementFailure>) {
        let mut placements = Vec::new();
        let mut failures = Vec::new();

        for pass in 0..config.population_passes {
            if sink.wants(ScatterEventKind::PassStarted) {
                sink.send(ScatterEvent::PassStarted { pass });
            }
            let before = placements.len();

            for index in 0..field.len() {
                let Some(point) = field.get(index).copied() else {
                    break;
                };
                if point.occupied {
                    continue;
                }
                let Some(species) = select_species(&plan.catalog, &point, config.match_mode, rng)
                    .and_then(|i| plan.catalog.get(i))
                else {
                    continue;
                };

                let reservation = try_reserve(field, index, species);
                if !reservation.is_accepted() {
                    if sink.wants(ScatterEventKind::PlacementRejected) {
                        sink.send(ScatterEvent::PlacementRejected {
                            pass,
                            point_index: index,
                            species_id: species.id.clone(),
                            reason: reservation,
                        });
                    }
                    continue;
                }

                let transform = placement_transform(&point, species, config.align_to_surface, rng);
                match self.commit(plan, species, &transform) {
                    Ok(()) => {
                        field.mark_occupied(index);
                        let placement = Placement {
                            point_index: index,
                            species_id: species.id.clone(),
                            prototype: species.prototype.clone(),
                            transform,
                            pass,
                        };
                        debug!(
                            "Placed '{}' at {:?} (pass {}).",
                            species.id, transform.position, pass
                        );
                        if sink.wants(ScatterEventKind::PlacementMade) {
                            sink.send(ScatterEvent::PlacementMade {
                                pass,
                                placement: placement.clone(),
                            });
                        }
                        placements.push(placement);
                    }
                    Err(e) => {
                        warn!("Failed to place '{}' at point {}: {}.", species.id, index, e);
                        let failure = PlacementFailure {
                            point_index: index,
                            species_id: species.id.clone(),
                            prototype: species.prototype.clone(),
                            message: e.to_string(),
                        };
                        if sink.wants(ScatterEventKind::PlacementFailed) {
                            sink.send(ScatterEvent::PlacementFailed {
                                pass,
                                failure: failure.clone(),
                            });
                        }
                        failures.push(failure);
                    }
                }
            }

            let placed = placements.len() - before;
            let unoccupied = field.unoccupied_count();
            debug!("Pass {}: {} placed, {} unoccupied.", pass, placed, unoccupied);
            if sink.wants(ScatterEventKind::PassFinished) {
                sink.send(ScatterEvent::PassFinished {
                    pass,
                    placed,
                    unoccupied,
                });
            }
        }

        (placements, failures)
    }

    /// Creates, places and parents one object. On failure nothing is left behind.
    fn commit(
        &mut self,
        plan: &Plan,
        species: &Species,
        transform: &PlacementTransform,
    ) -> Result<()> {
        let handle = self.instantiator.instantiate(&species.prototype)?;
        let placed = self
            .instantiator
            .set_transform(&handle, transform)
            .and_then(|()| self.instantiator.set_parent(&handle, &plan.emitter.id));
        match placed {
            Ok(()) => {
                self.spawned.push(handle);
                Ok(())
            }
            Err(e) => {
                self.instantiator.destroy(handle);
                Err(e)
            }
        }
    }
}

/// Runs `config.max_positions` probes from the plan's emitter into a fresh field.
pub fn generate_positions(
    plan: &Plan,
    config: &RunConfig,
    prober: &SurfaceProber<'_>,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> OccupancyField {
    let sampler = plan.emitter.sampler();
    let radius = plan.emitter.shape.radius;
    let mut field = OccupancyField::with_capacity(config.max_positions.min(4096));

    for index in 0..config.max_positions {
        let origin = sampler.sample_origin(rng);
        let direction = sampler.sample_direction(rng);
        let outcome = prober.probe(&plan.emitter.probe, origin, direction, radius, rng);

        if sink.wants(ScatterEventKind::ProbeTraced) {
            sink.send(ScatterEvent::ProbeTraced {
                index,
                origin,
                path: outcome.path,
                hit: outcome.point.map(|p| p.position),
            });
        }
        if let Some(point) = outcome.point {
            field.push(point);
        }
    }

    if field.is_empty() {
        warn!(
            "Emitter '{}' found no surfaces in {} probes.",
            plan.emitter.id, config.max_positions
        );
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: format!("emitter:{}", plan.emitter.id),
                message: "No surface points found".into(),
            });
        }
    }
    if sink.wants(ScatterEventKind::PositionsGenerated) {
        sink.send(ScatterEvent::PositionsGenerated {
            attempted: config.max_positions,
            found: field.len(),
        });
    }

    field
}

/// Computes the world transform for `species` at `point`.
///
/// Yaw is drawn before scale. With alignment on, the yawed object is tilted so its up
/// axis follows the surface normal.
pub fn placement_transform(
    point: &SurfacePoint,
    species: &Species,
    align_to_surface: bool,
    rng: &mut dyn RngCore,
) -> PlacementTransform {
    let yaw = species.rotation.sample(rng);
    let scale = species.scale.sample(rng);
    let rotation = if align_to_surface && point.normal != Vec3::ZERO {
        Quat::from_rotation_arc(Vec3::Y, point.normal) * yaw
    } else {
        yaw
    };

    PlacementTransform {
        position: point.position + species.offset,
        rotation,
        scale,
    }
}
