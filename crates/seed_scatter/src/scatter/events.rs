//! Event types and sinks for observing scatter runs.
//!
//! This module defines [`ScatterEvent`] and a set of sinks to emit, collect, or
//! forward events while executing a [`crate::scatter::plan::Plan`] via
//! [`crate::scatter::runner::Scatterer::scatter_with_events`]. Probe traces carry the
//! full probe path and are meant for debug drawing on the caller's side.
use glam::Vec3;

use crate::scatter::plan::EmitterId;
use crate::scatter::runner::{Placement, PlacementFailure, RunConfig, RunSummary};
use crate::scatter::species::SpeciesId;
use crate::scatter::validator::Reservation;

/// Describes events emitted by scatter operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ScatterEvent {
    /// Emitted once the plan and config passed validation.
    RunStarted {
        /// Emitter being scattered from.
        emitter_id: EmitterId,
        /// The run configuration used.
        config: RunConfig,
        /// Number of species in the catalog.
        species_count: usize,
    },

    /// Emitted after every probe of the generation phase.
    ProbeTraced {
        /// Index of the probe in `0..max_positions`.
        index: usize,
        origin: Vec3,
        /// Probe path vertices, origin first.
        path: Vec<Vec3>,
        /// Surface position found, if any.
        hit: Option<Vec3>,
    },

    /// Emitted when position generation finished.
    PositionsGenerated {
        /// Probes issued.
        attempted: usize,
        /// Surface points discovered.
        found: usize,
    },

    /// Emitted when a population pass starts.
    PassStarted {
        /// Zero-based pass index.
        pass: usize,
    },

    /// Emitted when a species was committed to a point.
    PlacementMade {
        pass: usize,
        placement: Placement,
    },

    /// Emitted when validation turned a selected species away.
    PlacementRejected {
        pass: usize,
        point_index: usize,
        species_id: SpeciesId,
        reason: Reservation,
    },

    /// Emitted when the host failed to create or place an object.
    PlacementFailed {
        pass: usize,
        failure: PlacementFailure,
    },

    /// Emitted when a population pass finishes.
    PassFinished {
        pass: usize,
        /// Placements committed during this pass.
        placed: usize,
        /// Points still free after this pass.
        unoccupied: usize,
    },

    /// Emitted when the run finishes.
    RunFinished {
        summary: RunSummary,
    },

    /// Emitted after previously placed objects were destroyed.
    Cleared {
        destroyed: usize,
    },

    /// Non-fatal warning generated during scatter.
    Warning {
        /// Context string (e.g. emitter id, pass).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`ScatterEvent`], used by sinks to opt in or out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    RunStarted,
    ProbeTraced,
    PositionsGenerated,
    PassStarted,
    PlacementMade,
    PlacementRejected,
    PlacementFailed,
    PassFinished,
    RunFinished,
    Cleared,
    Warning,
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::RunStarted { .. } => ScatterEventKind::RunStarted,
            ScatterEvent::ProbeTraced { .. } => ScatterEventKind::ProbeTraced,
            ScatterEvent::PositionsGenerated { .. } => ScatterEventKind::PositionsGenerated,
            ScatterEvent::PassStarted { .. } => ScatterEventKind::PassStarted,
            ScatterEvent::PlacementMade { .. } => ScatterEventKind::PlacementMade,
            ScatterEvent::PlacementRejected { .. } => ScatterEventKind::PlacementRejected,
            ScatterEvent::PlacementFailed { .. } => ScatterEventKind::PlacementFailed,
            ScatterEvent::PassFinished { .. } => ScatterEventKind::PassFinished,
            ScatterEvent::RunFinished { .. } => ScatterEventKind::RunFinished,
            ScatterEvent::Cleared { .. } => ScatterEventKind::Cleared,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = ScatterEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
    only: Option<Vec<ScatterEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collects only events of the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = ScatterEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: ScatterEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
