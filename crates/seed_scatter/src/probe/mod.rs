//! Surface probing: turning an (origin, direction) pair into at most one surface point.
//!
//! Two probe modes are available:
//! - [`ProbeMode::Direct`]: a single straight raycast bounded by the emitter radius.
//! - [`ProbeMode::Marched`]: a particle stepped under gravity, wind and turbulence, with
//!   one bounded raycast per step segment. See [`MarchParams`].
//!
//! Scene geometry is reached through [`scene::SceneProbe`]; surface tags through
//! [`surface::SurfaceCatalog`].
use glam::Vec3;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::probe::scene::{LayerMask, SceneProbe};
use crate::probe::surface::{resolve_tags, SurfaceCatalog};
use crate::sampling::{rand01, rand_range, CoherentNoise};
use crate::scatter::occupancy::SurfacePoint;
use crate::scatter::selection::MatchMode;

pub mod collider;
pub mod scene;
pub mod surface;

/// Per-step advance along the noise domain for coherent turbulence.
const NOISE_FREQUENCY: f32 = 0.173;
/// Offset separating the X, Y and Z turbulence channels in the noise domain.
const AXIS_OFFSET: f32 = 31.7;
/// Range of per-probe offsets into the noise domain.
const NOISE_SEED_SPAN: f32 = 1024.0;

/// Source of the per-step turbulence vector.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurbulenceKind {
    /// Independent uniform draws per axis and step.
    #[default]
    Uniform,
    /// Smooth Perlin noise along the march.
    Coherent,
}

/// Parameters of a marched probe.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchParams {
    /// Distance unit of one march step. Must be > 0.
    pub step_distance: f32,
    /// Signed acceleration along world Y; negative pulls down.
    pub gravity: f32,
    pub wind: Vec3,
    pub turbulence: TurbulenceKind,
    /// Half-width of the uniform turbulence range.
    pub turbulence_magnitude: f32,
    /// Multiplier applied to the turbulence vector.
    pub turbulence_strength: f32,
}

impl Default for MarchParams {
    fn default() -> Self {
        Self {
            step_distance: 0.5,
            gravity: -9.81,
            wind: Vec3::ZERO,
            turbulence: TurbulenceKind::Uniform,
            turbulence_magnitude: 0.0,
            turbulence_strength: 1.0,
        }
    }
}

impl MarchParams {
    pub fn new(step_distance: f32) -> Self {
        Self {
            step_distance,
            ..Default::default()
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_wind(mut self, wind: Vec3) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_turbulence(mut self, kind: TurbulenceKind, magnitude: f32, strength: f32) -> Self {
        self.turbulence = kind;
        self.turbulence_magnitude = magnitude;
        self.turbulence_strength = strength;
        self
    }

    /// Number of steps a probe of the given radius may take.
    pub fn step_budget(&self, radius: f32) -> usize {
        if self.step_distance <= 0.0 || !radius.is_finite() || radius <= 0.0 {
            return 0;
        }
        (radius / self.step_distance).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_distance.is_finite() || self.step_distance <= 0.0 {
            return Err(Error::InvalidConfig("step_distance must be > 0".into()));
        }
        if !self.gravity.is_finite() || !self.wind.is_finite() {
            return Err(Error::InvalidConfig("gravity and wind must be finite".into()));
        }
        if !self.turbulence_magnitude.is_finite() || self.turbulence_magnitude < 0.0 {
            return Err(Error::InvalidConfig("turbulence_magnitude must be >= 0".into()));
        }
        if !self.turbulence_strength.is_finite() {
            return Err(Error::InvalidConfig("turbulence_strength must be finite".into()));
        }
        Ok(())
    }
}

/// How a probe searches for a surface.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ProbeMode {
    /// Straight raycast with max distance equal to the shape radius.
    #[default]
    Direct,
    Marched(MarchParams),
}

impl ProbeMode {
    pub fn validate(&self) -> Result<()> {
        match self {
            ProbeMode::Direct => Ok(()),
            ProbeMode::Marched(params) => params.validate(),
        }
    }
}

/// What a single probe produced.
#[derive(Clone, Debug, Default)]
pub struct ProbeOutcome {
    pub point: Option<SurfacePoint>,
    /// Number of raycasts issued against the scene.
    pub queries: usize,
    /// Vertices of the probe path, origin first. Empty unless tracing was requested.
    pub path: Vec<Vec3>,
}

/// Probes the scene for surface points.
pub struct SurfaceProber<'a> {
    pub scene: &'a dyn SceneProbe,
    pub surfaces: &'a dyn SurfaceCatalog,
    pub layers: LayerMask,
    /// Decides which surface tags are resolved on hit.
    pub match_mode: MatchMode,
    pub noise: &'a CoherentNoise,
    /// Record probe paths in [`ProbeOutcome::path`].
    pub trace: bool,
}

impl<'a> SurfaceProber<'a> {
    pub fn new(
        scene: &'a dyn SceneProbe,
        surfaces: &'a dyn SurfaceCatalog,
        noise: &'a CoherentNoise,
    ) -> Self {
        Self {
            scene,
            surfaces,
            layers: LayerMask::ALL,
            match_mode: MatchMode::None,
            noise,
            trace: false,
        }
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Runs one probe from `origin` along the unit `direction`, bounded by `radius`.
    pub fn probe(
        &self,
        mode: &ProbeMode,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> ProbeOutcome {
        match mode {
            ProbeMode::Direct => self.direct(origin, direction, radius),
            ProbeMode::Marched(params) => self.marched(params, origin, direction, radius, rng),
        }
    }

    fn direct(&self, origin: Vec3, direction: Vec3, radius: f32) -> ProbeOutcome {
        let hit = self
            .scene
            .raycast(origin.into(), direction.into(), radius, self.layers);

        let mut outcome = ProbeOutcome {
            queries: 1,
            ..Default::default()
        };
        if self.trace {
            let end = hit
                .map(|h| Vec3::from(h.point))
                .unwrap_or(origin + direction * radius);
            outcome.path = vec![origin, end];
        }
        outcome.point = hit.map(|h| {
            SurfacePoint::from_hit(&h, resolve_tags(&h, self.surfaces, self.match_mode))
        });
        outcome
    }

    fn marched(
        &self,
        params: &MarchParams,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        let budget = params.step_budget(radius);
        if self.trace {
            outcome.path.push(origin);
        }
        if budget == 0 {
            return outcome;
        }

        let step = params.step_distance;
        let blend = step / budget as f32;
        let gravity = Vec3::new(0.0, params.gravity, 0.0);
        let seed = match params.turbulence {
            TurbulenceKind::Coherent => rand01(rng) * NOISE_SEED_SPAN,
            TurbulenceKind::Uniform => 0.0,
        };

        let mut position = origin;
        let mut velocity = direction * step;
        let mut wind_velocity = params.wind * 0.01;

        for i in 0..budget {
            wind_velocity += params.wind * 0.01 * step;
            let turbulence = self.turbulence(params, seed, i, rng);
            wind_velocity += turbulence;
            velocity += (gravity + turbulence) * blend + wind_velocity * blend;

            let next = position + velocity * step;
            let segment = next - position;
            let length = segment.length();
            if length > f32::EPSILON && length.is_finite() {
                outcome.queries += 1;
                let dir = segment / length;
                if let Some(hit) = self
                    .scene
                    .raycast(position.into(), dir.into(), length, self.layers)
                {
                    if self.trace {
                        outcome.path.push(Vec3::from(hit.point));
                    }
                    let tags = resolve_tags(&hit, self.surfaces, self.match_mode);
                    outcome.point = Some(SurfacePoint::from_hit(&hit, tags));
                    return outcome;
                }
            }

            if self.trace {
                outcome.path.push(next);
            }
            position = next;
        }

        outcome
    }

    fn turbulence(
        &self,
        params: &MarchParams,
        seed: f32,
        step_index: usize,
        rng: &mut dyn RngCore,
    ) -> Vec3 {
        let strength = params.turbulence_strength;
        match params.turbulence {
            TurbulenceKind::Uniform => {
                let m = params.turbulence_magnitude;
                Vec3::new(
                    rand_range(rng, -m, m),
                    rand_range(rng, -m, m),
                    rand_range(rng, -m, m),
                ) * strength
            }
            TurbulenceKind::Coherent => {
                let t = step_index as f32 * NOISE_FREQUENCY;
                let channel = |axis: f32| {
                    let offset = axis * AXIS_OFFSET;
                    self.noise
                        .sample(Vec3::new(seed + t + offset, seed * 0.5 + offset, t))
                };
                Vec3::new(channel(0.0), channel(1.0), channel(2.0)) * strength
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use mint::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::probe::collider::InfinitePlane;
    use crate::probe::scene::{ColliderId, EmptyScene, RayHit};
    use crate::probe::surface::{MaterialId, SurfaceRegistry};

    struct CountingScene<P> {
        inner: P,
        calls: Cell<usize>,
    }

    impl<P: SceneProbe> CountingScene<P> {
        fn new(inner: P) -> Self {
            Self {
                inner,
                calls: Cell::new(0),
            }
        }
    }

    impl<P: SceneProbe> SceneProbe for CountingScene<P> {
        fn raycast(
            &self,
            origin: Vector3<f32>,
            direction: Vector3<f32>,
            max_distance: f32,
            layers: LayerMask,
        ) -> Option<RayHit> {
            self.calls.set(self.calls.get() + 1);
            self.inner.raycast(origin, direction, max_distance, layers)
        }
    }

    fn noise() -> CoherentNoise {
        CoherentNoise::new(1)
    }

    #[test]
    fn direct_hit_produces_point_with_angle_and_material() {
        let ground = InfinitePlane::ground(0.0, ColliderId(3));
        let mut surfaces = SurfaceRegistry::new();
        surfaces.set_material(ColliderId(3), MaterialId(8));
        let noise = noise();
        let prober =
            SurfaceProber::new(&ground, &surfaces, &noise).with_match_mode(MatchMode::Material);
        let mut rng = StdRng::seed_from_u64(1);

        let out = prober.probe(
            &ProbeMode::Direct,
            Vec3::new(2.0, 4.0, 0.0),
            Vec3::NEG_Y,
            5.0,
            &mut rng,
        );
        let point = out.point.expect("hit");
        assert_eq!(out.queries, 1);
        assert_eq!(point.position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(point.angle, 0.0);
        assert!(!point.occupied);
        assert_eq!(point.material, Some(MaterialId(8)));
    }

    #[test]
    fn direct_cast_is_bounded_by_radius() {
        let ground = InfinitePlane::ground(0.0, ColliderId(3));
        let noise = noise();
        let prober = SurfaceProber::new(&ground, &(), &noise);
        let mut rng = StdRng::seed_from_u64(1);
        let out = prober.probe(
            &ProbeMode::Direct,
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::NEG_Y,
            3.0,
            &mut rng,
        );
        assert!(out.point.is_none());
        assert_eq!(out.queries, 1);
    }

    #[test]
    fn march_budget_limits_queries() {
        let scene = CountingScene::new(EmptyScene);
        let noise = noise();
        let prober = SurfaceProber::new(&scene, &(), &noise);
        let mut rng = StdRng::seed_from_u64(2);
        let mode = ProbeMode::Marched(MarchParams::new(1.0));

        let out = prober.probe(&mode, Vec3::ZERO, Vec3::NEG_Y, 10.0, &mut rng);
        assert!(out.point.is_none());
        assert_eq!(out.queries, 10);
        assert_eq!(scene.calls.get(), 10);
        assert_eq!(MarchParams::new(1.0).step_budget(10.0), 10);
    }

    #[test]
    fn turbulence_stays_within_scaled_magnitude() {
        let noise = noise();
        let prober = SurfaceProber::new(&EmptyScene, &(), &noise);
        let mut rng = StdRng::seed_from_u64(9);
        let bound = 0.3 * 0.5;

        let uniform = MarchParams::new(1.0).with_turbulence(TurbulenceKind::Uniform, 0.3, 0.5);
        let mut largest = 0.0f32;
        for i in 0..2_000 {
            let v = prober.turbulence(&uniform, 0.0, i, &mut rng);
            assert!(v.abs().max_element() <= bound, "{v:?} exceeds {bound}");
            largest = largest.max(v.abs().max_element());
        }
        assert!(largest > bound * 0.9);

        let coherent = MarchParams::new(1.0).with_turbulence(TurbulenceKind::Coherent, 0.0, 0.5);
        for i in 0..200 {
            let v = prober.turbulence(&coherent, 17.0, i, &mut rng);
            assert!(v.abs().max_element() <= 0.5);
        }
    }

    #[test]
    fn march_with_no_budget_issues_no_queries() {
        let scene = CountingScene::new(EmptyScene);
        let noise = noise();
        let prober = SurfaceProber::new(&scene, &(), &noise);
        let mut rng = StdRng::seed_from_u64(2);
        let mode = ProbeMode::Marched(MarchParams::new(2.0));
        let out = prober.probe(&mode, Vec3::ZERO, Vec3::NEG_Y, 1.5, &mut rng);
        assert_eq!(out.queries, 0);
        assert_eq!(scene.calls.get(), 0);
    }

    #[test]
    fn gravity_bends_sideways_probe_onto_ground() {
        let ground = InfinitePlane::ground(0.0, ColliderId(1));
        let noise = noise();
        let prober = SurfaceProber::new(&ground, &(), &noise).with_trace(true);
        let mut rng = StdRng::seed_from_u64(3);
        let mode = ProbeMode::Marched(MarchParams::new(1.0).with_gravity(-9.81));

        // A horizontal direct cast would never reach the ground.
        let direct = prober.probe(
            &ProbeMode::Direct,
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::X,
            20.0,
            &mut rng,
        );
        assert!(direct.point.is_none());

        let out = prober.probe(&mode, Vec3::new(0.0, 2.0, 0.0), Vec3::X, 20.0, &mut rng);
        let point = out.point.expect("gravity should pull the probe down");
        assert!(point.position.y.abs() < 1e-4);
        assert!(point.position.x > 0.0);
        assert_eq!(out.path.first(), Some(&Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(out.path.len(), out.queries + 1);
    }

    #[test]
    fn wind_pushes_probe_downwind() {
        let ground = InfinitePlane::ground(0.0, ColliderId(1));
        let noise = noise();
        let prober = SurfaceProber::new(&ground, &(), &noise);
        let params = MarchParams::new(0.5)
            .with_gravity(-2.0)
            .with_wind(Vec3::new(0.0, 0.0, 40.0));
        let mut rng = StdRng::seed_from_u64(4);
        let out = prober.probe(
            &ProbeMode::Marched(params),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::NEG_Y,
            30.0,
            &mut rng,
        );
        let point = out.point.expect("hit");
        assert!(point.position.z > 0.0);
    }

    #[test]
    fn marched_probes_are_deterministic_per_seed() {
        let ground = InfinitePlane::ground(0.0, ColliderId(1));
        let noise = noise();
        let prober = SurfaceProber::new(&ground, &(), &noise);
        for kind in [TurbulenceKind::Uniform, TurbulenceKind::Coherent] {
            let params = MarchParams::new(0.5).with_turbulence(kind, 0.5, 2.0);
            let mode = ProbeMode::Marched(params);
            let run = |seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                prober
                    .probe(&mode, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 40.0, &mut rng)
                    .point
                    .map(|p| p.position)
            };
            assert_eq!(run(9), run(9));
        }
    }

    #[test]
    fn march_params_validation() {
        assert!(MarchParams::new(0.0).validate().is_err());
        assert!(MarchParams::new(-1.0).validate().is_err());
        assert!(MarchParams::new(1.0)
            .with_turbulence(TurbulenceKind::Uniform, -0.1, 1.0)
            .validate()
            .is_err());
        assert!(MarchParams::new(1.0)
            .with_wind(Vec3::new(f32::NAN, 0.0, 0.0))
            .validate()
            .is_err());
        assert!(ProbeMode::Marched(MarchParams::default()).validate().is_ok());
        assert!(ProbeMode::Direct.validate().is_ok());
    }
}
