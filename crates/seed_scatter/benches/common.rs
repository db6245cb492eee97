#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec3;
use seed_scatter::prelude::{ColliderId, InfinitePlane, SceneProbe, SphereCollider};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Ground plane with a ring of boulders, enough to give probes something to miss.
pub fn boulder_field(boulders: usize) -> Vec<Box<dyn SceneProbe>> {
    let mut scene: Vec<Box<dyn SceneProbe>> =
        vec![Box::new(InfinitePlane::ground(0.0, ColliderId(0)))];
    for i in 0..boulders {
        let angle = i as f32 / boulders.max(1) as f32 * std::f32::consts::TAU;
        let center = Vec3::new(angle.cos() * 12.0, 0.5, angle.sin() * 12.0);
        scene.push(Box::new(SphereCollider::new(
            center,
            1.5,
            ColliderId(i as u64 + 1),
        )));
    }
    scene
}
