use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use seed_scatter::prelude::{DebugLevel, RunResult, ScatterEvent};

use crate::Heightfield;

const RAY_COLOR: [u8; 3] = [170, 170, 190];
const HIT_COLOR: [u8; 3] = [90, 90, 110];
const FREE_COLOR: [u8; 3] = [120, 120, 120];
const REJECT_COLOR: [u8; 3] = [220, 40, 40];

/// How a species is drawn.
#[derive(Clone, Copy, Debug)]
pub struct SpeciesStyle {
    pub color: [u8; 3],
    pub radius: i32,
}

/// Top-down view over the world X/Z plane.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub center: Vec2,
    pub extent: Vec2,
    pub background: [u8; 3],
    pub debug: DebugLevel,
    styles: HashMap<String, SpeciesStyle>,
    ground: Option<Heightfield>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), center: Vec2, extent: Vec2) -> Self {
        Self {
            image_size,
            center,
            extent,
            background: [245, 245, 240],
            debug: DebugLevel::Off,
            styles: HashMap::new(),
            ground: None,
        }
    }

    pub fn with_background(mut self, color: [u8; 3]) -> Self {
        self.background = color;
        self
    }

    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }

    /// Shades the background by the heightfield's elevation.
    pub fn with_ground(mut self, ground: Heightfield) -> Self {
        self.ground = Some(ground);
        self
    }

    pub fn set_species_style(&mut self, species: impl Into<String>, style: SpeciesStyle) {
        self.styles.insert(species.into(), style);
    }

    fn to_pixel(&self, world: Vec3) -> (i32, i32) {
        let (w, h) = self.image_size;
        let uv = (Vec2::new(world.x, world.z) - self.center) / self.extent + Vec2::splat(0.5);
        ((uv.x * w as f32) as i32, ((1.0 - uv.y) * h as f32) as i32)
    }

    fn to_world(&self, px: u32, py: u32) -> Vec2 {
        let (w, h) = self.image_size;
        let uv = Vec2::new(
            (px as f32 + 0.5) / w as f32,
            1.0 - (py as f32 + 0.5) / h as f32,
        );
        self.center + (uv - Vec2::splat(0.5)) * self.extent
    }
}

/// Renders a run's points and placements, plus probe paths and rejections from `events`
/// depending on [`RenderConfig::debug`].
pub fn render_run_to_png(
    result: &RunResult,
    events: &[ScatterEvent],
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    if let Some(ground) = &config.ground {
        for py in 0..h {
            for px in 0..w {
                let p = config.to_world(px, py);
                let t = ((ground.height(p.x, p.y) - ground.base) / (2.0 * ground.amplitude) + 0.5)
                    .clamp(0.0, 1.0);
                let shade = |lo: u8, hi: u8| (lo as f32 + (hi as f32 - lo as f32) * t) as u8;
                img.put_pixel(
                    px,
                    py,
                    Rgb([shade(150, 235), shade(175, 225), shade(120, 200)]),
                );
            }
        }
    }

    if config.debug != DebugLevel::Off {
        for event in events {
            if let ScatterEvent::ProbeTraced { path, hit, .. } = event {
                for pair in path.windows(2) {
                    draw_line(
                        &mut img,
                        config.to_pixel(pair[0]),
                        config.to_pixel(pair[1]),
                        RAY_COLOR,
                    );
                }
                if let Some(hit) = hit {
                    fill_circle(&mut img, config.to_pixel(*hit), 1, HIT_COLOR);
                }
            }
        }
    }

    for point in result.field.iter().filter(|p| !p.occupied) {
        fill_circle(&mut img, config.to_pixel(point.position), 1, FREE_COLOR);
    }

    for placement in &result.placements {
        let style = config
            .styles
            .get(&placement.species_id)
            .copied()
            .unwrap_or(SpeciesStyle {
                color: [30, 30, 30],
                radius: 3,
            });
        fill_circle(
            &mut img,
            config.to_pixel(placement.transform.position),
            style.radius,
            style.color,
        );
    }

    if config.debug == DebugLevel::Verbose {
        for event in events {
            if let ScatterEvent::PlacementRejected { point_index, .. } = event {
                if let Some(point) = result.field.get(*point_index) {
                    draw_cross(&mut img, config.to_pixel(point.position), 2, REJECT_COLOR);
                }
            }
        }
    }

    img.save(path)?;
    Ok(())
}

fn set(img: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn fill_circle(img: &mut RgbImage, (cx, cy): (i32, i32), radius: i32, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                set(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_cross(img: &mut RgbImage, (cx, cy): (i32, i32), arm: i32, color: [u8; 3]) {
    for d in -arm..=arm {
        set(img, cx + d, cy + d, color);
        set(img, cx + d, cy - d, color);
    }
}

fn draw_line(img: &mut RgbImage, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: [u8; 3]) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = x0 as f32 + (x1 - x0) as f32 * t;
        let y = y0 as f32 + (y1 - y0) as f32 * t;
        set(img, x.round() as i32, y.round() as i32, color);
    }
}
