//! Path tracing driver.
//!
//! Follows a path through the scene:
//! - nearest boundary event over all roots
//! - material scatter at that event
//! - repeat until the path is absorbed, escapes or runs out of bounces

use std::time::Instant;

use crate::material::Scatter;
use crate::scene::Scene;
use crate::Color;
use lumen_math::{Interval, Pcg32, Ray};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Background {
    /// Black
    #[default]
    None,
    /// White to blue vertical gradient
    Sky,
}

impl Background {
    #[inline]
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::None => Color::ZERO,
            Background::Sky => sky_gradient(ray),
        }
    }
}

/// Trace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Hits closer than this are ignored to avoid self-intersection
    pub t_min: f32,
    pub background: Background,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 50,
            t_min: 1e-3,
            background: Background::None,
        }
    }
}

/// Compute the color seen by a ray.
pub fn trace(scene: &Scene, ray: &Ray, config: &TraceConfig, rng: &mut Pcg32) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..config.max_depth {
        let Some(hit) = scene.nearest_hit(&ray, Interval::new(config.t_min, f32::INFINITY), rng) else {
            return radiance + throughput * config.background.color(&ray);
        };

        match scene.material(hit.material).scatter(&ray, &hit, rng) {
            Scatter::Bounce {
                emitted,
                attenuation,
                ray: scattered,
            } => {
                radiance += throughput * emitted;
                throughput *= attenuation;
                ray = scattered;
            }
            Scatter::Absorb { emitted } => return radiance + throughput * emitted,
        }
    }

    // Out of bounces: no more light gathered
    radiance
}

/// Trace independent rays in parallel.
///
/// Ray `i` draws from its own stream `Pcg32::new(seed, i)`, so the result
/// does not depend on thread scheduling.
pub fn trace_batch(scene: &Scene, rays: &[Ray], config: &TraceConfig, seed: u64) -> Vec<Color> {
    let start = Instant::now();

    let colors: Vec<Color> = rays
        .par_iter()
        .enumerate()
        .map(|(i, ray)| {
            let mut rng = Pcg32::new(seed, i as u64);
            trace(scene, ray, config, &mut rng)
        })
        .collect();

    log::debug!("Traced {} rays in {:.2?}", rays.len(), start.elapsed());
    colors
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}
