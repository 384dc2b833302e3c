//! Constant-density participating medium.
//!
//! Wraps a solid and replaces each of its inside intervals with at most one
//! stochastic scatter event, sampled from the exponential free-path
//! distribution. A scatter event is followed by the wrapped solid's own exit
//! event so the volume still reports balanced entry/exit pairs.

use crate::hit::{HitEnumerator, MaterialRef};
use lumen_math::{Pcg32, Ray, Vec2, Vec3};

/// Densities at or below this never scatter.
pub const MIN_DENSITY: f32 = f32::MIN_POSITIVE;

/// Distance at which a ray entering the medium at `t_entry` scatters, given
/// a uniform sample `u` in [0, 1).
///
/// Returns `None` for densities that cannot scatter and for samples whose
/// free path overflows.
pub fn scatter_distance(t_entry: f32, density: f32, u: f32) -> Option<f32> {
    if !(density > MIN_DENSITY) {
        return None;
    }
    let t = t_entry + (1.0 - u).ln() / -density;
    t.is_finite().then_some(t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scatter,
    Exit,
    Done,
}

/// Event stream of a fog volume.
#[derive(Debug, Clone)]
pub struct VolumeHits<E> {
    inner: E,
    ray: Ray,
    density: f32,
    t_min: f32,
    phase: Phase,
    scatter_t: f32,
    material: MaterialRef,
}

impl<E: HitEnumerator> VolumeHits<E> {
    /// Wrap `inner`. Free paths are measured from `max(entry, t_min)`, so a
    /// ray starting inside the medium samples from its origin.
    pub fn new(inner: E, ray: Ray, density: f32, t_min: f32, rng: &mut Pcg32) -> Self {
        let mut hits = Self {
            inner,
            ray,
            density,
            t_min,
            phase: Phase::Done,
            scatter_t: f32::INFINITY,
            material: MaterialRef::default(),
        };
        hits.seek(rng);
        hits
    }

    /// Walk the wrapped intervals until one scatters, drawing one sample per
    /// interval.
    fn seek(&mut self, rng: &mut Pcg32) {
        self.phase = Phase::Done;

        while self.inner.has_next() {
            if self.inner.is_exit() {
                // Unpaired exit: the ray started inside the wrapped solid
                self.inner.advance(rng);
                continue;
            }

            let entry_t = self.inner.t();
            let material = self.inner.material();
            self.inner.advance(rng);
            if !self.inner.has_next() {
                return;
            }

            let exit_t = self.inner.t();
            let start = entry_t.max(self.t_min);
            let u = rng.next_f32();
            if let Some(t) = scatter_distance(start, self.density, u) {
                if t <= exit_t {
                    self.scatter_t = t;
                    self.material = material;
                    self.phase = Phase::Scatter;
                    return;
                }
            }
            self.inner.advance(rng);
        }
    }
}

impl<E: HitEnumerator> HitEnumerator for VolumeHits<E> {
    fn has_next(&self) -> bool {
        self.phase != Phase::Done
    }

    fn advance(&mut self, rng: &mut Pcg32) {
        debug_assert!(self.has_next());
        match self.phase {
            Phase::Scatter => self.phase = Phase::Exit,
            Phase::Exit => {
                self.inner.advance(rng);
                self.seek(rng);
            }
            Phase::Done => {}
        }
    }

    fn is_exit(&self) -> bool {
        self.phase == Phase::Exit
    }

    fn t(&self) -> f32 {
        debug_assert!(self.has_next());
        match self.phase {
            Phase::Exit => self.inner.t(),
            _ => self.scatter_t,
        }
    }

    fn point(&self) -> Vec3 {
        self.ray.at(self.t())
    }

    /// Scatter events face back along the ray.
    fn normal(&self) -> Vec3 {
        match self.phase {
            Phase::Exit => self.inner.normal(),
            _ => -self.ray.direction,
        }
    }

    fn material(&self) -> MaterialRef {
        match self.phase {
            Phase::Exit => self.inner.material(),
            _ => self.material,
        }
    }

    fn texture_coordinates(&self) -> Vec2 {
        match self.phase {
            Phase::Exit => self.inner.texture_coordinates(),
            _ => Vec2::splat(0.5),
        }
    }
}
