//! Perlin gradient noise and the procedural texture built on it.

use crate::Color;
use lumen_math::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;

const TABLE_SIZE: usize = 256;

/// Lattice gradient noise with a precomputed gradient table and three
/// permutation tables (one per axis).
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    gradients: Vec<Vec3>,
    permutations: [Vec<u8>; 3],
}

impl PerlinNoise {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let gradients = (0..TABLE_SIZE)
            .map(|_| {
                loop {
                    let v = Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    );
                    let len_sq = v.length_squared();
                    if lumen_math::MIN_VECTOR_LENGTH_SQUARED < len_sq && len_sq <= 1.0 {
                        break v / len_sq.sqrt();
                    }
                }
            })
            .collect();

        let mut permutation = || {
            let mut table: Vec<u8> = (0..=255).collect();
            table.shuffle(&mut *rng);
            table
        };
        let permutations = [permutation(), permutation(), permutation()];

        Self {
            gradients,
            permutations,
        }
    }

    /// Signed noise at `p`, roughly in [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let cell = p.floor();
        let f = p - cell;
        // Tables repeat every 256 cells; reduce before casting so far-away
        // points neither saturate nor overflow
        let lattice = |c: f32| c.rem_euclid(TABLE_SIZE as f32) as usize;
        let (i, j, k) = (lattice(cell.x), lattice(cell.y), lattice(cell.z));

        let s = Vec3::new(smooth(f.x), smooth(f.y), smooth(f.z));
        let mut accum = 0.0;

        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let hash = self.permutations[0][(i + di) & 255]
                        ^ self.permutations[1][(j + dj) & 255]
                        ^ self.permutations[2][(k + dk) & 255];
                    let corner = Vec3::new(di as f32, dj as f32, dk as f32);
                    let weight = Vec3::select(corner.cmpeq(Vec3::ZERO), Vec3::ONE - s, s);

                    accum += weight.x * weight.y * weight.z * self.gradients[hash as usize].dot(f - corner);
                }
            }
        }

        accum
    }

    /// Absolute value of `octaves` summed noise samples, each at double the
    /// frequency and half the weight of the previous one.
    pub fn turbulence(&self, p: Vec3, octaves: u32) -> f32 {
        let mut accum = 0.0f32;
        let mut p = p;
        let mut weight = 1.0f32;

        for _ in 0..octaves {
            accum += weight * self.noise(p);
            weight *= 0.5;
            p *= 2.0;
        }

        accum.abs()
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn smooth(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Blend between two colors driven by Perlin noise.
#[derive(Clone, Debug)]
pub struct PerlinNoiseTexture {
    pub colors: [Color; 2],
    pub frequency: f32,
    /// Octave count; zero means raw signed noise.
    pub turbulence: u32,
    noise: PerlinNoise,
}

impl PerlinNoiseTexture {
    pub fn new<R: Rng>(colors: [Color; 2], frequency: f32, turbulence: u32, rng: &mut R) -> Self {
        Self {
            colors,
            frequency,
            turbulence,
            noise: PerlinNoise::new(rng),
        }
    }

    /// Color at world point `p`. The mix factor is not clamped.
    pub fn value(&self, p: Vec3) -> Color {
        let p = self.frequency * p;
        let t = if self.turbulence == 0 {
            self.noise.noise(p)
        } else {
            self.noise.turbulence(p, self.turbulence)
        };

        self.colors[0] * (1.0 - t) + self.colors[1] * t
    }
}
