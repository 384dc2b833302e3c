//! PCG32 random number generator.
//!
//! Every ray owns one generator, seeded from a `(seed, sequence)` pair, and
//! threads it explicitly through every stochastic decision. There is no global
//! or thread-local randomness. See https://www.pcg-random.org/.

use glam::{Vec2, Vec3};
use rand::{Error, RngCore, SeedableRng};

/// Squared length below which a sampled vector is considered degenerate.
pub const MIN_VECTOR_LENGTH_SQUARED: f32 = 1e-24;

const MULTIPLIER: u64 = 6364136223846793005;

/// Permuted congruential generator with 64-bit state and 32-bit output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    /// Stream selector. Always odd.
    increment: u64,
}

impl Pcg32 {
    /// Create a generator for `init_state` on stream `init_sequence`.
    ///
    /// Two warm-up steps make both parameters influence the first output.
    pub fn new(init_state: u64, init_sequence: u64) -> Self {
        let mut rng = Self {
            state: 0,
            increment: (init_sequence << 1) | 1,
        };
        rng.step();
        rng.state = rng.state.wrapping_add(init_state);
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(MULTIPLIER).wrapping_add(self.increment);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Next uniformly distributed 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.step()
    }

    /// Next uniformly distributed value in [0, 1).
    ///
    /// Only the upper 24 bits are kept so the result is exactly representable
    /// and can never round up to 1.0.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.step() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniformly distributed direction in the plane.
    pub fn unit_vector_2d(&mut self) -> Vec2 {
        loop {
            let v = Vec2::new(self.next_f32() * 2.0 - 1.0, self.next_f32() * 2.0 - 1.0);
            let len_sq = v.length_squared();
            if MIN_VECTOR_LENGTH_SQUARED < len_sq && len_sq <= 1.0 {
                return v / len_sq.sqrt();
            }
        }
    }

    /// Uniformly distributed direction in space (rejection sampled in the unit ball).
    pub fn unit_vector_3d(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.next_f32() * 2.0 - 1.0,
                self.next_f32() * 2.0 - 1.0,
                self.next_f32() * 2.0 - 1.0,
            );
            let len_sq = v.length_squared();
            if MIN_VECTOR_LENGTH_SQUARED < len_sq && len_sq <= 1.0 {
                return v / len_sq.sqrt();
            }
        }
    }

    /// Uniformly distributed direction in the hemisphere around `normal`.
    pub fn hemisphere_vector(&mut self, normal: Vec3) -> Vec3 {
        let v = self.unit_vector_3d();
        if v.dot(normal) > 0.0 {
            v
        } else {
            -v
        }
    }
}

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.step());
        let high = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    /// Little-endian `init_state` followed by little-endian `init_sequence`.
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut state = [0u8; 8];
        let mut sequence = [0u8; 8];
        state.copy_from_slice(&seed[..8]);
        sequence.copy_from_slice(&seed[8..]);
        Self::new(u64::from_le_bytes(state), u64::from_le_bytes(sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_reference_stream() {
        // Reference output of pcg32_srandom(42, 54) from the PCG demo program
        let mut rng = Pcg32::new(42, 54);
        let expected = [
            0xa15c02b7, 0x7b47f409, 0xba1d3330, 0x83d2f293, 0xbfa4784b, 0xcbed606e,
        ];

        for value in expected {
            assert_eq!(rng.next_u32(), value);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Pcg32::new(7, 11);
        let mut b = Pcg32::new(7, 11);

        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_sequence_selects_stream() {
        let mut a = Pcg32::new(7, 11);
        let mut b = Pcg32::new(7, 12);

        let same = (0..64).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn test_next_f32_range() {
        let mut rng = Pcg32::new(1, 2);

        for _ in 0..1_000_000 {
            let x = rng.next_f32();
            assert!((0.0..1.0).contains(&x), "{x} out of [0, 1)");
        }
    }

    #[test]
    fn test_next_f32_mean() {
        let mut rng = Pcg32::new(3, 4);
        let n = 100_000;
        let mean = (0..n).map(|_| rng.next_f32() as f64).sum::<f64>() / n as f64;

        assert!((mean - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_unit_vectors_are_unit() {
        let mut rng = Pcg32::new(5, 6);

        for _ in 0..100_000 {
            let v = rng.unit_vector_3d();
            assert!((v.length() - 1.0).abs() < 1e-5);

            let w = rng.unit_vector_2d();
            assert!((w.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unit_vector_3d_covers_all_octants() {
        let mut rng = Pcg32::new(8, 9);
        let mut seen = [false; 8];

        for _ in 0..1000 {
            let v = rng.unit_vector_3d();
            let octant = (v.x > 0.0) as usize | ((v.y > 0.0) as usize) << 1 | ((v.z > 0.0) as usize) << 2;
            seen[octant] = true;
        }

        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_hemisphere_vector() {
        let mut rng = Pcg32::new(10, 11);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        for _ in 0..10_000 {
            assert!(rng.hemisphere_vector(normal).dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_rand_integration() {
        let mut rng = Pcg32::seed_from_u64(99);
        let x: f32 = rng.gen_range(-1.0..1.0);
        assert!((-1.0..1.0).contains(&x));

        let mut bytes = [0u8; 7];
        rng.fill_bytes(&mut bytes);

        let mut a = Pcg32::from_seed([1; 16]);
        let mut b = Pcg32::from_seed([1; 16]);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
