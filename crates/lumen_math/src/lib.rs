// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;
mod rng;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use rng::{Pcg32, MIN_VECTOR_LENGTH_SQUARED};
pub use transform::Transform;
