//! Lumen tracer core.
//!
//! Solids are described as streams of boundary events along a ray. Spheres,
//! cylinders, boxes and quads produce those streams directly; CSG
//! compositions merge them and fog volumes turn them into stochastic
//! scatter events. Materials decide what happens at each event, and the
//! driver in [`renderer`] follows paths through a [`Scene`].

mod arena;
mod csg;
mod cuboid;
mod cylinder;
mod hit;
mod material;
mod noise;
mod primitive;
mod quad;
mod renderer;
mod scene;
mod sphere;
mod texture;
mod volume;

pub use arena::{Cursor, Node, NodeId, ShapeArena};
pub use csg::{Combinator, CompositionHits};
pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use hit::{Boundary, ConvexHits, Face, HitEnumerator, HitEvent, MaterialRef};
pub use material::{reflect, reflectance, refract_or_reflect, Color, Material, Scatter};
pub use noise::{PerlinNoise, PerlinNoiseTexture};
pub use primitive::{Primitive, PrimitiveHits};
pub use quad::{Quad, QuadHits};
pub use renderer::{color_to_rgba, linear_to_gamma, trace, trace_batch, Background, TraceConfig};
pub use scene::{Scene, SceneError, SceneResult};
pub use sphere::Sphere;
pub use texture::{ImageTexture, Texture, TextureError, TextureResult};
pub use volume::{scatter_distance, VolumeHits, MIN_DENSITY};

/// Re-export the math types the public API is written in
pub use lumen_math::{Aabb, Interval, Pcg32, Ray, Transform, Vec2, Vec3};
