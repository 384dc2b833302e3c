//! Closed set of leaf shapes.

use crate::cuboid::Cuboid;
use crate::cylinder::Cylinder;
use crate::hit::{ConvexHits, HitEnumerator, MaterialRef};
use crate::quad::{Quad, QuadHits};
use crate::sphere::Sphere;
use lumen_math::{Aabb, Pcg32, Ray, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Cuboid(Cuboid),
    Quad(Quad),
}

impl Primitive {
    pub fn hits(&self, ray: &Ray) -> PrimitiveHits {
        match self {
            Primitive::Sphere(s) => PrimitiveHits::Convex(s.hits(ray)),
            Primitive::Cylinder(c) => PrimitiveHits::Convex(c.hits(ray)),
            Primitive::Cuboid(b) => PrimitiveHits::Convex(b.hits(ray)),
            Primitive::Quad(q) => PrimitiveHits::Quad(q.hits(ray)),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Cylinder(c) => c.bounding_box(),
            Primitive::Cuboid(b) => b.bounding_box(),
            Primitive::Quad(q) => q.bounding_box(),
        }
    }

    /// Every material this shape can report.
    pub fn materials(&self) -> Vec<MaterialRef> {
        match self {
            Primitive::Sphere(s) => vec![s.material],
            Primitive::Cylinder(c) => vec![c.bottom_material, c.top_material, c.side_material],
            Primitive::Cuboid(b) => b.materials.to_vec(),
            Primitive::Quad(q) => vec![q.material],
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Cylinder> for Primitive {
    fn from(cylinder: Cylinder) -> Self {
        Primitive::Cylinder(cylinder)
    }
}

impl From<Cuboid> for Primitive {
    fn from(cuboid: Cuboid) -> Self {
        Primitive::Cuboid(cuboid)
    }
}

impl From<Quad> for Primitive {
    fn from(quad: Quad) -> Self {
        Primitive::Quad(quad)
    }
}

/// Event stream of any primitive.
#[derive(Debug, Clone)]
pub enum PrimitiveHits {
    Convex(ConvexHits),
    Quad(QuadHits),
}

macro_rules! dispatch {
    ($self:ident, $hits:ident => $body:expr) => {
        match $self {
            PrimitiveHits::Convex($hits) => $body,
            PrimitiveHits::Quad($hits) => $body,
        }
    };
}

impl HitEnumerator for PrimitiveHits {
    fn has_next(&self) -> bool {
        dispatch!(self, h => h.has_next())
    }

    fn advance(&mut self, rng: &mut Pcg32) {
        dispatch!(self, h => h.advance(rng))
    }

    fn is_exit(&self) -> bool {
        dispatch!(self, h => h.is_exit())
    }

    fn t(&self) -> f32 {
        dispatch!(self, h => h.t())
    }

    fn point(&self) -> Vec3 {
        dispatch!(self, h => h.point())
    }

    fn normal(&self) -> Vec3 {
        dispatch!(self, h => h.normal())
    }

    fn material(&self) -> MaterialRef {
        dispatch!(self, h => h.material())
    }

    fn texture_coordinates(&self) -> Vec2 {
        dispatch!(self, h => h.texture_coordinates())
    }
}
