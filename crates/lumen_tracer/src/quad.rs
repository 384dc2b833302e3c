//! Parallelogram primitive.
//!
//! A quad is an open surface: it yields at most one event per ray, reported
//! as an exit when the ray travels along the normal. Used inside a
//! composition it acts as a half-space boundary.

use crate::hit::{Boundary, HitEnumerator, MaterialRef};
use lumen_math::{Aabb, Pcg32, Ray, Transform, Vec2, Vec3};

/// Parallelogram spanned by `u` and `v` from `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / |n|^2` with `n = u x v`, for planar coordinates
    w: Vec3,
    normal: Vec3,
    /// Plane offset along `normal`
    d: f32,
    pub material: MaterialRef,
}

impl Quad {
    pub fn new(origin: Vec3, u: Vec3, v: Vec3, material: MaterialRef) -> Self {
        let n = u.cross(v);
        let len_sq = n.length_squared();
        if len_sq == 0.0 {
            log::warn!("Degenerate quad at {origin:?}: edges are parallel, it will never be hit");
        }
        let normal = n / len_sq.sqrt();

        Self {
            origin,
            u,
            v,
            w: n / len_sq,
            normal,
            d: normal.dot(origin),
            material,
        }
    }

    /// Quad of `width` x `height` in the local XY plane, centered on the
    /// origin, facing local +Z.
    pub fn from_transform(transform: Transform, width: f32, height: f32, material: MaterialRef) -> Self {
        let u = transform.vector_to_world(Vec3::X * width);
        let v = transform.vector_to_world(Vec3::Y * height);
        let origin = transform.point_to_world(Vec3::ZERO) - 0.5 * (u + v);
        Self::new(origin, u, v, material)
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// The single crossing of `ray` with the quad, if any.
    pub fn hits(&self, ray: &Ray) -> QuadHits {
        let denom = self.normal.dot(ray.direction);
        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !t.is_finite() {
            return QuadHits::empty(*ray);
        }

        let planar = ray.at(t) - self.origin;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !((0.0..=1.0).contains(&alpha) && (0.0..=1.0).contains(&beta)) {
            return QuadHits::empty(*ray);
        }

        QuadHits {
            ray: *ray,
            boundary: Boundary {
                t,
                normal: self.normal,
                material: self.material,
                uv: Vec2::new(alpha, beta),
            },
            is_exit: denom > 0.0,
            done: false,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let diagonal1 = Aabb::from_points(self.origin, self.origin + self.u + self.v);
        let diagonal2 = Aabb::from_points(self.origin + self.u, self.origin + self.v);
        Aabb::surrounding(&diagonal1, &diagonal2)
    }
}

/// At most one event: the crossing of the quad's plane inside its edges.
#[derive(Debug, Clone)]
pub struct QuadHits {
    ray: Ray,
    boundary: Boundary,
    is_exit: bool,
    done: bool,
}

impl QuadHits {
    fn empty(ray: Ray) -> Self {
        Self {
            ray,
            boundary: Boundary {
                t: f32::INFINITY,
                normal: Vec3::ZERO,
                material: MaterialRef::default(),
                uv: Vec2::ZERO,
            },
            is_exit: false,
            done: true,
        }
    }
}

impl HitEnumerator for QuadHits {
    fn has_next(&self) -> bool {
        !self.done
    }

    fn advance(&mut self, _rng: &mut Pcg32) {
        debug_assert!(self.has_next());
        self.done = true;
    }

    fn is_exit(&self) -> bool {
        self.is_exit
    }

    fn t(&self) -> f32 {
        debug_assert!(self.has_next());
        self.boundary.t
    }

    fn point(&self) -> Vec3 {
        self.ray.at(self.t())
    }

    fn normal(&self) -> Vec3 {
        self.boundary.normal
    }

    fn material(&self) -> MaterialRef {
        self.boundary.material
    }

    fn texture_coordinates(&self) -> Vec2 {
        self.boundary.uv
    }
}
