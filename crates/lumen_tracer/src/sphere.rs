//! Sphere primitive for ray tracing.

use crate::hit::{Boundary, ConvexHits, MaterialRef};
use lumen_math::{Aabb, Ray, Transform, Vec2, Vec3};
use std::f32::consts::PI;

/// A sphere centered on the origin of its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub transform: Transform,
    pub radius: f32,
    pub material: MaterialRef,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialRef) -> Self {
        Self::with_transform(Transform::from_translation(center), radius, material)
    }

    /// Create a sphere in an oriented frame. Rotation only affects texture
    /// coordinates.
    pub fn with_transform(transform: Transform, radius: f32, material: MaterialRef) -> Self {
        Self {
            transform,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.transform.translation
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn sphere_uv(n: Vec3) -> Vec2 {
        // u: angle around Y, zero on -X
        // v: angle up from -Y
        let u = n.z.atan2(-n.x) / (2.0 * PI) + 0.5;
        let v = (-n.y).acos() / PI;
        Vec2::new(u, v)
    }

    fn boundary(&self, local: &Ray, t: f32) -> Boundary {
        let n = local.at(t) / self.radius;
        Boundary {
            t,
            normal: self.transform.vector_to_world(n),
            material: self.material,
            uv: Self::sphere_uv(n),
        }
    }

    /// Entry and exit events of `ray` against the sphere.
    pub fn hits(&self, ray: &Ray) -> ConvexHits {
        if self.radius <= 0.0 {
            return ConvexHits::empty(*ray);
        }

        let local = self.transform.to_local(ray);
        let oc = local.origin;
        let a = local.direction.length_squared();
        let h = local.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if !(discriminant >= 0.0) {
            return ConvexHits::empty(*ray);
        }

        let sqrtd = discriminant.sqrt();
        let t_in = (-h - sqrtd) / a;
        let t_out = (-h + sqrtd) / a;

        ConvexHits::span(*ray, self.boundary(&local, t_in), self.boundary(&local, t_out))
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center() - rvec, self.center() + rvec)
    }
}
