//! Capped cylinder primitive.
//!
//! In its local frame the cylinder stands on the XZ plane with its axis along
//! +Y, spanning `0..=height`. The solid is the intersection of the slab
//! between the two cap planes and the infinite tube around the axis.

use crate::hit::{Boundary, ConvexHits, MaterialRef};
use lumen_math::{Aabb, Quat, Ray, Transform, Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub transform: Transform,
    pub radius: f32,
    pub height: f32,
    pub bottom_material: MaterialRef,
    pub top_material: MaterialRef,
    pub side_material: MaterialRef,
}

impl Cylinder {
    /// Cylinder with one material on every face.
    pub fn new(transform: Transform, radius: f32, height: f32, material: MaterialRef) -> Self {
        Self::with_materials(transform, radius, height, material, material, material)
    }

    pub fn with_materials(
        transform: Transform,
        radius: f32,
        height: f32,
        bottom_material: MaterialRef,
        top_material: MaterialRef,
        side_material: MaterialRef,
    ) -> Self {
        Self {
            transform,
            radius: radius.max(0.0),
            height: height.max(0.0),
            bottom_material,
            top_material,
            side_material,
        }
    }

    /// Cylinder whose axis runs from `bottom` to `top`.
    pub fn between(bottom: Vec3, top: Vec3, radius: f32, material: MaterialRef) -> Self {
        let axis = top - bottom;
        let height = axis.length();
        let rotation = if height > 0.0 {
            Quat::from_rotation_arc(Vec3::Y, axis / height)
        } else {
            Quat::IDENTITY
        };

        Self::new(
            Transform::from_rotation_translation(rotation, bottom),
            radius,
            height,
            material,
        )
    }

    /// World-space axis direction.
    pub fn axis(&self) -> Vec3 {
        self.transform.vector_to_world(Vec3::Y)
    }

    fn bottom_boundary(&self, local: &Ray, t: f32) -> Boundary {
        let p = local.at(t);
        let scale = 0.5 / self.radius;
        Boundary {
            t,
            normal: self.transform.vector_to_world(-Vec3::Y),
            material: self.bottom_material,
            uv: Vec2::new(0.5 - p.x * scale, 0.5 + p.z * scale),
        }
    }

    fn top_boundary(&self, local: &Ray, t: f32) -> Boundary {
        let p = local.at(t);
        let scale = 0.5 / self.radius;
        Boundary {
            t,
            normal: self.transform.vector_to_world(Vec3::Y),
            material: self.top_material,
            uv: Vec2::new(0.5 + p.x * scale, 0.5 + p.z * scale),
        }
    }

    fn side_boundary(&self, local: &Ray, t: f32) -> Boundary {
        let p = local.at(t);
        let n = Vec3::new(p.x, 0.0, p.z) / self.radius;
        Boundary {
            t,
            normal: self.transform.vector_to_world(n),
            material: self.side_material,
            uv: Vec2::new(n.z.atan2(-n.x) / (2.0 * PI) + 0.5, p.y / self.height),
        }
    }

    /// Entry and exit through the cap planes. Rays parallel to the caps are
    /// inside the slab for all `t` or for none.
    fn slab_span(&self, local: &Ray) -> (Boundary, Boundary) {
        let o = local.origin;
        let d = local.direction;
        let t_bottom = -o.y / d.y;
        let t_top = (self.height - o.y) / d.y;

        if t_bottom.is_finite() && t_top.is_finite() {
            if d.y > 0.0 {
                (self.bottom_boundary(local, t_bottom), self.top_boundary(local, t_top))
            } else {
                (self.top_boundary(local, t_top), self.bottom_boundary(local, t_bottom))
            }
        } else if 0.0 <= o.y && o.y < self.height {
            (unbounded(f32::NEG_INFINITY), unbounded(f32::INFINITY))
        } else {
            (unbounded(f32::INFINITY), unbounded(f32::NEG_INFINITY))
        }
    }

    /// Entry and exit through the infinite tube, or `None` if the ray misses it.
    fn tube_span(&self, local: &Ray) -> Option<(Boundary, Boundary)> {
        let o = local.origin;
        let d = local.direction;
        let a = d.x * d.x + d.z * d.z;
        let h = d.x * o.x + d.z * o.z;
        let c = o.x * o.x + o.z * o.z - self.radius * self.radius;

        if a == 0.0 {
            // Parallel to the axis
            return (c <= 0.0).then(|| (unbounded(f32::NEG_INFINITY), unbounded(f32::INFINITY)));
        }

        let discriminant = h * h - a * c;
        if !(discriminant >= 0.0) {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        Some((
            self.side_boundary(local, (-h - sqrtd) / a),
            self.side_boundary(local, (-h + sqrtd) / a),
        ))
    }

    /// Entry and exit events of `ray` against the cylinder.
    pub fn hits(&self, ray: &Ray) -> ConvexHits {
        if self.radius <= 0.0 || self.height <= 0.0 {
            return ConvexHits::empty(*ray);
        }

        let local = self.transform.to_local(ray);
        let Some((tube_in, tube_out)) = self.tube_span(&local) else {
            return ConvexHits::empty(*ray);
        };
        let (cap_in, cap_out) = self.slab_span(&local);

        let entry = if cap_in.t > tube_in.t { cap_in } else { tube_in };
        let exit = if cap_out.t < tube_out.t { cap_out } else { tube_out };

        ConvexHits::span(*ray, entry, exit)
    }

    /// Tight box around the two cap disks.
    pub fn bounding_box(&self) -> Aabb {
        let axis = self.axis();
        let bottom = self.transform.translation;
        let top = bottom + axis * self.height;
        let extent = self.radius * (Vec3::ONE - axis * axis).max(Vec3::ZERO).powf(0.5);

        Aabb::from_points(bottom.min(top) - extent, bottom.max(top) + extent)
    }
}

fn unbounded(t: f32) -> Boundary {
    Boundary {
        t,
        normal: Vec3::ZERO,
        material: MaterialRef::default(),
        uv: Vec2::ZERO,
    }
}
