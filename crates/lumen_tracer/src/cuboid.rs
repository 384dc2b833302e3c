//! Oriented box primitive.

use crate::hit::{Boundary, ConvexHits, MaterialRef};
use lumen_math::{Aabb, Ray, Transform, Vec2, Vec3};

/// Box spanning `[0, size]` on each axis of its local frame.
///
/// Face materials are ordered `[-x, +x, -y, +y, -z, +z]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub transform: Transform,
    pub size: Vec3,
    pub materials: [MaterialRef; 6],
}

impl Cuboid {
    /// Box with one material on every face.
    pub fn new(transform: Transform, size: Vec3, material: MaterialRef) -> Self {
        Self::with_face_materials(transform, size, [material; 6])
    }

    pub fn with_face_materials(transform: Transform, size: Vec3, materials: [MaterialRef; 6]) -> Self {
        Self {
            transform,
            size: size.max(Vec3::ZERO),
            materials,
        }
    }

    /// Axis-aligned box between two corners.
    pub fn from_corners(a: Vec3, b: Vec3, material: MaterialRef) -> Self {
        let min = a.min(b);
        Self::new(Transform::from_translation(min), a.max(b) - min, material)
    }

    /// Texture coordinates on `face` for a local point `q` scaled to `[0, 1]^3`.
    fn face_uv(face: usize, q: Vec3) -> Vec2 {
        match face {
            0 => Vec2::new(1.0 - q.z, q.y),
            1 => Vec2::new(q.z, q.y),
            2 => Vec2::new(q.x, 1.0 - q.z),
            3 => Vec2::new(q.x, q.z),
            4 => Vec2::new(1.0 - q.x, q.y),
            _ => Vec2::new(q.x, q.y),
        }
    }

    fn face_boundary(&self, local: &Ray, face: usize, t: f32) -> Boundary {
        let axis = face / 2;
        let mut normal = Vec3::ZERO;
        normal[axis] = if face % 2 == 0 { -1.0 } else { 1.0 };

        Boundary {
            t,
            normal: self.transform.vector_to_world(normal),
            material: self.materials[face],
            uv: Self::face_uv(face, local.at(t) / self.size),
        }
    }

    /// Entry and exit events of `ray` against the box.
    ///
    /// Slabs are intersected in x, y, z order; when two faces are crossed at
    /// the same `t` the later axis wins.
    pub fn hits(&self, ray: &Ray) -> ConvexHits {
        if self.size.min_element() <= 0.0 {
            return ConvexHits::empty(*ray);
        }

        let local = self.transform.to_local(ray);
        let mut entry: Option<(usize, f32)> = None;
        let mut exit: Option<(usize, f32)> = None;

        for axis in 0..3 {
            let o = local.origin[axis];
            let d = local.direction[axis];
            let t_low = -o / d;
            let t_high = (self.size[axis] - o) / d;

            if !(t_low.is_finite() && t_high.is_finite()) {
                // Parallel to this slab
                if 0.0 <= o && o < self.size[axis] {
                    continue;
                }
                return ConvexHits::empty(*ray);
            }

            let (near, far) = if d > 0.0 {
                ((2 * axis, t_low), (2 * axis + 1, t_high))
            } else {
                ((2 * axis + 1, t_high), (2 * axis, t_low))
            };

            if entry.map_or(true, |(_, t)| near.1 >= t) {
                entry = Some(near);
            }
            if exit.map_or(true, |(_, t)| far.1 <= t) {
                exit = Some(far);
            }
        }

        match (entry, exit) {
            (Some((entry_face, t_in)), Some((exit_face, t_out))) => ConvexHits::span(
                *ray,
                self.face_boundary(&local, entry_face, t_in),
                self.face_boundary(&local, exit_face, t_out),
            ),
            _ => ConvexHits::empty(*ray),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.transform.transform_aabb(&Aabb::from_points(Vec3::ZERO, self.size))
    }
}
