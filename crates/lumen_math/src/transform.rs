// Rigid transforms for shape-local ray tracing
//
// A shape is defined in its own local frame and placed in the world by a
// rotation followed by a translation. Rays are brought into the local frame
// instead of transforming the shape.

use glam::{Mat3, Quat, Vec3};
use crate::{Aabb, Ray};

/// Rigid local-to-world transform: `world = rotation * local + translation`.
///
/// `rotation` must be orthonormal; its transpose is used as the inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: Mat3::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Mat3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat3::IDENTITY, translation)
    }

    /// Build a transform from a (unit) quaternion and a translation.
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self::new(Mat3::from_quat(rotation.normalize()), translation)
    }

    /// Transform a point from the local frame into the world frame.
    #[inline]
    pub fn point_to_world(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Transform a point from the world frame into the local frame.
    #[inline]
    pub fn point_to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.transpose() * (point - self.translation)
    }

    /// Rotate a direction into the world frame. Translation does not apply.
    #[inline]
    pub fn vector_to_world(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Rotate a direction into the local frame. Translation does not apply.
    #[inline]
    pub fn vector_to_local(&self, vector: Vec3) -> Vec3 {
        self.rotation.transpose() * vector
    }

    /// Bring a world-space ray into the local frame.
    ///
    /// The parametrization is preserved: `to_local(r).at(t)` is the local
    /// image of `r.at(t)`.
    pub fn to_local(&self, ray: &Ray) -> Ray {
        let inverse = self.rotation.transpose();
        Ray::new(
            inverse * (ray.origin - self.translation),
            inverse * ray.direction,
        )
    }

    /// Bring a local-space ray into the world frame.
    pub fn to_world(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.rotation * ray.origin + self.translation,
            self.rotation * ray.direction,
        )
    }

    /// Transform a local-space bounding box into the world frame.
    /// Computes the bounding box of all 8 transformed corners.
    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let min_point = Vec3::new(aabb.x.min, aabb.y.min, aabb.z.min);
        let max_point = Vec3::new(aabb.x.max, aabb.y.max, aabb.z.max);

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 != 0 { max_point.x } else { min_point.x },
                if i & 2 != 0 { max_point.y } else { min_point.y },
                if i & 4 != 0 { max_point.z } else { min_point.z },
            );
            let world = self.point_to_world(corner);
            result_min = result_min.min(world);
            result_max = result_max.max(world);
        }

        Aabb::from_points(result_min, result_max)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
