use crate::Vec3;

/// The half-line `origin + t * direction`.
///
/// The direction is not required to be normalized, so `t` is measured in
/// units of `direction`'s length. Shapes rely on this when they bring a ray
/// into their local frame without rescaling it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
