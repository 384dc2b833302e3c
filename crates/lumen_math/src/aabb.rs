use crate::{Interval, Ray, Vec3};

/// World-space bounds of a shape, one interval per axis, handed to the
/// external acceleration structure.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Zero-width axes are padded so flat shapes still have volume.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        Self::new(x, y, z)
    }

    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Overlap of two boxes. Disjoint boxes give an inverted axis that no ray hits.
    pub fn intersection(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::intersect(&box0.x, &box1.x),
            y: Interval::intersect(&box0.y, &box1.y),
            z: Interval::intersect(&box0.z, &box1.z),
        }
    }

    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test: does `r` overlap the box somewhere inside `ray_t`?
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let bounds = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (bounds.min - r.origin[axis]) * adinv;
            let mut t1 = (bounds.max - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// Contains nothing; the identity of [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(1.0), Vec3::splat(-1.0))
    }

    #[test]
    fn test_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(2.0, -1.0, 4.0), Vec3::new(-2.0, 3.0, 0.0));

        assert_eq!(aabb.x, Interval::new(-2.0, 2.0));
        assert_eq!(aabb.y, Interval::new(-1.0, 3.0));
        assert_eq!(aabb.z, Interval::new(0.0, 4.0));
    }

    #[test]
    fn test_flat_box_is_padded() {
        // A quad lying in the z = 0 plane
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));

        assert!(aabb.z.size() > 0.0);
        assert!(aabb.z.contains(0.0));
        assert_eq!(aabb.x.size(), 2.0);
    }

    #[test]
    fn test_surrounding_starts_from_empty() {
        let far = Aabb::from_points(Vec3::splat(4.0), Vec3::splat(5.0));
        let bounds = [unit_box(), far]
            .iter()
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, b));

        assert_eq!(bounds.x, Interval::new(-1.0, 5.0));
        assert_eq!(bounds.z, Interval::new(-1.0, 5.0));
    }

    #[test]
    fn test_intersection_of_overlapping_and_disjoint_boxes() {
        let shifted = Aabb::from_points(Vec3::ZERO, Vec3::splat(3.0));
        let overlap = Aabb::intersection(&unit_box(), &shifted);
        assert_eq!(overlap.y, Interval::new(0.0, 1.0));

        // Disjoint boxes are never hit
        let far = Aabb::from_points(Vec3::splat(4.0), Vec3::splat(5.0));
        let none = Aabb::intersection(&unit_box(), &far);
        let ray = Ray::new(Vec3::new(4.5, 4.5, -10.0), Vec3::Z);
        assert!(!none.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_hit_respects_ray_interval() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(0.2, 0.3, -5.0), Vec3::Z);

        assert!(aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.5)));
        assert!(!aabb.hit(&ray, Interval::new(6.5, f32::INFINITY)));

        // Axis-parallel ray outside one slab
        let beside = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::Z);
        assert!(!aabb.hit(&beside, Interval::new(0.0, f32::INFINITY)));

        let backwards = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.hit(&backwards, Interval::new(0.0, f32::INFINITY)));
    }
}
