//! N-ary constructive solid geometry over event streams.
//!
//! A composition merges its children's boundary events in `t` order while
//! counting how many children currently contain the ray. The composed solid
//! is inside whenever that count reaches the combinator's threshold, and a
//! child event is forwarded exactly when it flips that predicate.

use crate::hit::{HitEnumerator, MaterialRef};
use lumen_math::{Pcg32, Vec2, Vec3};

/// Boolean operator expressed as a containment threshold.
///
/// With `subtract` set, every child after the first counts with inverted
/// polarity: entering it leaves the solid and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combinator {
    pub threshold: u32,
    pub subtract: bool,
}

impl Combinator {
    /// Inside any child.
    pub const UNION: Combinator = Combinator {
        threshold: 1,
        subtract: false,
    };

    /// Inside the first child and outside all others.
    pub const DIFFERENCE: Combinator = Combinator {
        threshold: 1,
        subtract: true,
    };

    /// Inside all `child_count` children.
    pub fn intersection(child_count: usize) -> Self {
        Self {
            threshold: child_count.max(1) as u32,
            subtract: false,
        }
    }
}

/// Merged event stream of a composition.
#[derive(Debug, Clone)]
pub struct CompositionHits<E> {
    combinator: Combinator,
    children: Vec<E>,
    depth: i32,
    selected: Option<usize>,
    exit: bool,
}

impl<E: HitEnumerator> CompositionHits<E> {
    pub fn new(combinator: Combinator, children: Vec<E>, rng: &mut Pcg32) -> Self {
        let mut hits = Self {
            combinator,
            children,
            depth: 0,
            selected: None,
            exit: false,
        };
        hits.seek(rng);
        hits
    }

    #[inline]
    fn is_inverted(&self, index: usize) -> bool {
        self.combinator.subtract && index > 0
    }

    #[inline]
    fn inside(&self) -> bool {
        self.depth >= self.combinator.threshold as i32
    }

    /// Child with the smallest pending `t`. Earlier children win ties.
    fn nearest_child(&self) -> Option<usize> {
        let mut nearest: Option<(usize, f32)> = None;
        for (index, child) in self.children.iter().enumerate() {
            if !child.has_next() {
                continue;
            }
            let t = child.t();
            if nearest.map_or(true, |(_, best)| t < best) {
                nearest = Some((index, t));
            }
        }
        nearest.map(|(index, _)| index)
    }

    /// Consume child events until one changes the inside predicate.
    fn seek(&mut self, rng: &mut Pcg32) {
        while let Some(index) = self.nearest_child() {
            let entering = self.children[index].is_exit() == self.is_inverted(index);
            let was_inside = self.inside();
            self.depth += if entering { 1 } else { -1 };

            if self.inside() != was_inside {
                self.selected = Some(index);
                self.exit = was_inside;
                return;
            }
            self.children[index].advance(rng);
        }
        self.selected = None;
    }

    #[inline]
    fn current(&self) -> (usize, &E) {
        debug_assert!(self.has_next(), "accessor called on an exhausted enumerator");
        let index = self.selected.unwrap_or(0);
        (index, &self.children[index])
    }
}

impl<E: HitEnumerator> HitEnumerator for CompositionHits<E> {
    fn has_next(&self) -> bool {
        self.selected.is_some()
    }

    fn advance(&mut self, rng: &mut Pcg32) {
        debug_assert!(self.has_next());
        if let Some(index) = self.selected {
            self.children[index].advance(rng);
        }
        self.seek(rng);
    }

    fn is_exit(&self) -> bool {
        self.exit
    }

    fn t(&self) -> f32 {
        self.current().1.t()
    }

    fn point(&self) -> Vec3 {
        self.current().1.point()
    }

    /// Cut surfaces of subtracted children face into them.
    fn normal(&self) -> Vec3 {
        let (index, child) = self.current();
        if self.is_inverted(index) {
            -child.normal()
        } else {
            child.normal()
        }
    }

    fn material(&self) -> MaterialRef {
        self.current().1.material()
    }

    fn texture_coordinates(&self) -> Vec2 {
        self.current().1.texture_coordinates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::Cuboid;
    use crate::cylinder::Cylinder;
    use crate::hit::test_support::*;
    use crate::hit::ConvexHits;
    use crate::sphere::Sphere;
    use lumen_math::{Ray, Transform};

    fn difference_pair() -> (Cylinder, Cylinder) {
        let a = Cylinder::with_materials(Transform::IDENTITY, 2.0, 4.0, MaterialRef(5), MaterialRef(7), MaterialRef(9));
        let b = Cylinder::with_materials(
            Transform::from_translation(Vec3::Y),
            1.0,
            6.0,
            MaterialRef(11),
            MaterialRef(13),
            MaterialRef(15),
        );
        (a, b)
    }

    fn subtract(ray: Ray, rng: &mut Pcg32) -> CompositionHits<ConvexHits> {
        let (a, b) = difference_pair();
        CompositionHits::new(Combinator::DIFFERENCE, vec![a.hits(&ray), b.hits(&ray)], rng)
    }

    #[test]
    fn test_difference_a_then_b() {
        let mut rng = Pcg32::new(0, 0);
        let mut e = subtract(Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y), &mut rng);

        assert!(!e.is_exit());
        assert_near(e.t(), 1.0);
        assert_vec3_near(e.normal(), -Vec3::Y);
        assert_eq!(e.material(), MaterialRef(5));
        e.advance(&mut rng);

        assert!(e.is_exit());
        assert_near(e.t(), 2.0);
        assert_vec3_near(e.point(), Vec3::Y);
        assert_vec3_near(e.normal(), Vec3::Y);
        assert_eq!(e.material(), MaterialRef(11));
        assert_vec2_near(e.texture_coordinates(), Vec2::new(0.5, 0.5));
        e.advance(&mut rng);

        assert!(!e.has_next());
    }

    #[test]
    fn test_difference_b_then_a() {
        let mut rng = Pcg32::new(0, 0);
        let mut e = subtract(Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y), &mut rng);

        assert!(!e.is_exit());
        assert_near(e.t(), 9.0);
        assert_vec3_near(e.normal(), Vec3::Y);
        assert_eq!(e.material(), MaterialRef(11));
        e.advance(&mut rng);

        assert!(e.is_exit());
        assert_near(e.t(), 10.0);
        assert_vec3_near(e.normal(), -Vec3::Y);
        assert_eq!(e.material(), MaterialRef(5));
        e.advance(&mut rng);

        assert!(!e.has_next());
    }

    #[test]
    fn test_difference_through_cavity() {
        let mut rng = Pcg32::new(0, 0);
        let mut e = subtract(Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z), &mut rng);

        let expected = [
            (3.0, false, -Vec3::Z, 9, Vec2::new(0.25, 0.5)),
            (4.0, true, Vec3::Z, 15, Vec2::new(0.25, 1.0 / 6.0)),
            (6.0, false, -Vec3::Z, 15, Vec2::new(0.75, 1.0 / 6.0)),
            (7.0, true, Vec3::Z, 9, Vec2::new(0.75, 0.5)),
        ];
        for (t, is_exit, normal, material, uv) in expected {
            assert!(e.has_next());
            assert_eq!(e.is_exit(), is_exit);
            assert_near(e.t(), t);
            assert_vec3_near(e.normal(), normal);
            assert_eq!(e.material(), MaterialRef(material));
            assert_vec2_near(e.texture_coordinates(), uv);
            e.advance(&mut rng);
        }
        assert!(!e.has_next());
    }

    #[test]
    fn test_difference_misses_subtrahend() {
        let mut rng = Pcg32::new(0, 0);
        let mut e = subtract(Ray::new(Vec3::new(1.5, 2.0, 5.0), -Vec3::Z), &mut rng);

        assert_near(e.t(), 3.677_124_5);
        assert_vec3_near(e.normal(), Vec3::new(0.75, 0.0, 0.661_437_7));
        assert_eq!(e.material(), MaterialRef(9));
        assert_vec2_near(e.texture_coordinates(), Vec2::new(0.884_973_35, 0.5));
        e.advance(&mut rng);

        assert!(e.is_exit());
        assert_near(e.t(), 6.322_875_5);
        assert_vec2_near(e.texture_coordinates(), Vec2::new(0.115_026_72, 0.5));
        e.advance(&mut rng);
        assert!(!e.has_next());
    }

    #[test]
    fn test_difference_only_subtrahend_is_empty() {
        let mut rng = Pcg32::new(0, 0);
        let e = subtract(Ray::new(Vec3::new(0.0, 5.0, -5.0), Vec3::Z), &mut rng);

        assert!(!e.has_next());
    }

    #[test]
    fn test_nested_combo_is_carved_out() {
        let mut rng = Pcg32::new(0, 0);
        let cube = Cuboid::new(Transform::from_translation(-Vec3::ONE), Vec3::splat(2.0), MaterialRef(11));
        let sphere = Sphere::new(Vec3::ZERO, 1.2, MaterialRef(21));
        let drill = Cylinder::new(Transform::from_translation(Vec3::new(0.0, -2.0, 0.0)), 0.5, 4.0, MaterialRef(31));
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);

        let rounded = CompositionHits::new(
            Combinator::intersection(2),
            vec![cube.hits(&ray), sphere.hits(&ray)],
            &mut rng,
        );
        assert!(rounded.has_next());

        let carved = CompositionHits::new(
            Combinator::DIFFERENCE,
            vec![
                CompositionHits::new(Combinator::intersection(2), vec![cube.hits(&ray), sphere.hits(&ray)], &mut rng),
                CompositionHits::new(Combinator::UNION, vec![drill.hits(&ray)], &mut rng),
            ],
            &mut rng,
        );
        assert!(!carved.has_next());
    }

    #[test]
    fn test_tie_prefers_first_child() {
        let mut rng = Pcg32::new(0, 0);
        let a = Sphere::new(Vec3::ZERO, 1.0, MaterialRef(1));
        let b = Sphere::new(Vec3::ZERO, 1.0, MaterialRef(2));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let e = CompositionHits::new(Combinator::UNION, vec![a.hits(&ray), b.hits(&ray)], &mut rng);
        assert_eq!(e.material(), MaterialRef(1));

        let e = CompositionHits::new(Combinator::UNION, vec![b.hits(&ray), a.hits(&ray)], &mut rng);
        assert_eq!(e.material(), MaterialRef(2));
    }

    #[test]
    fn test_events_alternate() {
        let mut rng = Pcg32::new(3, 0);
        let spheres: Vec<Sphere> = (0..4)
            .map(|i| Sphere::new(Vec3::new(i as f32 * 0.7, 0.0, 0.0), 0.5, MaterialRef(i)))
            .collect();
        let ray = Ray::new(Vec3::new(-5.0, 0.1, 0.0), Vec3::X);

        let mut e = CompositionHits::new(Combinator::UNION, spheres.iter().map(|s| s.hits(&ray)).collect(), &mut rng);
        let events = collect_events(&mut e, &mut rng);

        assert_eq!(events.len() % 2, 0);
        for (i, (_, is_exit)) in events.iter().enumerate() {
            assert_eq!(*is_exit, i % 2 == 1);
        }
        assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    fn random_sphere(rng: &mut Pcg32, material: u32) -> Sphere {
        let center = Vec3::new(
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
        );
        Sphere::new(center, 0.3 + rng.next_f32() * 0.9, MaterialRef(material))
    }

    fn inside(spans: &[(f32, f32)], t: f32) -> bool {
        spans.iter().any(|&(a, b)| a <= t && t <= b)
    }

    fn near_boundary(spans: &[(f32, f32)], t: f32) -> bool {
        spans.iter().any(|&(a, b)| (a - t).abs() < 1e-3 || (b - t).abs() < 1e-3)
    }

    #[test]
    fn test_set_operations_match_dense_sampling() {
        let mut rng = Pcg32::new(2024, 7);

        for _ in 0..300 {
            let shapes: Vec<Sphere> = (0..3).map(|i| random_sphere(&mut rng, i)).collect();
            let origin = rng.unit_vector_3d() * 6.0;
            let target = Vec3::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5);
            let ray = Ray::new(origin, (target - origin).normalize());

            let child_spans: Vec<Vec<(f32, f32)>> = shapes
                .iter()
                .map(|s| inside_spans(&mut s.hits(&ray), &mut rng))
                .collect();

            let operators: [(Combinator, fn(&[bool]) -> bool); 3] = [
                (Combinator::UNION, |c| c.iter().any(|&x| x)),
                (Combinator::intersection(3), |c| c.iter().all(|&x| x)),
                (Combinator::DIFFERENCE, |c| c[0] && !c[1..].iter().any(|&x| x)),
            ];

            for (combinator, expected) in operators {
                let children = shapes.iter().map(|s| s.hits(&ray)).collect();
                let mut composed = CompositionHits::new(combinator, children, &mut rng);
                let spans = inside_spans(&mut composed, &mut rng);

                for step in 0..=240 {
                    let t = step as f32 * 0.05;
                    if child_spans.iter().any(|s| near_boundary(s, t)) {
                        continue;
                    }
                    let contained: Vec<bool> = child_spans.iter().map(|s| inside(s, t)).collect();
                    assert_eq!(
                        inside(&spans, t),
                        expected(&contained),
                        "{combinator:?} disagrees at t={t} along {ray:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_subtracted_normals_are_negated() {
        let mut rng = Pcg32::new(99, 1);
        let mut checked = 0;

        for _ in 0..200 {
            let a = random_sphere(&mut rng, 0);
            let b = random_sphere(&mut rng, 1);
            let origin = rng.unit_vector_3d() * 6.0;
            let ray = Ray::new(origin, (a.center() - origin).normalize());

            let mut composed = CompositionHits::new(Combinator::DIFFERENCE, vec![a.hits(&ray), b.hits(&ray)], &mut rng);
            while composed.has_next() {
                if composed.material() == MaterialRef(1) {
                    let mut own = b.hits(&ray);
                    while own.has_next() && own.t() != composed.t() {
                        own.advance(&mut rng);
                    }
                    assert!(own.has_next());
                    assert_vec3_near(composed.normal(), -own.normal());
                    checked += 1;
                }
                composed.advance(&mut rng);
            }
        }

        assert!(checked > 0);
    }
}
