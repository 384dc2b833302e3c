//! Boundary events and the enumerator contract shared by every shape.
//!
//! A ray query against a solid produces an ordered stream of boundary
//! events: each event is either an entry into or an exit out of the solid.
//! Enumerators are pull-based:
//!
//! ```ignore
//! let mut hits = sphere.hits(&ray);
//! while hits.has_next() {
//!     println!("{} at t={}", if hits.is_exit() { "exit" } else { "entry" }, hits.t());
//!     hits.advance(&mut rng);
//! }
//! ```
//!
//! Accessors may only be called while `has_next()` is true. Debug builds
//! check this; release builds return unspecified values.

use lumen_math::{Pcg32, Ray, Vec2, Vec3};

/// Index of a material in the scene's flat material buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MaterialRef(pub u32);

impl MaterialRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which side of a surface the ray arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// The ray hit the outside of the surface.
    Front,
    /// The ray hit the inside of the surface.
    Back,
}

/// A resolved ray-surface hit, ready for material evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    /// Ray parameter of the hit
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub face: Face,
    /// Material at the intersection point
    pub material: MaterialRef,
    /// UV texture coordinates
    pub uv: Vec2,
}

impl HitEvent {
    /// Build a hit from the surface's outward normal.
    ///
    /// The stored normal is flipped to point against `ray_direction` and the
    /// face records whether that flip happened.
    pub fn new(
        t: f32,
        point: Vec3,
        outward_normal: Vec3,
        ray_direction: Vec3,
        material: MaterialRef,
        uv: Vec2,
    ) -> Self {
        let (normal, face) = if outward_normal.dot(ray_direction) > 0.0 {
            (-outward_normal, Face::Back)
        } else {
            (outward_normal, Face::Front)
        };

        Self {
            t,
            point,
            normal,
            face,
            material,
            uv,
        }
    }

    /// True if the ray arrived from outside the surface.
    #[inline]
    pub fn is_front_face(&self) -> bool {
        self.face == Face::Front
    }
}

/// Pull-based stream of boundary events along a ray, ordered by `t`.
pub trait HitEnumerator {
    /// True while there is a current event.
    fn has_next(&self) -> bool;

    /// Move to the next event. Must only be called while `has_next()`.
    ///
    /// Participating media draw their scatter distance from `rng`; surfaces
    /// ignore it.
    fn advance(&mut self, rng: &mut Pcg32);

    /// True if the current event leaves the solid.
    fn is_exit(&self) -> bool;

    /// Ray parameter of the current event.
    fn t(&self) -> f32;

    /// World-space point of the current event.
    fn point(&self) -> Vec3;

    /// Outward-facing normal of the current boundary.
    fn normal(&self) -> Vec3;

    /// Material of the current boundary.
    fn material(&self) -> MaterialRef;

    /// Surface coordinates of the current boundary.
    fn texture_coordinates(&self) -> Vec2;

    /// Snapshot the current event as a [`HitEvent`] for `ray`.
    fn event(&self, ray: &Ray) -> HitEvent {
        HitEvent::new(
            self.t(),
            self.point(),
            self.normal(),
            ray.direction,
            self.material(),
            self.texture_coordinates(),
        )
    }
}

/// One boundary crossing of a primitive, with everything the accessors report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub t: f32,
    pub normal: Vec3,
    pub material: MaterialRef,
    pub uv: Vec2,
}

impl Boundary {
    const NONE: Boundary = Boundary {
        t: f32::INFINITY,
        normal: Vec3::ZERO,
        material: MaterialRef(0),
        uv: Vec2::ZERO,
    };
}

/// Event stream of a convex primitive: either nothing, or an entry followed
/// by an exit.
#[derive(Debug, Clone)]
pub struct ConvexHits {
    ray: Ray,
    boundaries: [Boundary; 2],
    index: usize,
}

impl ConvexHits {
    /// A stream with no events.
    pub fn empty(ray: Ray) -> Self {
        Self {
            ray,
            boundaries: [Boundary::NONE; 2],
            index: 2,
        }
    }

    /// An entry/exit pair, or nothing if the span is degenerate.
    ///
    /// Spans with non-finite ends or `entry.t > exit.t` (including NaN from
    /// a zero denominator) collapse to the empty stream.
    pub fn span(ray: Ray, entry: Boundary, exit: Boundary) -> Self {
        if entry.t.is_finite() && exit.t.is_finite() && entry.t <= exit.t {
            Self {
                ray,
                boundaries: [entry, exit],
                index: 0,
            }
        } else {
            Self::empty(ray)
        }
    }

    #[inline]
    fn current(&self) -> &Boundary {
        debug_assert!(self.has_next(), "accessor called on an exhausted enumerator");
        &self.boundaries[self.index.min(1)]
    }
}

impl HitEnumerator for ConvexHits {
    fn has_next(&self) -> bool {
        self.index < 2
    }

    fn advance(&mut self, _rng: &mut Pcg32) {
        debug_assert!(self.has_next());
        self.index += 1;
    }

    fn is_exit(&self) -> bool {
        self.index == 1
    }

    fn t(&self) -> f32 {
        self.current().t
    }

    fn point(&self) -> Vec3 {
        self.ray.at(self.t())
    }

    fn normal(&self) -> Vec3 {
        self.current().normal
    }

    fn material(&self) -> MaterialRef {
        self.current().material
    }

    fn texture_coordinates(&self) -> Vec2 {
        self.current().uv
    }
}
