//! Shape trees stored in a flat arena.
//!
//! Nodes reference their children by [`NodeId`]. A node can only reference
//! nodes inserted before it, so every tree in the arena is acyclic.

use crate::csg::{Combinator, CompositionHits};
use crate::hit::{HitEnumerator, MaterialRef};
use crate::primitive::{Primitive, PrimitiveHits};
use crate::scene::SceneError;
use crate::volume::{VolumeHits, MIN_DENSITY};
use lumen_math::{Aabb, Pcg32, Ray, Vec2, Vec3};

/// Handle to a node in a [`ShapeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Primitive(Primitive),
    Composition {
        combinator: Combinator,
        children: Vec<NodeId>,
    },
    Volume {
        child: NodeId,
        density: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ShapeArena {
    nodes: Vec<Node>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i as u32), node))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        log::debug!("Arena node {}: {:?}", id.0, node);
        self.nodes.push(node);
        id
    }

    fn check(&self, id: NodeId) -> Result<NodeId, SceneError> {
        if id.index() < self.nodes.len() {
            Ok(id)
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }

    /// Add a leaf shape.
    pub fn add(&mut self, primitive: impl Into<Primitive>) -> NodeId {
        self.push(Node::Primitive(primitive.into()))
    }

    /// Add a composition of existing nodes. Child order matters: it breaks
    /// ties between coincident boundaries and selects the minuend of a
    /// difference. The threshold must lie in `1..=children.len()`.
    pub fn compose(&mut self, combinator: Combinator, children: &[NodeId]) -> Result<NodeId, SceneError> {
        if children.is_empty() {
            return Err(SceneError::EmptyComposition);
        }
        if combinator.threshold == 0 || combinator.threshold as usize > children.len() {
            return Err(SceneError::InvalidThreshold {
                threshold: combinator.threshold,
                children: children.len(),
            });
        }
        for &child in children {
            self.check(child)?;
        }

        Ok(self.push(Node::Composition {
            combinator,
            children: children.to_vec(),
        }))
    }

    pub fn union(&mut self, children: &[NodeId]) -> Result<NodeId, SceneError> {
        self.compose(Combinator::UNION, children)
    }

    pub fn intersection(&mut self, children: &[NodeId]) -> Result<NodeId, SceneError> {
        self.compose(Combinator::intersection(children.len()), children)
    }

    /// The first child with every later child carved out of it.
    pub fn difference(&mut self, children: &[NodeId]) -> Result<NodeId, SceneError> {
        self.compose(Combinator::DIFFERENCE, children)
    }

    /// Fill a closed node with a constant-density medium.
    pub fn volume(&mut self, child: NodeId, density: f32) -> Result<NodeId, SceneError> {
        self.check(child)?;
        if !(density > MIN_DENSITY) {
            log::warn!("Volume density {density} is not positive, the medium will never scatter");
        }
        Ok(self.push(Node::Volume { child, density }))
    }

    /// Conservative world-space bounds of a node.
    pub fn bounding_box(&self, id: NodeId) -> Aabb {
        match &self.nodes[id.index()] {
            Node::Primitive(primitive) => primitive.bounding_box(),
            Node::Composition { combinator, children } => {
                let mut boxes = children.iter().map(|&child| self.bounding_box(child));
                let first = boxes.next().unwrap_or(Aabb::EMPTY);
                if combinator.subtract {
                    first
                } else if combinator.threshold as usize >= children.len() {
                    boxes.fold(first, |acc, b| Aabb::intersection(&acc, &b))
                } else {
                    boxes.fold(first, |acc, b| Aabb::surrounding(&acc, &b))
                }
            }
            Node::Volume { child, .. } => self.bounding_box(*child),
        }
    }

    /// Every material reachable from a node.
    pub fn materials(&self, id: NodeId) -> Vec<MaterialRef> {
        match &self.nodes[id.index()] {
            Node::Primitive(primitive) => primitive.materials(),
            Node::Composition { children, .. } => children.iter().flat_map(|&child| self.materials(child)).collect(),
            Node::Volume { child, .. } => self.materials(*child),
        }
    }

    /// Boundary events of `ray` against the tree rooted at `id`.
    ///
    /// `t_min` is where fog volumes start measuring free paths.
    pub fn hits(&self, id: NodeId, ray: &Ray, t_min: f32, rng: &mut Pcg32) -> Cursor {
        match &self.nodes[id.index()] {
            Node::Primitive(primitive) => Cursor::Primitive(primitive.hits(ray)),
            Node::Composition { combinator, children } => {
                let hits = children
                    .iter()
                    .map(|&child| self.hits(child, ray, t_min, rng))
                    .collect();
                Cursor::Composition(CompositionHits::new(*combinator, hits, rng))
            }
            Node::Volume { child, density } => {
                let inner = self.hits(*child, ray, t_min, rng);
                Cursor::Volume(Box::new(VolumeHits::new(inner, *ray, *density, t_min, rng)))
            }
        }
    }
}

/// Event stream of any node in the arena.
#[derive(Debug, Clone)]
pub enum Cursor {
    Primitive(PrimitiveHits),
    Composition(CompositionHits<Cursor>),
    Volume(Box<VolumeHits<Cursor>>),
}

impl HitEnumerator for Cursor {
    fn has_next(&self) -> bool {
        match self {
            Cursor::Primitive(h) => h.has_next(),
            Cursor::Composition(h) => h.has_next(),
            Cursor::Volume(h) => h.has_next(),
        }
    }

    fn advance(&mut self, rng: &mut Pcg32) {
        match self {
            Cursor::Primitive(h) => h.advance(rng),
            Cursor::Composition(h) => h.advance(rng),
            Cursor::Volume(h) => h.advance(rng),
        }
    }

    fn is_exit(&self) -> bool {
        match self {
            Cursor::Primitive(h) => h.is_exit(),
            Cursor::Composition(h) => h.is_exit(),
            Cursor::Volume(h) => h.is_exit(),
        }
    }

    fn t(&self) -> f32 {
        match self {
            Cursor::Primitive(h) => h.t(),
            Cursor::Composition(h) => h.t(),
            Cursor::Volume(h) => h.t(),
        }
    }

    fn point(&self) -> Vec3 {
        match self {
            Cursor::Primitive(h) => h.point(),
            Cursor::Composition(h) => h.point(),
            Cursor::Volume(h) => h.point(),
        }
    }

    fn normal(&self) -> Vec3 {
        match self {
            Cursor::Primitive(h) => h.normal(),
            Cursor::Composition(h) => h.normal(),
            Cursor::Volume(h) => h.normal(),
        }
    }

    fn material(&self) -> MaterialRef {
        match self {
            Cursor::Primitive(h) => h.material(),
            Cursor::Composition(h) => h.material(),
            Cursor::Volume(h) => h.material(),
        }
    }

    fn texture_coordinates(&self) -> Vec2 {
        match self {
            Cursor::Primitive(h) => h.texture_coordinates(),
            Cursor::Composition(h) => h.texture_coordinates(),
            Cursor::Volume(h) => h.texture_coordinates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::Cuboid;
    use crate::hit::test_support::*;
    use crate::sphere::Sphere;

    fn carved_cube(arena: &mut ShapeArena) -> NodeId {
        let cube = arena.add(Cuboid::from_corners(Vec3::ZERO, Vec3::ONE, MaterialRef(0)));
        let cavity = arena.add(Sphere::new(Vec3::splat(0.5), 0.5, MaterialRef(1)));
        arena.difference(&[cube, cavity]).unwrap()
    }

    #[test]
    fn test_compose_validates_children() {
        let mut arena = ShapeArena::new();
        let sphere = arena.add(Sphere::new(Vec3::ZERO, 1.0, MaterialRef(0)));

        assert!(matches!(arena.union(&[]), Err(SceneError::EmptyComposition)));
        assert!(matches!(
            arena.union(&[sphere, NodeId(7)]),
            Err(SceneError::UnknownNode(NodeId(7)))
        ));
        assert!(matches!(arena.volume(NodeId(3), 1.0), Err(SceneError::UnknownNode(_))));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_compose_validates_threshold() {
        let mut arena = ShapeArena::new();
        let a = arena.add(Sphere::new(Vec3::ZERO, 1.0, MaterialRef(0)));
        let b = arena.add(Sphere::new(Vec3::X, 1.0, MaterialRef(0)));

        let always_inside = Combinator {
            threshold: 0,
            subtract: false,
        };
        assert!(matches!(
            arena.compose(always_inside, &[a, b]),
            Err(SceneError::InvalidThreshold { threshold: 0, children: 2 })
        ));
        assert!(matches!(
            arena.compose(Combinator::intersection(3), &[a, b]),
            Err(SceneError::InvalidThreshold { threshold: 3, children: 2 })
        ));
        assert_eq!(arena.len(), 2);

        // Inside at least two of three children
        let c = arena.add(Sphere::new(Vec3::Y, 1.0, MaterialRef(0)));
        let majority = Combinator {
            threshold: 2,
            subtract: false,
        };
        assert!(arena.compose(majority, &[a, b, c]).is_ok());
    }

    #[test]
    fn test_difference_off_axis_has_two_shells() {
        let mut arena = ShapeArena::new();
        let root = carved_cube(&mut arena);
        let mut rng = Pcg32::new(0, 0);
        let ray = Ray::new(Vec3::new(0.5, 0.6, -5.0), Vec3::Z);

        let spans = inside_spans(&mut arena.hits(root, &ray, 0.0, &mut rng), &mut rng);
        let half_chord = (0.25f32 - 0.01).sqrt();

        assert_eq!(spans.len(), 2);
        assert_near(spans[0].0, 5.0);
        assert_near(spans[0].1, 5.5 - half_chord);
        assert_near(spans[1].0, 5.5 + half_chord);
        assert_near(spans[1].1, 6.0);
    }

    #[test]
    fn test_nested_volume_in_composition() {
        let mut arena = ShapeArena::new();
        let fog_shape = arena.add(Sphere::new(Vec3::ZERO, 1.0, MaterialRef(2)));
        let fog = arena.volume(fog_shape, 1e6).unwrap();
        let wall = arena.add(Cuboid::from_corners(Vec3::new(-0.1, -2.0, -2.0), Vec3::new(0.1, 2.0, 2.0), MaterialRef(3)));
        let root = arena.union(&[fog, wall]).unwrap();
        let mut rng = Pcg32::new(9, 9);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);

        let cursor = arena.hits(root, &ray, 0.0, &mut rng);

        // Dense fog scatters right at the sphere surface, before the wall
        assert!(cursor.has_next());
        assert!((cursor.t() - 4.0).abs() < 1e-3);
        assert_eq!(cursor.material(), MaterialRef(2));
        assert_vec3_near(cursor.normal(), -Vec3::X);
    }

    #[test]
    fn test_bounding_boxes() {
        let mut arena = ShapeArena::new();
        let a = arena.add(Sphere::new(Vec3::ZERO, 1.0, MaterialRef(0)));
        let b = arena.add(Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0, MaterialRef(0)));
        let union = arena.union(&[a, b]).unwrap();
        let intersection = arena.intersection(&[a, b]).unwrap();
        let difference = arena.difference(&[a, b]).unwrap();
        let fog = arena.volume(union, 0.5).unwrap();

        assert_near(arena.bounding_box(union).x.min, -1.0);
        assert_near(arena.bounding_box(union).x.max, 2.0);
        assert_near(arena.bounding_box(intersection).x.min, 0.0);
        assert_near(arena.bounding_box(intersection).x.max, 1.0);
        assert_eq!(arena.bounding_box(difference), arena.bounding_box(a));
        assert_eq!(arena.bounding_box(fog), arena.bounding_box(union));
    }

    #[test]
    fn test_materials_are_collected() {
        let mut arena = ShapeArena::new();
        let root = carved_cube(&mut arena);
        let mut materials = arena.materials(root);
        materials.sort();
        materials.dedup();

        assert_eq!(materials, vec![MaterialRef(0), MaterialRef(1)]);
        assert_eq!(arena.nodes().count(), 3);
        assert!(matches!(arena.node(root), Some(Node::Composition { .. })));
    }
}
