//! Scene assembly and nearest-hit queries.

use crate::arena::{NodeId, ShapeArena};
use crate::hit::{HitEnumerator, HitEvent, MaterialRef};
use crate::material::Material;
use lumen_math::{Aabb, Interval, Pcg32, Ray};
use thiserror::Error;

/// Errors that can occur while building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Node {0:?} does not exist in the arena")]
    UnknownNode(NodeId),

    #[error("Composition needs at least one child")]
    EmptyComposition,

    #[error("Threshold {threshold} is outside 1..={children} for a composition of {children} children")]
    InvalidThreshold { threshold: u32, children: usize },

    #[error("Material {material:?} is out of range ({len} materials)")]
    MaterialOutOfRange { material: MaterialRef, len: usize },
}

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Clone, Copy)]
struct Root {
    node: NodeId,
    bbox: Aabb,
}

/// Shape trees, the roots that are rendered and the material table they
/// index into.
#[derive(Debug, Clone)]
pub struct Scene {
    arena: ShapeArena,
    roots: Vec<Root>,
    materials: Vec<Material>,
}

impl Scene {
    /// Assemble a scene, checking that every root exists and every material
    /// reference in the arena indexes `materials`.
    pub fn new(arena: ShapeArena, roots: Vec<NodeId>, materials: Vec<Material>) -> SceneResult<Self> {
        for &root in &roots {
            if arena.node(root).is_none() {
                return Err(SceneError::UnknownNode(root));
            }
        }

        for (id, _) in arena.nodes() {
            for material in arena.materials(id) {
                if material.index() >= materials.len() {
                    return Err(SceneError::MaterialOutOfRange {
                        material,
                        len: materials.len(),
                    });
                }
            }
        }

        let roots: Vec<Root> = roots
            .into_iter()
            .map(|node| Root {
                node,
                bbox: arena.bounding_box(node),
            })
            .collect();

        log::info!(
            "Scene: {} nodes, {} roots, {} materials",
            arena.len(),
            roots.len(),
            materials.len()
        );

        Ok(Self {
            arena,
            roots,
            materials,
        })
    }

    pub fn arena(&self) -> &ShapeArena {
        &self.arena
    }

    #[inline]
    pub fn material(&self, material: MaterialRef) -> &Material {
        &self.materials[material.index()]
    }

    /// Bounds of all roots.
    pub fn bounding_box(&self) -> Aabb {
        self.roots
            .iter()
            .fold(Aabb::EMPTY, |acc, root| Aabb::surrounding(&acc, &root.bbox))
    }

    /// Closest boundary event over all roots with `ray_t.min <= t < ray_t.max`.
    ///
    /// The lower bound is inclusive so that a fog sample drawn exactly at
    /// `ray_t.min` is still reported.
    pub fn nearest_hit(&self, ray: &Ray, ray_t: Interval, rng: &mut Pcg32) -> Option<HitEvent> {
        let mut closest: Option<HitEvent> = None;
        let mut closest_t = ray_t.max;

        for root in &self.roots {
            if !root.bbox.hit(ray, Interval::new(ray_t.min, closest_t)) {
                continue;
            }

            let mut hits = self.arena.hits(root.node, ray, ray_t.min, rng);
            while hits.has_next() {
                let t = hits.t();
                if t >= closest_t {
                    break;
                }
                if Interval::new(ray_t.min, closest_t).contains(t) {
                    closest_t = t;
                    closest = Some(hits.event(ray));
                    break;
                }
                hits.advance(rng);
            }
        }

        closest
    }
}
