use geo::{BoundingRect, Intersects};
use std::collections::BTreeMap;

use crate::geometry::{overlaps, MultiPolygon, Polygon, Rect};

pub mod collision;

pub use collision::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Collision geometry of one block: the union of its convex pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub polygons: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl Footprint {
    pub fn new(polygons: Vec<Polygon<f64>>) -> Self {
        let polygons = MultiPolygon(polygons);
        let bounds = polygons.bounding_rect();
        Self { polygons, bounds }
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        match (self.bounds, other.bounds) {
            (Some(a), Some(b)) if a.intersects(&b) => {}
            _ => return false,
        }
        self.polygons.0.iter().any(|p| {
            let Some(p_bounds) = p.bounding_rect() else {
                return false;
            };
            other.polygons.0.iter().any(|q| {
                q.bounding_rect().map_or(false, |q_bounds| p_bounds.intersects(&q_bounds)) && overlaps(p, q)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.polygons.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }
}

/// The placement oracle blocks are constructed against.
pub trait WorldContext {
    /// Attaches `footprint` unless it overlaps something already attached.
    fn attach(&mut self, footprint: Footprint) -> Option<BodyHandle>;
    fn attach_unchecked(&mut self, footprint: Footprint) -> BodyHandle;
    fn detach(&mut self, handle: BodyHandle) -> bool;
    fn overlaps(&self, footprint: &Footprint) -> bool;
    fn body_count(&self) -> usize;
}

pub enum World {
    Collision(CollisionWorld),
    // Accepts everything; used when replaying a stored recipe
    Permissive(PermissiveWorld),
}

impl World {
    pub fn new_collision() -> Self {
        World::Collision(CollisionWorld::new())
    }

    pub fn new_permissive() -> Self {
        World::Permissive(PermissiveWorld::default())
    }
}

impl WorldContext for World {
    fn attach(&mut self, footprint: Footprint) -> Option<BodyHandle> {
        match self {
            World::Collision(world) => world.attach(footprint),
            World::Permissive(world) => world.attach(footprint),
        }
    }

    fn attach_unchecked(&mut self, footprint: Footprint) -> BodyHandle {
        match self {
            World::Collision(world) => world.attach_unchecked(footprint),
            World::Permissive(world) => world.attach_unchecked(footprint),
        }
    }

    fn detach(&mut self, handle: BodyHandle) -> bool {
        match self {
            World::Collision(world) => world.detach(handle),
            World::Permissive(world) => world.detach(handle),
        }
    }

    fn overlaps(&self, footprint: &Footprint) -> bool {
        match self {
            World::Collision(world) => world.overlaps(footprint),
            World::Permissive(world) => world.overlaps(footprint),
        }
    }

    fn body_count(&self) -> usize {
        match self {
            World::Collision(world) => world.body_count(),
            World::Permissive(world) => world.body_count(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PermissiveWorld {
    next_handle: u64,
    bodies: BTreeMap<BodyHandle, usize>,
}

impl WorldContext for PermissiveWorld {
    fn attach(&mut self, footprint: Footprint) -> Option<BodyHandle> {
        Some(self.attach_unchecked(footprint))
    }

    fn attach_unchecked(&mut self, footprint: Footprint) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, footprint.len());
        handle
    }

    fn detach(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn overlaps(&self, _footprint: &Footprint) -> bool {
        false
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
