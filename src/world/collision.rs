use std::collections::BTreeMap;

use super::{BodyHandle, Footprint, WorldContext};
use crate::geometry::Polygon;

#[derive(Debug, Clone)]
struct Body {
    footprint: Footprint,
    forbidden: bool,
}

/// Exact overlap oracle over `geo` polygons.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    next_handle: u64,
    bodies: BTreeMap<BodyHandle, Body>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, footprint: Footprint, forbidden: bool) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, Body { footprint, forbidden });
        handle
    }

    /// Marks an area no road may enter. Forbidden zones are never detached
    /// by block destruction.
    pub fn add_forbidden_zone(&mut self, zone: Polygon<f64>) -> BodyHandle {
        self.insert(Footprint::new(vec![zone]), true)
    }

    pub fn forbidden_zone_count(&self) -> usize {
        self.bodies.values().filter(|b| b.forbidden).count()
    }

    pub fn footprint(&self, handle: BodyHandle) -> Option<&Footprint> {
        self.bodies.get(&handle).map(|b| &b.footprint)
    }

    /// Pairs of attached bodies that overlap each other. Bodies attached
    /// unchecked are included, so this can find overlaps attach() would
    /// have refused.
    pub fn overlapping_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let bodies: Vec<_> = self.bodies.iter().collect();
        let mut pairs = Vec::new();
        for (i, (a, body_a)) in bodies.iter().enumerate() {
            for (b, body_b) in &bodies[i + 1..] {
                if body_a.footprint.overlaps(&body_b.footprint) {
                    pairs.push((**a, **b));
                }
            }
        }
        pairs
    }

    pub fn validate_no_overlap(&self) -> bool {
        self.overlapping_pairs().is_empty()
    }
}

impl WorldContext for CollisionWorld {
    fn attach(&mut self, footprint: Footprint) -> Option<BodyHandle> {
        if self.overlaps(&footprint) {
            log::trace!("attach refused: footprint of {} polygons overlaps", footprint.len());
            return None;
        }
        Some(self.insert(footprint, false))
    }

    fn attach_unchecked(&mut self, footprint: Footprint) -> BodyHandle {
        self.insert(footprint, false)
    }

    fn detach(&mut self, handle: BodyHandle) -> bool {
        match self.bodies.get(&handle) {
            Some(body) if !body.forbidden => self.bodies.remove(&handle).is_some(),
            _ => false,
        }
    }

    fn overlaps(&self, footprint: &Footprint) -> bool {
        self.bodies
            .values()
            .any(|body| body.footprint.overlaps(footprint))
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
