use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::error::{Result, RoadGenError};
use crate::geometry::{bounds, Lane, LaneGeometry, Point, Rect};

pub type NodeId = String;

/// Directed key of one lane bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Road {
    pub start: NodeId,
    pub end: NodeId,
}

impl Road {
    pub fn new(start: impl Into<NodeId>, end: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn reversed(&self) -> Road {
        Road::new(self.end.clone(), self.start.clone())
    }
}

impl std::fmt::Display for Road {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneIndex {
    pub start: NodeId,
    pub end: NodeId,
    pub lane: usize,
}

impl LaneIndex {
    pub fn new(road: &Road, lane: usize) -> Self {
        Self {
            start: road.start.clone(),
            end: road.end.clone(),
            lane,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadNetwork {
    graph: BTreeMap<NodeId, BTreeMap<NodeId, Vec<Lane>>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lane_bundle(&mut self, start: &str, end: &str, lanes: Vec<Lane>) -> Result<()> {
        if lanes.is_empty() {
            return Err(RoadGenError::InvalidParameter(format!(
                "lane bundle {} -> {} has no lanes",
                start, end
            )));
        }
        if start == end {
            return Err(RoadGenError::InvalidParameter(format!(
                "lane bundle {} -> {} is a self-loop",
                start, end
            )));
        }
        let successors = self.graph.entry(start.to_string()).or_default();
        if successors.contains_key(end) {
            return Err(RoadGenError::DuplicateBundle {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        successors.insert(end.to_string(), lanes);
        Ok(())
    }

    pub fn remove_lane_bundle(&mut self, start: &str, end: &str) -> Result<Vec<Lane>> {
        let not_found = || RoadGenError::NotFound {
            start: start.to_string(),
            end: end.to_string(),
        };
        let successors = self.graph.get_mut(start).ok_or_else(not_found)?;
        let lanes = successors.remove(end).ok_or_else(not_found)?;
        if successors.is_empty() {
            self.graph.remove(start);
        }
        Ok(lanes)
    }

    pub fn get_bundle(&self, start: &str, end: &str) -> Option<&[Lane]> {
        self.graph
            .get(start)
            .and_then(|successors| successors.get(end))
            .map(Vec::as_slice)
    }

    pub fn get_road(&self, road: &Road) -> Option<&[Lane]> {
        self.get_bundle(&road.start, &road.end)
    }

    pub fn get_lane(&self, index: &LaneIndex) -> Option<&Lane> {
        self.get_bundle(&index.start, &index.end)
            .and_then(|lanes| lanes.get(index.lane))
    }

    pub fn contains_bundle(&self, start: &str, end: &str) -> bool {
        self.get_bundle(start, end).is_some()
    }

    /// Successors of `node`, in key order. Cloning the iterator restarts it.
    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a NodeId> + Clone + 'a {
        self.graph
            .get(node)
            .into_iter()
            .flat_map(|successors| successors.keys())
    }

    /// Every node that starts or ends a bundle, sorted.
    pub fn nodes(&self) -> Vec<&NodeId> {
        let mut nodes: Vec<&NodeId> = self
            .graph
            .iter()
            .flat_map(|(start, successors)| std::iter::once(start).chain(successors.keys()))
            .collect();
        nodes.sort();
        nodes.dedup();
        nodes
    }

    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &[Lane])> + '_ {
        self.graph.iter().flat_map(|(start, successors)| {
            successors
                .iter()
                .map(move |(end, lanes)| (start, end, lanes.as_slice()))
        })
    }

    pub fn edge_keys(&self) -> Vec<(NodeId, NodeId)> {
        self.edges()
            .map(|(start, end, _)| (start.clone(), end.clone()))
            .collect()
    }

    pub fn bundle_count(&self) -> usize {
        self.graph.values().map(BTreeMap::len).sum()
    }

    pub fn lane_count(&self) -> usize {
        self.edges().map(|(_, _, lanes)| lanes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Axis-aligned bounds of every lane edge; `None` for an empty network.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        let mut points = Vec::new();
        for (_, _, lanes) in self.edges() {
            for lane in lanes {
                let half = lane.width() / 2.0;
                for s in [0.0, lane.length() / 2.0, lane.length()] {
                    points.push(lane.position(s, -half));
                    points.push(lane.position(s, half));
                }
            }
        }
        bounds(&points)
    }

    pub fn position_on_lane(&self, index: &LaneIndex, longitudinal: f64, lateral: f64) -> Option<Point> {
        self.get_lane(index)
            .map(|lane| lane.position(longitudinal, lateral))
    }

    /// Breadth-first route over bundles; returns the visited node sequence.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<NodeId>> {
        if from == to {
            return Some(vec![from.to_string()]);
        }
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        previous.insert(from, from);

        while let Some(node) = queue.pop_front() {
            for next in self.neighbors(node) {
                if previous.contains_key(next.as_str()) {
                    continue;
                }
                previous.insert(next, node);
                if next == to {
                    let mut path = vec![to.to_string()];
                    let mut current = to;
                    while current != from {
                        current = previous[current];
                        path.push(current.to_string());
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}
