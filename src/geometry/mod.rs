use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::Result;

pub mod circular;
pub mod polygon;
pub mod straight;

pub use circular::*;
pub use polygon::*;
pub use straight::*;

pub type Vec2 = Vector2<f64>;
pub type Point = Point2<f64>;

pub const DEFAULT_LANE_WIDTH: f64 = 3.5;
pub const DEFAULT_SPEED_LIMIT: f64 = 1000.0;

// Cross-section spacing used when turning curved lanes into polygons
pub const FOOTPRINT_RESOLUTION: f64 = 2.0;

// Longitudinal inset applied to both ends of every lane footprint, so that
// blocks meeting end-to-end at a socket only touch, never overlap
pub const FOOTPRINT_END_MARGIN: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    None,
    Broken,
    Continuous,
    Side,
}

impl Default for LineType {
    fn default() -> Self {
        LineType::Broken
    }
}

/// Attributes shared by every lane shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneAttributes {
    pub width: f64,
    pub line_types: [LineType; 2],
    pub forbidden: bool,
    pub speed_limit: f64,
    pub priority: i32,
}

impl Default for LaneAttributes {
    fn default() -> Self {
        Self {
            width: DEFAULT_LANE_WIDTH,
            line_types: [LineType::Broken, LineType::Broken],
            forbidden: false,
            speed_limit: DEFAULT_SPEED_LIMIT,
            priority: 0,
        }
    }
}

impl LaneAttributes {
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_line_types(mut self, left: LineType, right: LineType) -> Self {
        self.line_types = [left, right];
        self
    }
}

/// Lane-local frame: `longitudinal` runs along the lane from its start,
/// `lateral` is positive to the left of the direction of travel.
pub trait LaneGeometry {
    fn length(&self) -> f64;
    fn position(&self, longitudinal: f64, lateral: f64) -> Point;
    fn heading_at(&self, longitudinal: f64) -> f64;
    fn width_at(&self, longitudinal: f64) -> f64;
    fn local_coordinates(&self, position: &Point) -> (f64, f64);

    fn direction_at(&self, longitudinal: f64) -> Vec2 {
        heading_vector(self.heading_at(longitudinal))
    }

    fn direction_lateral_at(&self, longitudinal: f64) -> Vec2 {
        rotate_ccw(&self.direction_at(longitudinal))
    }

    fn start(&self) -> Point {
        self.position(0.0, 0.0)
    }

    fn end(&self) -> Point {
        self.position(self.length(), 0.0)
    }

    fn on_lane(&self, position: &Point, margin: f64) -> bool {
        let (longitudinal, lateral) = self.local_coordinates(position);
        lateral.abs() <= self.width_at(longitudinal) / 2.0 + margin
            && longitudinal >= -margin
            && longitudinal <= self.length() + margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Lane {
    Straight(StraightLane),
    Circular(CircularLane),
}

impl Lane {
    pub fn attributes(&self) -> &LaneAttributes {
        match self {
            Lane::Straight(lane) => &lane.attributes,
            Lane::Circular(lane) => &lane.attributes,
        }
    }

    pub fn width(&self) -> f64 {
        self.attributes().width
    }

    /// Samples the lane surface into convex quads between successive
    /// cross-sections, inset by `end_margin` at both ends.
    pub fn footprint(&self, resolution: f64, end_margin: f64) -> Vec<Polygon<f64>> {
        let length = self.length();
        let usable = length - 2.0 * end_margin;
        if usable <= 0.0 {
            return Vec::new();
        }

        let segments = match self {
            Lane::Straight(_) => 1,
            Lane::Circular(_) => (usable / resolution).ceil().max(1.0) as usize,
        };
        let step = usable / segments as f64;

        let mut quads = Vec::with_capacity(segments);
        for i in 0..segments {
            let s0 = end_margin + step * i as f64;
            let s1 = s0 + step;
            let half0 = self.width_at(s0) / 2.0;
            let half1 = self.width_at(s1) / 2.0;
            quads.push(polygon(&[
                self.position(s0, -half0),
                self.position(s1, -half1),
                self.position(s1, half1),
                self.position(s0, half0),
            ]));
        }
        quads
    }
}

impl LaneGeometry for Lane {
    fn length(&self) -> f64 {
        match self {
            Lane::Straight(lane) => lane.length(),
            Lane::Circular(lane) => lane.length(),
        }
    }

    fn position(&self, longitudinal: f64, lateral: f64) -> Point {
        match self {
            Lane::Straight(lane) => lane.position(longitudinal, lateral),
            Lane::Circular(lane) => lane.position(longitudinal, lateral),
        }
    }

    fn heading_at(&self, longitudinal: f64) -> f64 {
        match self {
            Lane::Straight(lane) => lane.heading_at(longitudinal),
            Lane::Circular(lane) => lane.heading_at(longitudinal),
        }
    }

    fn width_at(&self, longitudinal: f64) -> f64 {
        match self {
            Lane::Straight(lane) => lane.width_at(longitudinal),
            Lane::Circular(lane) => lane.width_at(longitudinal),
        }
    }

    fn local_coordinates(&self, position: &Point) -> (f64, f64) {
        match self {
            Lane::Straight(lane) => lane.local_coordinates(position),
            Lane::Circular(lane) => lane.local_coordinates(position),
        }
    }
}

impl From<StraightLane> for Lane {
    fn from(lane: StraightLane) -> Self {
        Lane::Straight(lane)
    }
}

impl From<CircularLane> for Lane {
    fn from(lane: CircularLane) -> Self {
        Lane::Circular(lane)
    }
}

/// Which way a curve bends relative to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    pub fn sign(self) -> f64 {
        match self {
            Turn::Left => 1.0,
            Turn::Right => -1.0,
        }
    }
}

pub fn heading_vector(heading: f64) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

pub fn rotate_ccw(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

pub fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid maps +PI onto -PI; keep the sign of the input there
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// Straight lane offset `lateral` metres to the left of a reference segment.
pub fn offset_straight(
    start: &Point,
    end: &Point,
    lateral: f64,
    attributes: LaneAttributes,
) -> Result<StraightLane> {
    let direction = end - start;
    let norm = direction.norm();
    let left = if norm > 0.0 {
        rotate_ccw(&(direction / norm))
    } else {
        Vec2::zeros()
    };
    StraightLane::new(start + left * lateral, end + left * lateral, attributes)
}
