use serde::{Deserialize, Serialize};

use super::{rotate_ccw, LaneAttributes, LaneGeometry, Point, Vec2};
use crate::error::{Result, RoadGenError};

const MIN_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightLane {
    start: Point,
    end: Point,
    pub attributes: LaneAttributes,
    // Derived from start/end; recomputed by reset_start_end
    length: f64,
    heading: f64,
    direction: Vec2,
    direction_lateral: Vec2,
}

impl StraightLane {
    pub fn new(start: Point, end: Point, attributes: LaneAttributes) -> Result<Self> {
        let mut lane = Self {
            start,
            end,
            attributes,
            length: 0.0,
            heading: 0.0,
            direction: Vec2::zeros(),
            direction_lateral: Vec2::zeros(),
        };
        lane.update_properties()?;
        Ok(lane)
    }

    pub fn reset_start_end(&mut self, start: Point, end: Point) -> Result<()> {
        let previous = (self.start, self.end);
        self.start = start;
        self.end = end;
        if let Err(e) = self.update_properties() {
            // Leave the lane in its last valid state
            self.start = previous.0;
            self.end = previous.1;
            self.update_properties()?;
            return Err(e);
        }
        Ok(())
    }

    fn update_properties(&mut self) -> Result<()> {
        let delta = self.end - self.start;
        let length = delta.norm();
        if !length.is_finite() || length < MIN_LENGTH {
            return Err(RoadGenError::DegenerateGeometry(format!(
                "straight lane from ({:.3}, {:.3}) to ({:.3}, {:.3}) has zero length",
                self.start.x, self.start.y, self.end.x, self.end.y
            )));
        }
        self.length = length;
        self.heading = delta.y.atan2(delta.x);
        self.direction = delta / length;
        self.direction_lateral = rotate_ccw(&self.direction);
        Ok(())
    }

    pub fn start_point(&self) -> Point {
        self.start
    }

    pub fn end_point(&self) -> Point {
        self.end
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn direction_lateral(&self) -> Vec2 {
        self.direction_lateral
    }
}

impl LaneGeometry for StraightLane {
    fn length(&self) -> f64 {
        self.length
    }

    fn position(&self, longitudinal: f64, lateral: f64) -> Point {
        self.start + self.direction * longitudinal + self.direction_lateral * lateral
    }

    fn heading_at(&self, _longitudinal: f64) -> f64 {
        self.heading
    }

    fn width_at(&self, _longitudinal: f64) -> f64 {
        self.attributes.width
    }

    fn local_coordinates(&self, position: &Point) -> (f64, f64) {
        let delta = position - self.start;
        (delta.dot(&self.direction), delta.dot(&self.direction_lateral))
    }

    fn direction_at(&self, _longitudinal: f64) -> Vec2 {
        self.direction
    }

    fn direction_lateral_at(&self, _longitudinal: f64) -> Vec2 {
        self.direction_lateral
    }
}
