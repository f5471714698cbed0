use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use super::{heading_vector, wrap_to_pi, LaneAttributes, LaneGeometry, Point, Turn, Vec2};
use crate::error::{Result, RoadGenError};

const MIN_SWEEP: f64 = 1e-9;

/// Arc lane around `center`. Phases are polar angles of the centerline
/// measured at `center`; a clockwise lane has `end_phase < start_phase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularLane {
    center: Point,
    radius: f64,
    start_phase: f64,
    end_phase: f64,
    clockwise: bool,
    pub attributes: LaneAttributes,
}

impl CircularLane {
    pub fn new(
        center: Point,
        radius: f64,
        start_phase: f64,
        end_phase: f64,
        clockwise: bool,
        attributes: LaneAttributes,
    ) -> Result<Self> {
        if !radius.is_finite() || radius <= attributes.width / 2.0 {
            return Err(RoadGenError::DegenerateGeometry(format!(
                "arc radius {:.3} does not fit a lane of width {:.3}",
                radius, attributes.width
            )));
        }
        let direction = if clockwise { -1.0 } else { 1.0 };
        let sweep = direction * (end_phase - start_phase);
        if !sweep.is_finite() || sweep < MIN_SWEEP || sweep >= 2.0 * PI {
            return Err(RoadGenError::DegenerateGeometry(format!(
                "arc sweep from {:.4} to {:.4} rad is empty or wraps around",
                start_phase, end_phase
            )));
        }
        Ok(Self {
            center,
            radius,
            start_phase,
            end_phase,
            clockwise,
            attributes,
        })
    }

    /// Arc leaving `start` tangent to `heading`, bending by `sweep` radians
    /// towards `turn`.
    pub fn from_tangent(
        start: Point,
        heading: f64,
        radius: f64,
        sweep: f64,
        turn: Turn,
        attributes: LaneAttributes,
    ) -> Result<Self> {
        let left = heading_vector(heading + FRAC_PI_2);
        match turn {
            Turn::Left => {
                let start_phase = heading - FRAC_PI_2;
                Self::new(start + left * radius, radius, start_phase, start_phase + sweep, false, attributes)
            }
            Turn::Right => {
                let start_phase = heading + FRAC_PI_2;
                Self::new(start - left * radius, radius, start_phase, start_phase - sweep, true, attributes)
            }
        }
    }

    fn direction(&self) -> f64 {
        if self.clockwise {
            -1.0
        } else {
            1.0
        }
    }

    fn phase_at(&self, longitudinal: f64) -> f64 {
        self.start_phase + self.direction() * longitudinal / self.radius
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn phases(&self) -> (f64, f64) {
        (self.start_phase, self.end_phase)
    }

    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }
}

impl LaneGeometry for CircularLane {
    fn length(&self) -> f64 {
        self.radius * (self.end_phase - self.start_phase).abs()
    }

    fn position(&self, longitudinal: f64, lateral: f64) -> Point {
        let phi = self.phase_at(longitudinal);
        let r = self.radius - self.direction() * lateral;
        self.center + Vec2::new(phi.cos(), phi.sin()) * r
    }

    fn heading_at(&self, longitudinal: f64) -> f64 {
        self.phase_at(longitudinal) + self.direction() * FRAC_PI_2
    }

    fn width_at(&self, _longitudinal: f64) -> f64 {
        self.attributes.width
    }

    fn local_coordinates(&self, position: &Point) -> (f64, f64) {
        let delta = position - self.center;
        let phi = delta.y.atan2(delta.x);
        let phi = self.start_phase + wrap_to_pi(phi - self.start_phase);
        let r = delta.norm();
        let longitudinal = self.direction() * (phi - self.start_phase) * self.radius;
        let lateral = self.direction() * (self.radius - r);
        (longitudinal, lateral)
    }
}
