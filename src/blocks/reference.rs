use std::f64::consts::PI;

use crate::error::Result;
use crate::geometry::{
    heading_vector, offset_straight, rotate_ccw, CircularLane, Lane, LaneAttributes, LaneGeometry,
    LineType, Point, StraightLane, Turn, Vec2,
};

/// Center line of a two-way road. Forward lanes sit on its right, reverse
/// lanes on its left; lane 0 of either direction is next to the center line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    Straight {
        start: Point,
        heading: f64,
        length: f64,
    },
    Arc {
        start: Point,
        heading: f64,
        radius: f64,
        sweep: f64,
        turn: Turn,
    },
}

impl Reference {
    pub fn straight(start: Point, heading: f64, length: f64) -> Self {
        Reference::Straight {
            start,
            heading,
            length,
        }
    }

    pub fn arc(start: Point, heading: f64, radius: f64, sweep: f64, turn: Turn) -> Self {
        Reference::Arc {
            start,
            heading,
            radius,
            sweep,
            turn,
        }
    }

    pub fn start(&self) -> Point {
        match *self {
            Reference::Straight { start, .. } | Reference::Arc { start, .. } => start,
        }
    }

    pub fn start_heading(&self) -> f64 {
        match *self {
            Reference::Straight { heading, .. } | Reference::Arc { heading, .. } => heading,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Reference::Straight {
                start,
                heading,
                length,
            } => start + heading_vector(heading) * length,
            Reference::Arc {
                start,
                heading,
                radius,
                sweep,
                turn,
            } => {
                let center = start + rotate_ccw(&heading_vector(heading)) * (radius * turn.sign());
                let phase = heading - turn.sign() * PI / 2.0 + turn.sign() * sweep;
                center + Vec2::new(phase.cos(), phase.sin()) * radius
            }
        }
    }

    pub fn end_heading(&self) -> f64 {
        match *self {
            Reference::Straight { heading, .. } => heading,
            Reference::Arc {
                heading, sweep, turn, ..
            } => heading + turn.sign() * sweep,
        }
    }

    pub fn forward_lanes(&self, lane_num: usize, width: f64) -> Result<Vec<Lane>> {
        (0..lane_num)
            .map(|i| self.lane(i, lane_num, width, false))
            .collect()
    }

    pub fn reverse_lanes(&self, lane_num: usize, width: f64) -> Result<Vec<Lane>> {
        (0..lane_num)
            .map(|i| self.lane(i, lane_num, width, true))
            .collect()
    }

    fn lane(&self, i: usize, lane_num: usize, width: f64, reverse: bool) -> Result<Lane> {
        let offset = (i as f64 + 0.5) * width;
        let attributes = LaneAttributes::with_width(width).with_line_types(
            if i == 0 {
                LineType::Continuous
            } else {
                LineType::Broken
            },
            if i + 1 == lane_num {
                LineType::Side
            } else {
                LineType::Broken
            },
        );
        match *self {
            Reference::Straight { .. } => {
                let (a, b) = if reverse {
                    (self.end(), self.start())
                } else {
                    (self.start(), self.end())
                };
                Ok(offset_straight(&a, &b, -offset, attributes)?.into())
            }
            Reference::Arc {
                radius, sweep, turn, ..
            } => {
                // The right side of travel is outside a left turn and inside a right turn
                let (start, heading, lane_turn) = if reverse {
                    let heading = self.end_heading();
                    let left = rotate_ccw(&heading_vector(heading));
                    (self.end() + left * offset, heading + PI, opposite(turn))
                } else {
                    let heading = self.start_heading();
                    let left = rotate_ccw(&heading_vector(heading));
                    (self.start() - left * offset, heading, turn)
                };
                let lane_radius = radius + lane_turn.sign() * offset;
                Ok(CircularLane::from_tangent(start, heading, lane_radius, sweep, lane_turn, attributes)?.into())
            }
        }
    }
}

pub fn opposite(turn: Turn) -> Turn {
    match turn {
        Turn::Left => Turn::Right,
        Turn::Right => Turn::Left,
    }
}

/// Single lane from `start` (travelling along `heading`) to `end`: straight
/// when `end` lies dead ahead, otherwise a quarter arc. Only valid when the
/// exit heading is the entry heading turned by zero or ninety degrees.
pub fn connector(start: Point, heading: f64, end: Point, attributes: LaneAttributes) -> Result<Lane> {
    let delta = end - start;
    let forward = heading_vector(heading);
    let along = delta.dot(&forward);
    let across = delta.dot(&rotate_ccw(&forward));
    if across.abs() < 1e-6 {
        return Ok(StraightLane::new(start, end, attributes)?.into());
    }
    // For a quarter turn |along| == |across| == radius
    let turn = if across > 0.0 { Turn::Left } else { Turn::Right };
    let radius = (along.abs() + across.abs()) / 2.0;
    Ok(CircularLane::from_tangent(start, heading, radius, PI / 2.0, turn, attributes)?.into())
}
