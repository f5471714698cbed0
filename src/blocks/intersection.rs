use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;

use super::{connector, Arm, BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame};
use crate::error::Result;
use crate::geometry::{heading_vector, rotate_ccw, Lane, LaneAttributes, LineType, Point};
use crate::network::{NodeId, Road};

pub fn sample(rng: &mut StdRng, three_way: bool) -> BlockParams {
    let radius = rng.gen_range(10.0..20.0);
    let arm_length = rng.gen_range(30.0..50.0);
    let dropped = if three_way {
        Some(Arm::ALL[rng.gen_range(0..Arm::ALL.len())])
    } else {
        None
    };
    BlockParams::Intersection {
        radius,
        arm_length,
        dropped,
    }
}

/// Node, boundary point on the center line, and heading pointing out of
/// the junction.
pub(crate) type JunctionEnd = (NodeId, Point, f64);

/// Adds the straight arms of a junction whose boundary sits `half_size`
/// from `center`. Returns the arm ends in socket order.
pub(crate) fn add_arms(
    layout: &mut BlockLayout,
    frame: &SocketFrame,
    names: &NodeNamer,
    center: Point,
    half_size: f64,
    arm_length: f64,
    dropped: Option<Arm>,
) -> Result<Vec<(Arm, JunctionEnd)>> {
    let mut ends = Vec::new();
    for arm in Arm::ALL.into_iter().filter(|a| Some(*a) != dropped) {
        let heading = frame.heading + arm.relative_heading();
        let point = center + heading_vector(heading) * half_size;
        let near = names.node(arm.part(), 0);
        let far = names.node(arm.part(), 1);

        let reference = Reference::straight(point, heading, arm_length);
        let road = Road::new(near.clone(), far);
        layout.add_two_way(road.clone(), &reference, frame.lane_num, frame.lane_width)?;
        layout.add_socket(road);
        ends.push((arm, (near, point, heading)));
    }
    Ok(ends)
}

/// Position of lane `m` on the right of travel along `heading` at `point`.
pub(crate) fn lane_point(point: &Point, heading: f64, m: usize, width: f64) -> Point {
    point - rotate_ccw(&heading_vector(heading)) * ((m as f64 + 0.5) * width)
}

pub fn layout(
    frame: &SocketFrame,
    names: &NodeNamer,
    radius: f64,
    arm_length: f64,
    dropped: Option<Arm>,
) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let half_size = frame.road_width() + radius;
    let center = frame.origin + frame.forward() * half_size;

    let arms = add_arms(&mut layout, frame, names, center, half_size, arm_length, dropped)?;
    let mut ends: Vec<JunctionEnd> = vec![(frame.entry_node.clone(), frame.origin, frame.heading + PI)];
    ends.extend(arms.into_iter().map(|(_, end)| end));

    let attributes = LaneAttributes::with_width(frame.lane_width).with_line_types(LineType::None, LineType::None);
    for (i, (from, from_point, from_heading)) in ends.iter().enumerate() {
        let inbound = from_heading + PI;
        for (j, (to, to_point, to_heading)) in ends.iter().enumerate() {
            if i == j {
                continue;
            }
            let lanes = (0..frame.lane_num)
                .map(|m| {
                    connector(
                        lane_point(from_point, inbound, m, frame.lane_width),
                        inbound,
                        lane_point(to_point, *to_heading, m, frame.lane_width),
                        attributes.clone(),
                    )
                })
                .collect::<Result<Vec<Lane>>>()?;
            layout.add_one_way(Road::new(from.clone(), to.clone()), lanes);
        }
    }
    Ok(layout)
}
