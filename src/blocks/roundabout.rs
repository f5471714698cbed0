use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

use super::intersection::{add_arms, lane_point, JunctionEnd};
use super::{Arm, BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame};
use crate::error::Result;
use crate::geometry::{heading_vector, CircularLane, Lane, LaneAttributes, LineType, StraightLane};
use crate::network::Road;

// Gap between the arm boundary and the outer ring lane
const APPROACH_LENGTH: f64 = 8.0;
// Straight part of the approach; links to the ring start where it ends, so
// only lanes square to the boundary touch a neighbouring block
const STUB_LENGTH: f64 = 4.0;
const RING_PART: usize = 3;
const STUB_PART: usize = 4;

pub fn sample(rng: &mut StdRng) -> BlockParams {
    BlockParams::Roundabout {
        ring_radius: rng.gen_range(15.0..25.0),
        arm_length: rng.gen_range(30.0..50.0),
    }
}

/// Counter-clockwise ring with four entry/exit points. `ring_radius` is the
/// radius of the central island; ring lanes lie outside it.
pub fn layout(frame: &SocketFrame, names: &NodeNamer, ring_radius: f64, arm_length: f64) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let half_size = ring_radius + frame.road_width() + APPROACH_LENGTH;
    let center = frame.origin + frame.forward() * half_size;

    let arms = add_arms(&mut layout, frame, names, center, half_size, arm_length, None)?;
    let arm_end = |wanted: Arm| -> Option<JunctionEnd> {
        arms.iter()
            .find(|(arm, _)| *arm == wanted)
            .map(|(_, end)| end.clone())
    };

    // Counter-clockwise from the entry, which lies at polar angle heading + PI
    let mut around: Vec<JunctionEnd> = vec![(frame.entry_node.clone(), frame.origin, frame.heading + PI)];
    around.extend([Arm::Right, Arm::Straight, Arm::Left].into_iter().filter_map(arm_end));

    let width = frame.lane_width;
    let ring_attributes = LaneAttributes::with_width(width);
    let link_attributes = LaneAttributes::with_width(width).with_line_types(LineType::None, LineType::None);
    let lane_radius = |m: usize| ring_radius + (m as f64 + 0.5) * width;

    for (k, (node, point, heading)) in around.iter().enumerate() {
        let phase = frame.heading + PI + k as f64 * FRAC_PI_2;
        let ring_node = names.node(RING_PART, k);
        let next_ring_node = names.node(RING_PART, (k + 1) % around.len());

        let ring = (0..frame.lane_num)
            .map(|m| {
                CircularLane::new(center, lane_radius(m), phase, phase + FRAC_PI_2, false, ring_attributes.clone())
                    .map(Lane::from)
            })
            .collect::<Result<Vec<Lane>>>()?;
        layout.add_one_way(Road::new(ring_node.clone(), next_ring_node), ring);

        let inbound = heading + PI;
        let stub_node = names.node(STUB_PART, k);
        let stub = Reference::straight(*point, inbound, STUB_LENGTH);
        layout.add_two_way(
            Road::new(node.clone(), stub_node.clone()),
            &stub,
            frame.lane_num,
            frame.lane_width,
        )?;
        let stub_end = stub.end();

        let entering = (0..frame.lane_num)
            .map(|m| {
                let on_ring = center + heading_vector(phase) * lane_radius(m);
                StraightLane::new(lane_point(&stub_end, inbound, m, width), on_ring, link_attributes.clone())
                    .map(Lane::from)
            })
            .collect::<Result<Vec<Lane>>>()?;
        layout.add_one_way(Road::new(stub_node.clone(), ring_node.clone()), entering);

        let leaving = (0..frame.lane_num)
            .map(|m| {
                let on_ring = center + heading_vector(phase) * lane_radius(m);
                StraightLane::new(on_ring, lane_point(&stub_end, *heading, m, width), link_attributes.clone())
                    .map(Lane::from)
            })
            .collect::<Result<Vec<Lane>>>()?;
        layout.add_one_way(Road::new(ring_node, stub_node), leaving);
    }
    Ok(layout)
}
