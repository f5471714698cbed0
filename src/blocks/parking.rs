use rand::rngs::StdRng;
use rand::Rng;

use super::{BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame};
use crate::error::Result;
use crate::geometry::{LaneAttributes, LineType, StraightLane};
use crate::network::Road;

pub const SPACE_WIDTH: f64 = 3.0;
pub const SPACE_DEPTH: f64 = 6.0;
// Clear aisle before the first and after the last space
const AISLE_MARGIN: f64 = 5.0;

pub fn sample(rng: &mut StdRng) -> BlockParams {
    BlockParams::ParkingLot {
        aisle_length: rng.gen_range(30.0..50.0),
        tail_length: rng.gen_range(20.0..30.0),
        spaces_per_side: rng.gen_range(2..=4),
    }
}

/// A two-way aisle lined on both sides by perpendicular one-way spaces,
/// then a tail road carrying the only socket.
///
/// Right-hand spaces are `node(2, i)`, left-hand spaces `node(3, i)`; both
/// branch off the aisle's entry node.
pub fn layout(
    frame: &SocketFrame,
    names: &NodeNamer,
    aisle_length: f64,
    tail_length: f64,
    spaces_per_side: usize,
) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let aisle_end = names.node(0, 0);
    let tail_end = names.node(1, 0);
    let aisle_length = aisle_length.max(2.0 * AISLE_MARGIN + spaces_per_side as f64 * SPACE_WIDTH);

    let aisle = Reference::straight(frame.origin, frame.heading, aisle_length);
    layout.add_two_way(
        Road::new(frame.entry_node.clone(), aisle_end.clone()),
        &aisle,
        frame.lane_num,
        frame.lane_width,
    )?;

    let tail = Reference::straight(aisle.end(), frame.heading, tail_length);
    let socket = Road::new(aisle_end, tail_end);
    layout.add_two_way(socket.clone(), &tail, frame.lane_num, frame.lane_width)?;
    layout.add_socket(socket);

    let attributes = LaneAttributes::with_width(SPACE_WIDTH).with_line_types(LineType::Continuous, LineType::Continuous);
    let forward = frame.forward();
    let left = frame.left();
    let edge = frame.road_width();
    for i in 0..spaces_per_side {
        let along = frame.origin + forward * (AISLE_MARGIN + (i as f64 + 0.5) * SPACE_WIDTH);
        for (part, side) in [(2, -left), (3, left)] {
            let start = along + side * edge;
            let end = start + side * SPACE_DEPTH;
            let lane = StraightLane::new(start, end, attributes.clone())?;
            layout.add_parking_space(Road::new(frame.entry_node.clone(), names.node(part, i)), lane.into());
        }
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockType;
    use crate::geometry::{LaneGeometry, Point};

    #[test]
    fn spaces_sit_outside_the_aisle() {
        let frame = SocketFrame {
            origin: Point::new(100.0, 0.0),
            heading: 0.0,
            lane_num: 2,
            lane_width: 3.5,
            entry_node: "1S0_0".to_string(),
        };
        let names = NodeNamer::new(2, BlockType::ParkingLot);
        let layout = layout(&frame, &names, 30.0, 20.0, 3).unwrap();

        assert_eq!(layout.parking_spaces.len(), 6);
        assert_eq!(layout.bundles.len(), 4 + 6);
        assert_eq!(layout.sockets.len(), 1);
        assert_eq!(layout.sockets[0].positive, Road::new("2P0_0", "2P1_0"));

        for (road, lanes) in &layout.bundles {
            if !layout.parking_spaces.contains(road) {
                continue;
            }
            assert_eq!(lanes.len(), 1);
            let start = lanes[0].position(0.0, 0.0);
            let end = lanes[0].position(lanes[0].length(), 0.0);
            assert!((start.y.abs() - 7.0).abs() < 1e-9);
            assert!((end.y.abs() - 13.0).abs() < 1e-9);
            assert!(start.x > 100.0 && start.x < 130.0);
        }
    }
}
