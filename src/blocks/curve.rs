use rand::rngs::StdRng;
use rand::Rng;

use super::{BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame};
use crate::error::Result;
use crate::geometry::Turn;
use crate::network::Road;

const MIN_RADIUS: f64 = 20.0;
const MAX_RADIUS: f64 = 40.0;
// Inner lanes need at least this much clearance from the arc center
const INNER_CLEARANCE: f64 = 5.0;

pub fn sample(rng: &mut StdRng, frame: &SocketFrame) -> BlockParams {
    let radius = rng
        .gen_range(MIN_RADIUS..MAX_RADIUS)
        .max(frame.road_width() + INNER_CLEARANCE);
    let sweep = rng.gen_range(45.0f64..135.0).to_radians();
    let turn = if rng.gen_bool(0.5) {
        Turn::Left
    } else {
        Turn::Right
    };
    BlockParams::Curve { radius, sweep, turn }
}

pub fn layout(frame: &SocketFrame, names: &NodeNamer, radius: f64, sweep: f64, turn: Turn) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let road = Road::new(frame.entry_node.clone(), names.node(0, 0));
    let reference = Reference::arc(frame.origin, frame.heading, radius, sweep, turn);
    layout.add_two_way(road.clone(), &reference, frame.lane_num, frame.lane_width)?;
    layout.add_socket(road);
    Ok(layout)
}
