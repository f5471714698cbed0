use rand::rngs::StdRng;
use rand::Rng;

use super::{BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame};
use crate::error::Result;
use crate::geometry::{LaneAttributes, LineType, StraightLane};
use crate::network::Road;

// Distance from the socket before an on-ramp starts
const RAMP_SETBACK: f64 = 5.0;

pub fn sample(rng: &mut StdRng) -> BlockParams {
    BlockParams::Ramp {
        main_length: rng.gen_range(40.0..60.0),
        tail_length: rng.gen_range(30.0..50.0),
        ramp_offset: rng.gen_range(10.0..15.0),
    }
}

fn ramp_attributes(frame: &SocketFrame) -> LaneAttributes {
    LaneAttributes::with_width(frame.lane_width).with_line_types(LineType::Side, LineType::Side)
}

// Shared main carriageway: socket -> a (ramp section) -> b (tail)
fn main_road(frame: &SocketFrame, names: &NodeNamer, main_length: f64, tail_length: f64) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let a = names.node(0, 0);
    let b = names.node(1, 0);

    let main = Reference::straight(frame.origin, frame.heading, main_length);
    layout.add_two_way(
        Road::new(frame.entry_node.clone(), a.clone()),
        &main,
        frame.lane_num,
        frame.lane_width,
    )?;

    let tail = Reference::straight(main.end(), frame.heading, tail_length);
    let socket = Road::new(a, b);
    layout.add_two_way(socket.clone(), &tail, frame.lane_num, frame.lane_width)?;
    layout.add_socket(socket);
    Ok(layout)
}

/// Single-lane on-ramp joining from the right at the end of the main section.
pub fn in_ramp_layout(
    frame: &SocketFrame,
    names: &NodeNamer,
    main_length: f64,
    tail_length: f64,
    ramp_offset: f64,
) -> Result<BlockLayout> {
    let mut layout = main_road(frame, names, main_length, tail_length)?;
    let right = -frame.left();
    let edge = (frame.lane_num as f64 + 0.5) * frame.lane_width;

    let start = frame.origin + frame.forward() * RAMP_SETBACK + right * (edge + ramp_offset);
    let end = frame.origin + frame.forward() * main_length + right * edge;
    let lane = StraightLane::new(start, end, ramp_attributes(frame))?;
    layout.add_one_way(Road::new(names.node(2, 0), names.node(0, 0)), vec![lane.into()]);
    Ok(layout)
}

/// Single-lane off-ramp leaving to the right where the tail begins.
pub fn out_ramp_layout(
    frame: &SocketFrame,
    names: &NodeNamer,
    main_length: f64,
    tail_length: f64,
    ramp_offset: f64,
) -> Result<BlockLayout> {
    let mut layout = main_road(frame, names, main_length, tail_length)?;
    let right = -frame.left();
    let edge = (frame.lane_num as f64 + 0.5) * frame.lane_width;

    let start = frame.origin + frame.forward() * main_length + right * edge;
    let end = start + frame.forward() * tail_length + right * ramp_offset;
    let lane = StraightLane::new(start, end, ramp_attributes(frame))?;
    layout.add_one_way(Road::new(names.node(0, 0), names.node(2, 0)), vec![lane.into()]);
    Ok(layout)
}
