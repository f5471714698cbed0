use rand::rngs::StdRng;
use rand::Rng;

use super::{BlockLayout, BlockParams, NodeNamer, Reference, SocketFrame, DEFAULT_EXIT_LENGTH, ENTRY_LENGTH, FIRST_BLOCK_NODES};
use crate::error::Result;
use crate::network::Road;

pub fn first_params() -> BlockParams {
    BlockParams::First {
        entry_length: ENTRY_LENGTH,
        exit_length: DEFAULT_EXIT_LENGTH,
    }
}

pub fn first_layout(frame: &SocketFrame, entry_length: f64, exit_length: f64) -> Result<BlockLayout> {
    let [start, middle, end] = FIRST_BLOCK_NODES;
    let mut layout = BlockLayout::default();

    let entry = Reference::straight(frame.origin, frame.heading, entry_length);
    layout.add_two_way(Road::new(start, middle), &entry, frame.lane_num, frame.lane_width)?;

    let exit = Reference::straight(entry.end(), frame.heading, exit_length);
    let socket = Road::new(middle, end);
    layout.add_two_way(socket.clone(), &exit, frame.lane_num, frame.lane_width)?;
    layout.add_socket(socket);
    Ok(layout)
}

pub fn sample_straight(rng: &mut StdRng) -> BlockParams {
    BlockParams::Straight {
        length: rng.gen_range(40.0..80.0),
    }
}

pub fn straight_layout(frame: &SocketFrame, names: &NodeNamer, length: f64) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let road = Road::new(frame.entry_node.clone(), names.node(0, 0));
    let reference = Reference::straight(frame.origin, frame.heading, length);
    layout.add_two_way(road.clone(), &reference, frame.lane_num, frame.lane_width)?;
    layout.add_socket(road);
    Ok(layout)
}

pub fn sample_bottleneck(rng: &mut StdRng) -> BlockParams {
    BlockParams::Bottleneck {
        transition_length: rng.gen_range(20.0..40.0),
        tail_length: rng.gen_range(30.0..50.0),
    }
}

/// Keeps the incoming lane count for `transition_length`, then continues
/// with `lane_num` lanes. Lane 0 stays on the center line throughout.
pub fn bottleneck_layout(
    frame: &SocketFrame,
    names: &NodeNamer,
    transition_length: f64,
    tail_length: f64,
    lane_num: usize,
) -> Result<BlockLayout> {
    let mut layout = BlockLayout::default();
    let transition_end = names.node(0, 0);
    let tail_end = names.node(1, 0);

    let transition = Reference::straight(frame.origin, frame.heading, transition_length);
    layout.add_two_way(
        Road::new(frame.entry_node.clone(), transition_end.clone()),
        &transition,
        frame.lane_num,
        frame.lane_width,
    )?;

    let tail = Reference::straight(transition.end(), frame.heading, tail_length);
    let socket = Road::new(transition_end, tail_end);
    layout.add_two_way(socket.clone(), &tail, lane_num, frame.lane_width)?;
    layout.add_socket(socket);
    Ok(layout)
}
