use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoadGenError};
use crate::generation::derive_seed;
use crate::geometry::{
    heading_vector, rotate_ccw, Lane, LaneGeometry, Point, Turn, FOOTPRINT_END_MARGIN,
    FOOTPRINT_RESOLUTION,
};
use crate::network::{NodeId, Road, RoadNetwork};
use crate::world::{BodyHandle, Footprint, WorldContext};

pub mod curve;
pub mod intersection;
pub mod parking;
pub mod ramp;
pub mod reference;
pub mod roundabout;
pub mod straight;

pub use reference::*;

pub const FIRST_BLOCK_NODES: [&str; 3] = [">", ">>", ">>>"];
pub const ENTRY_LENGTH: f64 = 10.0;
pub const DEFAULT_EXIT_LENGTH: f64 = 50.0;
pub const MAX_LANE_NUM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    First,
    Straight,
    Curve,
    Intersection,
    TIntersection,
    Roundabout,
    InRamp,
    OutRamp,
    Merge,
    Split,
    ParkingLot,
}

impl BlockType {
    pub const ALL: [BlockType; 11] = [
        BlockType::First,
        BlockType::Straight,
        BlockType::Curve,
        BlockType::Intersection,
        BlockType::TIntersection,
        BlockType::Roundabout,
        BlockType::InRamp,
        BlockType::OutRamp,
        BlockType::Merge,
        BlockType::Split,
        BlockType::ParkingLot,
    ];

    pub fn code(self) -> char {
        match self {
            BlockType::First => 'I',
            BlockType::Straight => 'S',
            BlockType::Curve => 'C',
            BlockType::Intersection => 'X',
            BlockType::TIntersection => 'T',
            BlockType::Roundabout => 'O',
            BlockType::InRamp => 'r',
            BlockType::OutRamp => 'R',
            BlockType::Merge => 'y',
            BlockType::Split => 'Y',
            BlockType::ParkingLot => 'P',
        }
    }

    pub fn from_code(code: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(RoadGenError::UnknownBlockType(code))
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::First => "first",
            BlockType::Straight => "straight",
            BlockType::Curve => "curve",
            BlockType::Intersection => "intersection",
            BlockType::TIntersection => "t_intersection",
            BlockType::Roundabout => "roundabout",
            BlockType::InRamp => "in_ramp",
            BlockType::OutRamp => "out_ramp",
            BlockType::Merge => "merge",
            BlockType::Split => "split",
            BlockType::ParkingLot => "parking_lot",
        }
    }

    pub fn socket_count(self) -> usize {
        match self {
            BlockType::Intersection | BlockType::Roundabout => 3,
            BlockType::TIntersection => 2,
            _ => 1,
        }
    }

    pub fn sample_params(self, rng: &mut StdRng, frame: &SocketFrame) -> BlockParams {
        match self {
            BlockType::First => straight::first_params(),
            BlockType::Straight => straight::sample_straight(rng),
            BlockType::Merge | BlockType::Split => straight::sample_bottleneck(rng),
            BlockType::Curve => curve::sample(rng, frame),
            BlockType::InRamp | BlockType::OutRamp => ramp::sample(rng),
            BlockType::Intersection => intersection::sample(rng, false),
            BlockType::TIntersection => intersection::sample(rng, true),
            BlockType::Roundabout => roundabout::sample(rng),
            BlockType::ParkingLot => parking::sample(rng),
        }
    }

    pub fn layout(self, params: &BlockParams, frame: &SocketFrame, names: &NodeNamer) -> Result<BlockLayout> {
        let mismatch = || {
            RoadGenError::InvalidParameter(format!(
                "parameters {:?} do not describe a {} block",
                params,
                self.name()
            ))
        };
        match (self, params) {
            (BlockType::First, BlockParams::First { entry_length, exit_length }) => {
                straight::first_layout(frame, *entry_length, *exit_length)
            }
            (BlockType::Straight, BlockParams::Straight { length }) => {
                straight::straight_layout(frame, names, *length)
            }
            (BlockType::Merge, BlockParams::Bottleneck { transition_length, tail_length }) => {
                let lane_num = frame.lane_num.saturating_sub(1).max(1);
                straight::bottleneck_layout(frame, names, *transition_length, *tail_length, lane_num)
            }
            (BlockType::Split, BlockParams::Bottleneck { transition_length, tail_length }) => {
                let lane_num = (frame.lane_num + 1).min(MAX_LANE_NUM);
                straight::bottleneck_layout(frame, names, *transition_length, *tail_length, lane_num)
            }
            (BlockType::Curve, BlockParams::Curve { radius, sweep, turn }) => {
                curve::layout(frame, names, *radius, *sweep, *turn)
            }
            (BlockType::InRamp, BlockParams::Ramp { main_length, tail_length, ramp_offset }) => {
                ramp::in_ramp_layout(frame, names, *main_length, *tail_length, *ramp_offset)
            }
            (BlockType::OutRamp, BlockParams::Ramp { main_length, tail_length, ramp_offset }) => {
                ramp::out_ramp_layout(frame, names, *main_length, *tail_length, *ramp_offset)
            }
            (
                BlockType::Intersection | BlockType::TIntersection,
                BlockParams::Intersection { radius, arm_length, dropped },
            ) => intersection::layout(frame, names, *radius, *arm_length, *dropped),
            (BlockType::Roundabout, BlockParams::Roundabout { ring_radius, arm_length }) => {
                roundabout::layout(frame, names, *ring_radius, *arm_length)
            }
            (
                BlockType::ParkingLot,
                BlockParams::ParkingLot { aisle_length, tail_length, spaces_per_side },
            ) => parking::layout(frame, names, *aisle_length, *tail_length, *spaces_per_side),
            _ => Err(mismatch()),
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Outgoing arm of a junction, relative to the entering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arm {
    Straight,
    Right,
    Left,
}

impl Arm {
    pub const ALL: [Arm; 3] = [Arm::Straight, Arm::Right, Arm::Left];

    pub fn relative_heading(self) -> f64 {
        match self {
            Arm::Straight => 0.0,
            Arm::Right => -std::f64::consts::FRAC_PI_2,
            Arm::Left => std::f64::consts::FRAC_PI_2,
        }
    }

    pub fn part(self) -> usize {
        match self {
            Arm::Straight => 0,
            Arm::Right => 1,
            Arm::Left => 2,
        }
    }
}

/// Internal shape parameters sampled for one placement trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockParams {
    First { entry_length: f64, exit_length: f64 },
    Straight { length: f64 },
    Bottleneck { transition_length: f64, tail_length: f64 },
    Curve { radius: f64, sweep: f64, turn: Turn },
    Ramp { main_length: f64, tail_length: f64, ramp_offset: f64 },
    Intersection { radius: f64, arm_length: f64, dropped: Option<Arm> },
    Roundabout { ring_radius: f64, arm_length: f64 },
    ParkingLot { aisle_length: f64, tail_length: f64, spaces_per_side: usize },
}

/// Attachment point on a constructed block. `positive` leaves the block,
/// `negative` is the matching road coming back into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    pub index: usize,
    pub positive: Road,
    pub negative: Road,
}

impl Socket {
    pub fn new(index: usize, positive: Road) -> Self {
        let negative = positive.reversed();
        Self {
            index,
            positive,
            negative,
        }
    }
}

/// Where and how wide the road is at the point a block attaches.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketFrame {
    pub origin: Point,
    pub heading: f64,
    pub lane_num: usize,
    pub lane_width: f64,
    pub entry_node: NodeId,
}

impl SocketFrame {
    pub fn entry(lane_num: usize, lane_width: f64) -> Self {
        Self {
            origin: Point::origin(),
            heading: 0.0,
            lane_num,
            lane_width,
            entry_node: FIRST_BLOCK_NODES[0].to_string(),
        }
    }

    pub fn from_socket(network: &RoadNetwork, socket: &Socket) -> Result<Self> {
        let lanes = network
            .get_road(&socket.positive)
            .ok_or_else(|| RoadGenError::NotFound {
                start: socket.positive.start.clone(),
                end: socket.positive.end.clone(),
            })?;
        let lane = &lanes[0];
        let length = lane.length();
        let width = lane.width();
        Ok(Self {
            // Lane 0 sits half a lane right of the center line
            origin: lane.position(length, width / 2.0),
            heading: lane.heading_at(length),
            lane_num: lanes.len(),
            lane_width: width,
            entry_node: socket.positive.end.clone(),
        })
    }

    pub fn forward(&self) -> crate::geometry::Vec2 {
        heading_vector(self.heading)
    }

    pub fn left(&self) -> crate::geometry::Vec2 {
        rotate_ccw(&self.forward())
    }

    pub fn road_width(&self) -> f64 {
        self.lane_num as f64 * self.lane_width
    }
}

/// Node names owned by one block position: `{index}{code}{part}_{sub}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeNamer {
    prefix: String,
}

impl NodeNamer {
    pub fn new(index: usize, block_type: BlockType) -> Self {
        Self {
            prefix: format!("{}{}", index, block_type.code()),
        }
    }

    pub fn node(&self, part: usize, sub: usize) -> NodeId {
        format!("{}{}_{}", self.prefix, part, sub)
    }
}

/// Everything a block would add to the network, before it is committed.
#[derive(Debug, Clone, Default)]
pub struct BlockLayout {
    pub bundles: Vec<(Road, Vec<Lane>)>,
    pub sockets: Vec<Socket>,
    pub parking_spaces: Vec<Road>,
}

impl BlockLayout {
    pub fn add_two_way(&mut self, road: Road, reference: &Reference, lane_num: usize, width: f64) -> Result<()> {
        let forward = reference.forward_lanes(lane_num, width)?;
        let reverse = reference.reverse_lanes(lane_num, width)?;
        let back = road.reversed();
        self.bundles.push((road, forward));
        self.bundles.push((back, reverse));
        Ok(())
    }

    pub fn add_one_way(&mut self, road: Road, lanes: Vec<Lane>) {
        self.bundles.push((road, lanes));
    }

    pub fn add_parking_space(&mut self, road: Road, lane: Lane) {
        self.parking_spaces.push(road.clone());
        self.bundles.push((road, vec![lane]));
    }

    pub fn add_socket(&mut self, positive: Road) {
        let index = self.sockets.len();
        self.sockets.push(Socket::new(index, positive));
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(
            self.bundles
                .iter()
                .flat_map(|(_, lanes)| lanes.iter())
                .flat_map(|lane| lane.footprint(FOOTPRINT_RESOLUTION, FOOTPRINT_END_MARGIN))
                .collect(),
        )
    }
}

/// One trial at a tree position. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementAttempt {
    pub trial: u32,
    pub params: BlockParams,
    pub placed: bool,
}

/// What a successful attempt has materialized.
#[derive(Debug, Clone)]
pub struct Construction {
    pub trial: u32,
    pub body: BodyHandle,
    pub roads: Vec<Road>,
    pub sockets: Vec<Socket>,
    pub parking_spaces: Vec<Road>,
}

#[derive(Debug, Clone)]
pub enum Attachment {
    Entry {
        lane_num: usize,
        lane_width: f64,
        exit_length: f64,
    },
    Socket(Socket),
}

#[derive(Debug, Clone)]
pub struct Block {
    index: usize,
    block_type: BlockType,
    attachment: Attachment,
    socket_index: usize,
    sub_seed: u64,
    ignore_intersection_checking: bool,
    attempts: Vec<PlacementAttempt>,
    active: Option<Construction>,
}

impl Block {
    pub fn first(lane_num: usize, lane_width: f64, exit_length: f64) -> Self {
        Self {
            index: 0,
            block_type: BlockType::First,
            attachment: Attachment::Entry {
                lane_num,
                lane_width,
                exit_length,
            },
            socket_index: 0,
            sub_seed: 0,
            ignore_intersection_checking: true,
            attempts: Vec::new(),
            active: None,
        }
    }

    pub fn new(
        index: usize,
        block_type: BlockType,
        socket: Socket,
        sub_seed: u64,
        ignore_intersection_checking: bool,
    ) -> Self {
        Self {
            index,
            block_type,
            socket_index: socket.index,
            attachment: Attachment::Socket(socket),
            sub_seed,
            ignore_intersection_checking,
            attempts: Vec::new(),
            active: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn sub_seed(&self) -> u64 {
        self.sub_seed
    }

    /// Index of the parent's socket this block hangs off.
    pub fn socket_index(&self) -> usize {
        self.socket_index
    }

    pub fn number_of_sample_trial(&self) -> u32 {
        self.attempts.len() as u32
    }

    pub fn attempts(&self) -> &[PlacementAttempt] {
        &self.attempts
    }

    pub fn is_constructed(&self) -> bool {
        self.active.is_some()
    }

    pub fn construction(&self) -> Option<&Construction> {
        self.active.as_ref()
    }

    pub fn socket_indices(&self) -> Vec<usize> {
        (0..self.block_type.socket_count()).collect()
    }

    pub fn sockets(&self) -> &[Socket] {
        self.active
            .as_ref()
            .map(|c| c.sockets.as_slice())
            .unwrap_or(&[])
    }

    /// One-way dead-end roads a parking lot offers as destinations.
    pub fn parking_spaces(&self) -> &[Road] {
        self.active
            .as_ref()
            .map(|c| c.parking_spaces.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_socket(&self, index: usize) -> Result<&Socket> {
        self.sockets()
            .get(index)
            .ok_or(RoadGenError::MissingSocket {
                block: self.index,
                socket: index,
            })
    }

    pub fn frame(&self, network: &RoadNetwork) -> Result<SocketFrame> {
        match &self.attachment {
            Attachment::Entry {
                lane_num,
                lane_width,
                ..
            } => Ok(SocketFrame::entry(*lane_num, *lane_width)),
            Attachment::Socket(socket) => SocketFrame::from_socket(network, socket),
        }
    }

    fn params_for_trial(&self, trial: u32, frame: &SocketFrame) -> BlockParams {
        match &self.attachment {
            Attachment::Entry { exit_length, .. } => BlockParams::First {
                entry_length: ENTRY_LENGTH,
                exit_length: *exit_length,
            },
            Attachment::Socket(_) => {
                let mut rng = StdRng::seed_from_u64(derive_seed(self.sub_seed, trial as u64));
                self.block_type.sample_params(&mut rng, frame)
            }
        }
    }

    /// Samples the next trial and tries to place it. `Ok(false)` means the
    /// world rejected the footprint; nothing was added to the network.
    pub fn construct<W: WorldContext + ?Sized>(&mut self, network: &mut RoadNetwork, world: &mut W) -> Result<bool> {
        if self.active.is_some() {
            return Err(RoadGenError::InvalidParameter(format!(
                "block {} is already constructed",
                self.index
            )));
        }
        let trial = self.number_of_sample_trial();
        self.construct_trial(trial, network, world)
    }

    /// Places a specific trial, used when replaying a stored recipe.
    pub fn construct_trial<W: WorldContext + ?Sized>(
        &mut self,
        trial: u32,
        network: &mut RoadNetwork,
        world: &mut W,
    ) -> Result<bool> {
        let frame = self.frame(network)?;
        let params = self.params_for_trial(trial, &frame);
        let names = NodeNamer::new(self.index, self.block_type);
        let layout = self.block_type.layout(&params, &frame, &names)?;

        let footprint = layout.footprint();
        let body = if self.ignore_intersection_checking {
            Some(world.attach_unchecked(footprint))
        } else {
            world.attach(footprint)
        };
        self.attempts.push(PlacementAttempt {
            trial,
            params,
            placed: body.is_some(),
        });
        let Some(body) = body else {
            log::debug!(
                "block {} ({}) trial {} collides",
                self.index,
                self.block_type.name(),
                trial
            );
            return Ok(false);
        };

        let mut roads: Vec<Road> = Vec::with_capacity(layout.bundles.len());
        for (road, lanes) in layout.bundles {
            if let Err(e) = network.add_lane_bundle(&road.start, &road.end, lanes) {
                for added in roads.iter().rev() {
                    let _ = network.remove_lane_bundle(&added.start, &added.end);
                }
                world.detach(body);
                if let Some(attempt) = self.attempts.last_mut() {
                    attempt.placed = false;
                }
                return Err(e);
            }
            roads.push(road);
        }

        self.active = Some(Construction {
            trial,
            body,
            roads,
            sockets: layout.sockets,
            parking_spaces: layout.parking_spaces,
        });
        Ok(true)
    }

    /// Removes exactly what the active construction added. Returns false if
    /// nothing was constructed.
    pub fn destruct<W: WorldContext + ?Sized>(&mut self, network: &mut RoadNetwork, world: &mut W) -> bool {
        let Some(construction) = self.active.take() else {
            return false;
        };
        for road in construction.roads.iter().rev() {
            if let Err(e) = network.remove_lane_bundle(&road.start, &road.end) {
                log::warn!("block {}: {}", self.index, e);
            }
        }
        world.detach(construction.body);
        true
    }
}
