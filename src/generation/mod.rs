use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blocks::{Block, BlockType};
use crate::config::GeneratorConfig;
use crate::error::{Result, RoadGenError};
use crate::network::RoadNetwork;
use crate::persistence::{BlockRecipe, MapRecipe};
use crate::world::WorldContext;

pub mod catalog;
pub mod seed;

pub use catalog::*;
pub use seed::*;

pub const MAX_TRIAL: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Forward,
    Back,
    SearchSibling,
    DestructCurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMethod {
    BlockNum,
    BlockSequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateParameter {
    Count(usize),
    Sequence(String),
}

impl GenerateParameter {
    /// Reads a command-line map argument: digits mean a block count,
    /// anything else a sequence of type codes.
    pub fn parse(map: &str) -> Self {
        match map.parse::<usize>() {
            Ok(count) => GenerateParameter::Count(count),
            Err(_) => GenerateParameter::Sequence(map.to_string()),
        }
    }

    pub fn method(&self) -> GenerateMethod {
        match self {
            GenerateParameter::Count(_) => GenerateMethod::BlockNum,
            GenerateParameter::Sequence(_) => GenerateMethod::BlockSequence,
        }
    }
}

/// Block-incremental generation: a depth-first search over block placements
/// with a bounded number of trials per tree position.
pub struct Big<W: WorldContext> {
    network: RoadNetwork,
    world: W,
    catalog: BlockCatalog,
    blocks: Vec<Block>,
    block_sequence: Option<Vec<BlockType>>,
    target: usize,
    next_step: NextStep,
    seed: u64,
    rng: StdRng,
    sample_count: u64,
    lane_num: usize,
    lane_width: f64,
    exit_length: f64,
    max_trial: u32,
    max_steps: u64,
    steps: u64,
}

impl<W: WorldContext> Big<W> {
    pub fn new(config: &GeneratorConfig, world: W) -> Result<Self> {
        let catalog = BlockCatalog::from_config(&config.blocks)?;
        let seed = config.map.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut big = Self {
            network: RoadNetwork::new(),
            world,
            catalog,
            blocks: Vec::new(),
            block_sequence: None,
            target: 1,
            next_step: NextStep::Forward,
            seed,
            rng: StdRng::seed_from_u64(seed),
            sample_count: 0,
            lane_num: config.map.lane_num,
            lane_width: config.map.lane_width,
            exit_length: config.map.exit_length,
            max_trial: config.map.max_trial,
            max_steps: config.map.max_steps,
            steps: 0,
        };

        let mut first = Block::first(big.lane_num, big.lane_width, big.exit_length);
        if !first.construct(&mut big.network, &mut big.world)? {
            return Err(RoadGenError::InvalidParameter(
                "entry block could not be placed in the world".to_string(),
            ));
        }
        big.blocks.push(first);
        Ok(big)
    }

    pub fn generate(&mut self, method: GenerateMethod, parameter: GenerateParameter) -> Result<&RoadNetwork> {
        // A session runs the search once, whether it succeeded or not
        if self.steps > 0 || self.blocks.len() > 1 {
            return Err(RoadGenError::InvalidParameter(
                "this session has already generated a map".to_string(),
            ));
        }
        match (method, parameter) {
            (GenerateMethod::BlockNum, GenerateParameter::Count(count)) => {
                if count == 0 {
                    return Err(RoadGenError::InvalidParameter(
                        "block count must be positive".to_string(),
                    ));
                }
                self.target = count + 1;
                self.block_sequence = None;
            }
            (GenerateMethod::BlockSequence, GenerateParameter::Sequence(sequence)) => {
                let types = parse_sequence(&sequence)?;
                self.target = types.len() + 1;
                let mut with_entry = vec![BlockType::First];
                with_entry.extend(types);
                self.block_sequence = Some(with_entry);
            }
            (method, parameter) => {
                return Err(RoadGenError::InvalidParameter(format!(
                    "{:?} does not take a {:?} parameter",
                    method, parameter
                )));
            }
        }

        log::info!(
            "generating {} blocks with seed {}",
            self.target - 1,
            self.seed
        );
        while !self.step()? {}
        log::info!(
            "placed {} blocks in {} steps, {} bundles",
            self.blocks.len(),
            self.steps,
            self.network.bundle_count()
        );
        Ok(&self.network)
    }

    /// Advances the state machine once. Returns true when the target is met.
    pub fn step(&mut self) -> Result<bool> {
        if self.next_step == NextStep::Forward && self.blocks.len() >= self.target {
            return Ok(true);
        }
        if self.max_steps > 0 && self.steps >= self.max_steps {
            log::warn!("step budget of {} exhausted", self.max_steps);
            return Err(self.exhausted());
        }
        self.steps += 1;
        match self.next_step {
            NextStep::Forward => self.forward()?,
            NextStep::DestructCurrent => self.destruct_current(),
            NextStep::SearchSibling => self.search_sibling()?,
            NextStep::Back => self.go_back()?,
        }
        Ok(false)
    }

    pub fn sample_block(&mut self) -> Result<Block> {
        let index = self.blocks.len();
        let block_type = match &self.block_sequence {
            Some(sequence) => *sequence.get(index).ok_or_else(|| {
                RoadGenError::InvalidParameter(format!("block sequence has no entry {}", index))
            })?,
            None => self.catalog.sample(&mut self.rng),
        };

        let parent = self.blocks.last().ok_or_else(|| self.exhausted())?;
        let indices = parent.socket_indices();
        let socket_index = indices[self.rng.gen_range(0..indices.len())];
        let socket = parent.get_socket(socket_index)?.clone();

        let sub_seed = derive_seed(self.seed, self.sample_count);
        self.sample_count += 1;
        Ok(Block::new(index, block_type, socket, sub_seed, false))
    }

    pub fn construct(&mut self, block: &mut Block) -> Result<bool> {
        block.construct(&mut self.network, &mut self.world)
    }

    pub fn destruct(&mut self, block: &mut Block) -> bool {
        block.destruct(&mut self.network, &mut self.world)
    }

    fn forward(&mut self) -> Result<()> {
        let mut block = self.sample_block()?;
        log::debug!(
            "forward: block {} type {} on socket {}",
            block.index(),
            block.block_type(),
            block.socket_index()
        );
        let success = self.construct(&mut block)?;
        self.blocks.push(block);
        self.next_step = if success {
            NextStep::Forward
        } else {
            NextStep::DestructCurrent
        };
        Ok(())
    }

    fn go_back(&mut self) -> Result<()> {
        // The entry block is never popped or retried
        if self.blocks.len() <= 1 {
            return Err(self.exhausted());
        }
        log::debug!("back from block {}", self.blocks.len() - 1);
        self.blocks.pop();
        if self.blocks.len() <= 1 {
            log::warn!("search backtracked to the entry block");
            return Err(self.exhausted());
        }
        if let Some(mut last) = self.blocks.pop() {
            self.destruct(&mut last);
            self.blocks.push(last);
        }
        self.next_step = NextStep::SearchSibling;
        Ok(())
    }

    fn search_sibling(&mut self) -> Result<()> {
        let Some(mut block) = self.blocks.pop() else {
            return Err(self.exhausted());
        };
        if block.number_of_sample_trial() < self.max_trial {
            log::debug!(
                "sibling: block {} trial {}",
                block.index(),
                block.number_of_sample_trial()
            );
            let success = self.construct(&mut block)?;
            self.next_step = if success {
                NextStep::Forward
            } else {
                NextStep::DestructCurrent
            };
        } else {
            self.next_step = NextStep::Back;
        }
        self.blocks.push(block);
        Ok(())
    }

    fn destruct_current(&mut self) {
        if let Some(mut block) = self.blocks.pop() {
            log::debug!("destruct: block {}", block.index());
            self.destruct(&mut block);
            self.next_step = if block.number_of_sample_trial() < self.max_trial {
                NextStep::SearchSibling
            } else {
                NextStep::Back
            };
            self.blocks.push(block);
        }
    }

    fn exhausted(&self) -> RoadGenError {
        RoadGenError::SearchExhausted {
            placed: self.blocks.len().saturating_sub(1),
            target: self.target.saturating_sub(1),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn next_step(&self) -> NextStep {
        self.next_step
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn into_parts(self) -> (RoadNetwork, W) {
        (self.network, self.world)
    }

    /// Everything needed to rebuild the current map without collision checks.
    pub fn recipe(&self) -> MapRecipe {
        MapRecipe {
            seed: self.seed,
            lane_num: self.lane_num,
            lane_width: self.lane_width,
            exit_length: self.exit_length,
            blocks: self
                .blocks
                .iter()
                .skip(1)
                .filter_map(|block| {
                    block.construction().map(|c| BlockRecipe {
                        index: block.index(),
                        type_code: block.block_type().code(),
                        sub_seed: block.sub_seed(),
                        socket_index: block.socket_index(),
                        trial: c.trial,
                    })
                })
                .collect(),
        }
    }
}

pub fn parse_sequence(sequence: &str) -> Result<Vec<BlockType>> {
    if sequence.is_empty() {
        return Err(RoadGenError::InvalidParameter(
            "block sequence is empty".to_string(),
        ));
    }
    sequence
        .chars()
        .map(|code| match BlockType::from_code(code) {
            Ok(BlockType::First) => Err(RoadGenError::InvalidParameter(
                "the entry block cannot appear inside a sequence".to_string(),
            )),
            Ok(t) => Ok(t),
            Err(_) => Err(RoadGenError::InvalidParameter(format!(
                "unknown block type code '{}' in sequence",
                code
            ))),
        })
        .collect()
}
