use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::blocks::{Block, BlockType};
use crate::error::{Result, RoadGenError};
use crate::geometry::Lane;
use crate::network::{NodeId, RoadNetwork};
use crate::world::World;

/// One placed block, enough to replay it: the sub-seed and trial pin the
/// sampled parameters, the socket index pins where it hangs off its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecipe {
    pub index: usize,
    pub type_code: char,
    pub sub_seed: u64,
    pub socket_index: usize,
    pub trial: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecipe {
    pub seed: u64,
    pub lane_num: usize,
    pub lane_width: f64,
    pub exit_length: f64,
    pub blocks: Vec<BlockRecipe>,
}

impl MapRecipe {
    /// Replays the recipe without collision checks. Every block attaches to
    /// the one placed right before it.
    pub fn rebuild(&self) -> Result<RoadNetwork> {
        let mut network = RoadNetwork::new();
        let mut world = World::new_permissive();

        let mut parent = Block::first(self.lane_num, self.lane_width, self.exit_length);
        parent.construct(&mut network, &mut world)?;

        for recipe in &self.blocks {
            let block_type = BlockType::from_code(recipe.type_code)?;
            if block_type == BlockType::First {
                return Err(RoadGenError::InvalidParameter(format!(
                    "recipe block {} is an entry block",
                    recipe.index
                )));
            }
            let socket = parent.get_socket(recipe.socket_index)?.clone();
            let mut block = Block::new(recipe.index, block_type, socket, recipe.sub_seed, true);
            block.construct_trial(recipe.trial, &mut network, &mut world)?;
            parent = block;
        }

        log::debug!(
            "rebuilt {} blocks, {} bundles",
            self.blocks.len() + 1,
            network.bundle_count()
        );
        Ok(network)
    }

    pub fn sequence(&self) -> String {
        self.blocks.iter().map(|b| b.type_code).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub start: NodeId,
    pub end: NodeId,
    pub index: usize,
    pub lane: Lane,
}

/// Flat dump of a generated map: the recipe that produced it plus every lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub recipe: MapRecipe,
    pub lanes: Vec<LaneRecord>,
}

impl MapData {
    pub fn from_network(recipe: MapRecipe, network: &RoadNetwork) -> Self {
        let lanes = network
            .edges()
            .flat_map(|(start, end, bundle)| {
                bundle.iter().enumerate().map(move |(index, lane)| LaneRecord {
                    start: start.clone(),
                    end: end.clone(),
                    index,
                    lane: lane.clone(),
                })
            })
            .collect();
        Self { recipe, lanes }
    }

    pub fn to_network(&self) -> Result<RoadNetwork> {
        let mut bundles: BTreeMap<(&str, &str), Vec<(usize, Lane)>> = BTreeMap::new();
        for record in &self.lanes {
            bundles
                .entry((record.start.as_str(), record.end.as_str()))
                .or_default()
                .push((record.index, record.lane.clone()));
        }

        let mut network = RoadNetwork::new();
        for ((start, end), mut lanes) in bundles {
            lanes.sort_by_key(|(index, _)| *index);
            network.add_lane_bundle(start, end, lanes.into_iter().map(|(_, lane)| lane).collect())?;
        }
        Ok(network)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing map to {}", path.display()))?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading map from {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}
