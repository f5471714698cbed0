use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::blocks::BlockType;
use crate::config::BlockCatalogConfig;
use crate::error::{Result, RoadGenError};

/// Discrete distribution over the block types that may be sampled.
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    types: Vec<BlockType>,
    weights: Vec<f64>,
    distribution: WeightedIndex<f64>,
}

impl BlockCatalog {
    pub fn new(entries: &[(BlockType, f64)]) -> Result<Self> {
        let (types, weights): (Vec<_>, Vec<_>) = entries
            .iter()
            .filter(|(t, _)| *t != BlockType::First)
            .copied()
            .unzip();
        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| RoadGenError::InvalidParameter(format!("block probabilities: {}", e)))?;
        Ok(Self {
            types,
            weights,
            distribution,
        })
    }

    pub fn from_config(config: &BlockCatalogConfig) -> Result<Self> {
        // Fixed type order keeps sampling independent of map iteration order
        let mut entries = Vec::new();
        for block_type in BlockType::ALL {
            if let Some(p) = config.probability(block_type) {
                entries.push((block_type, p));
            }
        }
        Self::new(&entries)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BlockType {
        self.types[self.distribution.sample(rng)]
    }

    pub fn probability(&self, block_type: BlockType) -> f64 {
        let total: f64 = self.weights.iter().sum();
        self.types
            .iter()
            .zip(&self.weights)
            .find(|(t, _)| **t == block_type)
            .map(|(_, w)| w / total)
            .unwrap_or(0.0)
    }

    pub fn types(&self) -> &[BlockType] {
        &self.types
    }
}
