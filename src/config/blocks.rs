use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Validate;
use crate::blocks::BlockType;

/// Sampling probability per block type code, e.g. `C = 0.3`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockCatalogConfig {
    pub probabilities: BTreeMap<String, f64>,
}

impl Default for BlockCatalogConfig {
    fn default() -> Self {
        let probabilities = [
            (BlockType::Curve, 0.3),
            (BlockType::Straight, 0.1),
            (BlockType::Intersection, 0.15),
            (BlockType::Roundabout, 0.15),
            (BlockType::TIntersection, 0.15),
            (BlockType::InRamp, 0.1),
            (BlockType::OutRamp, 0.05),
        ]
        .into_iter()
        .map(|(t, p)| (t.code().to_string(), p))
        .collect();
        Self { probabilities }
    }
}

impl BlockCatalogConfig {
    pub fn probability(&self, block_type: BlockType) -> Option<f64> {
        self.probabilities.get(&block_type.code().to_string()).copied()
    }
}

impl Validate for BlockCatalogConfig {
    fn validate(&self) -> Result<()> {
        if self.probabilities.is_empty() {
            return Err(anyhow!("At least one block probability must be defined"));
        }

        for (code, probability) in &self.probabilities {
            let mut chars = code.chars();
            let block_type = match (chars.next(), chars.next()) {
                (Some(c), None) => BlockType::from_code(c)?,
                _ => return Err(anyhow!("Block type code '{}' must be a single character", code)),
            };

            if block_type == BlockType::First {
                return Err(anyhow!("The entry block '{}' cannot be sampled", code));
            }

            if !probability.is_finite() || *probability < 0.0 {
                return Err(anyhow!("Probability for '{}' must be non-negative", code));
            }
        }

        let total: f64 = self.probabilities.values().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(anyhow!("Block probabilities must sum to 1, got {}", total));
        }

        Ok(())
    }
}
