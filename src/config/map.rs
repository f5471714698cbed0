use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::Validate;
use crate::blocks::{DEFAULT_EXIT_LENGTH, MAX_LANE_NUM};
use crate::generation::MAX_TRIAL;

// Widest lane that still leaves the sharpest curve room for its inner lanes
pub const MAX_LANE_WIDTH: f64 = 4.0;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    #[serde(default = "default_lane_num")]
    pub lane_num: usize,
    #[serde(default = "default_lane_width")]
    pub lane_width: f64,
    #[serde(default = "default_exit_length")]
    pub exit_length: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_trial")]
    pub max_trial: u32,
    // 0 = unbounded
    #[serde(default)]
    pub max_steps: u64,
}

fn default_lane_num() -> usize {
    3
}

fn default_lane_width() -> f64 {
    3.5
}

fn default_exit_length() -> f64 {
    DEFAULT_EXIT_LENGTH
}

fn default_max_trial() -> u32 {
    MAX_TRIAL
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            lane_num: default_lane_num(),
            lane_width: default_lane_width(),
            exit_length: default_exit_length(),
            seed: None,
            max_trial: default_max_trial(),
            max_steps: 0,
        }
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        if self.lane_num == 0 || self.lane_num > MAX_LANE_NUM {
            return Err(anyhow!("Lane number {} is out of range (1-{})", self.lane_num, MAX_LANE_NUM));
        }

        if self.lane_width <= 0.0 || self.lane_width > MAX_LANE_WIDTH {
            return Err(anyhow!("Lane width {} must be in range (0, {}]", self.lane_width, MAX_LANE_WIDTH));
        }

        if self.exit_length <= 0.0 {
            return Err(anyhow!("Exit length must be positive"));
        }

        if self.max_trial == 0 {
            return Err(anyhow!("Max trial must be at least 1"));
        }

        Ok(())
    }
}
