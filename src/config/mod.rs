use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod blocks;
pub mod map;

pub use blocks::*;
pub use map::*;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub blocks: BlockCatalogConfig,
}

impl GeneratorConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(content)?;

        // Validate configurations
        config.map.validate()?;
        config.blocks.validate()?;

        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.map.seed = Some(seed);
        self
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
