pub mod blocks;
pub mod config;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod network;
pub mod persistence;
pub mod world;

pub use config::{GeneratorConfig, Validate};
pub use error::{Result, RoadGenError};
pub use generation::{Big, GenerateMethod, GenerateParameter};
pub use network::RoadNetwork;
