use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoadGenError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("degenerate lane geometry: {0}")]
    DegenerateGeometry(String),

    #[error("lane bundle {start} -> {end} already exists")]
    DuplicateBundle { start: String, end: String },

    #[error("lane bundle {start} -> {end} not found")]
    NotFound { start: String, end: String },

    #[error("block search exhausted after placing {placed} of {target} blocks")]
    SearchExhausted { placed: usize, target: usize },

    #[error("unknown block type code '{0}'")]
    UnknownBlockType(char),

    #[error("block {block} has no socket {socket}")]
    MissingSocket { block: usize, socket: usize },
}

pub type Result<T> = std::result::Result<T, RoadGenError>;
