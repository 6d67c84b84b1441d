//! Error types for fluctlb.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LbmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate density {density} at cell {cell:?} in step {step}")]
    DegenerateDensity {
        cell: [usize; 3],
        step: u64,
        density: f64,
    },

    #[error("Structure factor flushed before any sample was accumulated")]
    EmptyStructureFactor,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LbmError>;
