//! Runner errors

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] phasegraph_core::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Batch task for '{name}' failed: {reason}")]
    Task { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RunnerError>;
