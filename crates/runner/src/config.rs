//! Analysis configuration loading
//!
//! One JSON document configures both analyses. Every section is optional:
//!
//! ```json
//! {
//!   "engine": { "timeframe": "weekly", "seed": 7 },
//!   "multilayer": { "alert": { "alert_z": 3.5 } }
//! }
//! ```

use std::path::Path;

use phasegraph_engine::EngineConfig;
use phasegraph_hardened::MultilayerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub engine: EngineConfig,
    pub multilayer: MultilayerConfig,
}

impl AnalysisConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasegraph_core::Timeframe;

    #[test]
    fn test_empty_document_is_default() {
        let config = AnalysisConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "engine": { "timeframe": "weekly", "seed": 7 },
            "multilayer": { "alert": { "alert_z": 3.5 } }
        }"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(config.engine.timeframe, Timeframe::Weekly);
        assert_eq!(config.engine.seed, 7);
        assert_eq!(config.multilayer.alert.alert_z, 3.5);
        assert_eq!(config.multilayer.alert.persist_min, 3);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = AnalysisConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(AnalysisConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            AnalysisConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        let err = AnalysisConfig::from_file("/nonexistent/phasegraph.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/phasegraph.json"));
    }
}
