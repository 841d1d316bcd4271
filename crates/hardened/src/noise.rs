//! Layer 1: embedding parameters and noise-to-signal ratio

use phasegraph_engine::{EmbeddingConfig, EmbeddingEstimator};
use phasegraph_numerics::stats::{diff, variance};
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer1Report {
    pub embedding_dim: usize,
    pub embedding_lag: usize,
    /// True when (m, τ) were not both fixed in configuration
    pub estimated: bool,
    /// `var(Δ²x) / var(Δx)`
    pub noise_to_signal: f64,
}

/// Noise-to-signal ratio: second-difference over first-difference variance
///
/// White noise gives about 3 (`6σ² / 2σ²`); smooth signals give values near 0.
pub fn noise_to_signal(values: &[f64]) -> f64 {
    let first = diff(values);
    let second = diff(&first);
    let v1 = variance(&first);
    if v1 <= f64::EPSILON {
        return 0.0;
    }
    variance(&second) / v1
}

pub fn estimate(values: &[f64], config: &GateConfig) -> Layer1Report {
    let estimator = EmbeddingEstimator::new(EmbeddingConfig {
        lag: config.embedding_lag.or(config.embedding.lag),
        dimension: config.embedding_dim.or(config.embedding.dimension),
        ..config.embedding.clone()
    });
    let params = estimator.estimate(values);

    Layer1Report {
        embedding_dim: params.dimension,
        embedding_lag: params.lag,
        estimated: params.estimated,
        noise_to_signal: noise_to_signal(values),
    }
}
