//! Transition Graph
//!
//! - [`TransitionMatrix`]: Laplace-smoothed Markov chain over microstates,
//!   stationary distribution and entropy rate
//! - [`Micrograph`]: k-NN graph over centroids with 2-D projections
//! - [`GraphQuality`]: weighted health score used by the NOISY override

pub mod matrix;
pub mod micrograph;
pub mod quality;

pub use matrix::TransitionMatrix;
pub use micrograph::{Micrograph, MicrographEdge, MicrographNode};
pub use quality::{GraphQuality, GraphQualityConfig};

use serde::{Deserialize, Serialize};

/// Transition graph settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Neighbors per centroid in the micrograph (0 disables edges)
    pub knn: usize,
    /// Additive smoothing for transition rows
    pub alpha: f64,
    pub quality: GraphQualityConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            knn: 4,
            alpha: 0.1,
            quality: GraphQualityConfig::default(),
        }
    }
}
