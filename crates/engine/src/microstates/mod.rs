//! Microstate Extraction
//!
//! Discretizes embedded points into microstates:
//!
//! 1. [`Clusterer::fit_predict`] runs one of three backends (k-means, DBSCAN,
//!    HDBSCAN), capped at `max_states` clusters
//! 2. [`reassign_noise`] moves noise rows to their nearest centroid and
//!    compacts ids to `[0, n)`
//! 3. optional Viterbi smoothing of the label sequence to remove flicker

pub mod assignment;
pub mod clusterer;
pub mod dbscan;
pub mod hdbscan;
pub mod kmeans;

pub use assignment::{MicrostateAssignment, reassign_noise};
pub use clusterer::{Clusterer, RawClustering};

use phasegraph_core::{Error, Result};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::smoothing::smooth_sequence;

/// Microstate extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrostateConfig {
    pub clusterer: Clusterer,
    /// Upper bound on the number of microstates
    pub max_states: usize,
    /// Apply Viterbi smoothing to the microstate sequence
    pub smooth: bool,
    /// Emission noise level used by smoothing
    pub smoothing_noise: f64,
}

impl Default for MicrostateConfig {
    fn default() -> Self {
        Self {
            clusterer: Clusterer::default(),
            max_states: 20,
            smooth: false,
            smoothing_noise: 0.05,
        }
    }
}

impl MicrostateConfig {
    pub fn validate(&self) -> Result<()> {
        self.clusterer.validate()?;
        if self.max_states == 0 {
            return Err(Error::InvalidParameter(
                "max_states must be >= 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_noise) {
            return Err(Error::InvalidParameter(format!(
                "smoothing_noise must be in [0, 1), got {}",
                self.smoothing_noise
            )));
        }
        Ok(())
    }
}

/// Single-use microstate extractor
pub struct MicrostateExtractor {
    config: MicrostateConfig,
}

impl MicrostateExtractor {
    pub fn new(config: MicrostateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MicrostateConfig {
        &self.config
    }

    /// Cluster `points` into microstates
    ///
    /// # Errors
    ///
    /// `EmptySeries` when there are no points; configuration errors from
    /// [`MicrostateConfig::validate`].
    pub fn extract(&self, points: &[Vec<f64>], rng: &mut StdRng) -> Result<MicrostateAssignment> {
        self.config.validate()?;
        if points.is_empty() {
            return Err(Error::EmptySeries);
        }

        let raw = self
            .config
            .clusterer
            .fit_predict(points, self.config.max_states, rng);
        log::debug!(
            "Clusterer produced {} clusters, {} noise rows",
            raw.n_clusters(),
            raw.noise_count()
        );

        let assignment = reassign_noise(raw, points);
        if !self.config.smooth || assignment.n_states() < 2 {
            return Ok(assignment);
        }

        // Smoothing may empty a state entirely; recompact through the same path
        let noise_before = assignment.noise_reassigned();
        let smoothed = smooth_sequence(assignment.labels(), self.config.smoothing_noise);
        let changed = smoothed
            .iter()
            .zip(assignment.labels())
            .filter(|(a, b)| a != b)
            .count();
        log::debug!("Microstate smoothing changed {changed} labels");

        let n_states = assignment.n_states();
        let recompacted = reassign_noise(
            RawClustering {
                labels: smoothed.into_iter().map(Some).collect(),
                centroids: vec![Vec::new(); n_states],
            },
            points,
        );
        Ok(MicrostateAssignment::with_noise_count(recompacted, noise_before))
    }
}
