//! Regime Engine Pipeline
//!
//! Runs every stage once per call on a standardized copy of the input:
//!
//! ```text
//! z-score → (m, τ) → embed → microstates → P, micrograph, quality
//!         → regimes → confidence/escape, stretch → thresholds → labels
//! ```
//!
//! Standardizing first makes the label sequence invariant to positive
//! rescaling of the input.

use std::collections::BTreeMap;

use phasegraph_core::{Error, Result, Series, StateLabel, Timeframe};
use phasegraph_numerics::stats::standardize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::dynamics::{StretchConfig, confidence_series, rolling_stretch, stretch_series};
use crate::embedding::{Embedding, EmbeddingConfig, EmbeddingEstimator, EmbeddingParams, embed};
use crate::labeling::{LabelRule, ThresholdPolicy, Thresholds, assign_labels};
use crate::metastable::{RegimeAssignment, RegimeConfig, extract_regimes};
use crate::microstates::{MicrostateAssignment, MicrostateConfig, MicrostateExtractor};
use crate::transition::{GraphConfig, GraphQuality, Micrograph, TransitionMatrix};

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub embedding: EmbeddingConfig,
    pub microstates: MicrostateConfig,
    pub graph: GraphConfig,
    pub regimes: RegimeConfig,
    pub stretch: StretchConfig,
    /// Selects the threshold preset when `policy` is not given
    pub timeframe: Timeframe,
    pub policy: Option<ThresholdPolicy>,
    /// Viterbi-smooth the final label sequence
    pub smooth_labels: bool,
    pub label_smoothing_noise: f64,
    /// Seed for every stochastic step
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            microstates: MicrostateConfig::default(),
            graph: GraphConfig::default(),
            regimes: RegimeConfig::default(),
            stretch: StretchConfig::default(),
            timeframe: Timeframe::default(),
            policy: None,
            smooth_labels: false,
            label_smoothing_noise: 0.05,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Explicit policy, or the preset for the configured timeframe
    pub fn effective_policy(&self) -> ThresholdPolicy {
        self.policy
            .unwrap_or_else(|| ThresholdPolicy::for_timeframe(self.timeframe))
    }

    pub fn validate(&self) -> Result<()> {
        self.microstates.validate()?;
        self.effective_policy().validate()?;
        if self.regimes.n_regimes == 0 {
            return Err(Error::InvalidParameter(
                "n_regimes must be >= 1".to_string(),
            ));
        }
        if !(self.graph.alpha >= 0.0 && self.graph.alpha.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "graph alpha must be finite and >= 0, got {}",
                self.graph.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.stretch.clip_low)
            || !(0.0..=1.0).contains(&self.stretch.clip_high)
            || self.stretch.clip_low > self.stretch.clip_high
        {
            return Err(Error::InvalidParameter(
                "stretch clip quantiles must satisfy 0 <= low <= high <= 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.label_smoothing_noise) {
            return Err(Error::InvalidParameter(format!(
                "label_smoothing_noise must be in [0, 1), got {}",
                self.label_smoothing_noise
            )));
        }
        Ok(())
    }
}

/// Everything one engine run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineReport {
    pub params: EmbeddingParams,
    pub timeframe: Timeframe,
    pub embedding: Embedding,
    pub microstates: MicrostateAssignment,
    pub transition: TransitionMatrix,
    pub micrograph: Micrograph,
    pub quality: GraphQuality,
    pub regimes: RegimeAssignment,
    pub confidence: Vec<f64>,
    pub escape: Vec<f64>,
    pub stretch: Vec<f64>,
    pub stretch_mean: Vec<f64>,
    pub stretch_frac: Vec<f64>,
    pub policy: ThresholdPolicy,
    pub thresholds: Thresholds,
    /// One label per embedding row
    pub labels: Vec<StateLabel>,
    pub rule_hits: BTreeMap<LabelRule, usize>,
}

impl EngineReport {
    pub fn latest_label(&self) -> Option<StateLabel> {
        self.labels.last().copied()
    }

    pub fn latest_confidence(&self) -> Option<f64> {
        self.confidence.last().copied()
    }

    /// Series index of embedding row `row`
    pub fn series_index(&self, row: usize) -> usize {
        self.embedding.series_index(row)
    }

    pub fn label_counts(&self) -> BTreeMap<StateLabel, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// Fraction of rows carrying `label`
    pub fn label_fraction(&self, label: StateLabel) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().filter(|l| **l == label).count() as f64 / self.labels.len() as f64
    }
}

/// Regime engine: stateless apart from its configuration
pub struct RegimeEngine {
    config: EngineConfig,
}

impl RegimeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, series: &Series) -> Result<EngineReport> {
        self.analyze_values(&series.values())
    }

    pub fn analyze_values(&self, values: &[f64]) -> Result<EngineReport> {
        self.config.validate()?;
        if values.is_empty() {
            return Err(Error::EmptySeries);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteValue { index });
        }

        let standardized = standardize(values);
        let params = EmbeddingEstimator::new(self.config.embedding.clone()).estimate(&standardized);
        let embedding = embed(&standardized, params.dimension, params.lag)?;

        let policy = self.config.effective_policy();
        let required_rows = (4 * self.config.microstates.max_states)
            .max(policy.stretch_window + self.config.stretch.theiler_window + 2);
        if embedding.len() < required_rows {
            return Err(Error::SeriesTooShort {
                required: required_rows + embedding.offset(),
                actual: values.len(),
            });
        }
        log::debug!(
            "Embedded {} points: m={} tau={} rows={}",
            values.len(),
            params.dimension,
            params.lag,
            embedding.len()
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let microstates = MicrostateExtractor::new(self.config.microstates.clone())
            .extract(embedding.points(), &mut rng)?;
        let occupancy = microstates.occupancy();
        log::debug!(
            "Microstates: {} states ({} noise rows reassigned)",
            microstates.n_states(),
            microstates.noise_reassigned()
        );

        let transition = TransitionMatrix::from_labels(
            microstates.labels(),
            microstates.n_states(),
            self.config.graph.alpha,
        )?;
        let escape_rates = transition.escape_rates();
        log::debug!(
            "Transition matrix: mean one-step escape {:.3}",
            escape_rates.iter().sum::<f64>() / escape_rates.len().max(1) as f64
        );
        let micrograph = Micrograph::build(microstates.centroids(), &occupancy, self.config.graph.knn);
        let quality = GraphQuality::score(&micrograph, &occupancy, &transition, &self.config.graph.quality);
        if quality.score < policy.noisy_floor {
            log::warn!(
                "Graph quality {:.3} below noisy floor {:.3}; all rows will be NOISY",
                quality.score,
                policy.noisy_floor
            );
        }

        let regimes = extract_regimes(
            &transition,
            self.config.regimes.n_regimes,
            self.config.regimes.method,
            self.config.seed,
        );

        let (confidence, escape) = confidence_series(microstates.labels(), &transition, &regimes);
        let stretch = stretch_series(&embedding, &self.config.stretch);
        let (stretch_mean, stretch_frac) = rolling_stretch(&stretch, policy.stretch_window);

        let thresholds = Thresholds::calibrate(&escape, &stretch_mean, &stretch_frac, &confidence, &policy);
        let outcome = assign_labels(
            &escape,
            &stretch_mean,
            &stretch_frac,
            &confidence,
            &thresholds,
            quality.score,
            self.config
                .smooth_labels
                .then_some(self.config.label_smoothing_noise),
        );

        let report = EngineReport {
            params,
            timeframe: self.config.timeframe,
            embedding,
            microstates,
            transition,
            micrograph,
            quality,
            regimes,
            confidence,
            escape,
            stretch,
            stretch_mean,
            stretch_frac,
            policy,
            thresholds,
            labels: outcome.labels,
            rule_hits: outcome.rule_hits,
        };
        log::info!(
            "Regime analysis: {} rows, {} regimes, quality {:.3}, stable {:.1}%, latest {:?}",
            report.labels.len(),
            report.regimes.n_regimes(),
            report.quality.score,
            100.0 * report.label_fraction(StateLabel::Stable),
            report.latest_label()
        );
        Ok(report)
    }
}
