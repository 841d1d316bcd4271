//! Threshold Calibration and Labeling
//!
//! Thresholds are quantiles of the run's own escape, stretch and confidence
//! distributions, so labels adapt to each series. The label of each row comes
//! from the ordered [`LabelRule`] decision table.

pub mod rules;
pub mod thresholds;

pub use rules::{LabelRule, RowSignals, classify};
pub use thresholds::{ThresholdPolicy, Thresholds};

use std::collections::BTreeMap;

use phasegraph_core::StateLabel;
use serde::{Deserialize, Serialize};

use crate::smoothing::smooth_sequence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelOutcome {
    pub labels: Vec<StateLabel>,
    /// How many rows each rule decided (before smoothing)
    pub rule_hits: BTreeMap<LabelRule, usize>,
}

impl LabelOutcome {
    pub fn count(&self, label: StateLabel) -> usize {
        self.labels.iter().filter(|l| **l == label).count()
    }
}

/// Label every row, optionally smoothing the label sequence
///
/// All signal slices must have the same length; extra entries in longer
/// slices are ignored.
pub fn assign_labels(
    escape: &[f64],
    stretch_mean: &[f64],
    stretch_frac: &[f64],
    confidence: &[f64],
    thresholds: &Thresholds,
    quality_score: f64,
    smoothing_noise: Option<f64>,
) -> LabelOutcome {
    let mut rule_hits = BTreeMap::new();
    let labels: Vec<StateLabel> = escape
        .iter()
        .zip(stretch_mean)
        .zip(stretch_frac)
        .zip(confidence)
        .map(|(((&escape, &stretch_mean), &stretch_frac), &confidence)| {
            let row = RowSignals {
                escape,
                stretch_mean,
                stretch_frac,
                confidence,
            };
            let (label, rule) = classify(&row, thresholds, quality_score);
            *rule_hits.entry(rule).or_insert(0) += 1;
            label
        })
        .collect();

    let labels = match smoothing_noise {
        Some(noise) => {
            let symbols: Vec<usize> = labels.iter().map(|l| l.index()).collect();
            smooth_sequence(&symbols, noise)
                .into_iter()
                .zip(&labels)
                .map(|(s, original)| StateLabel::from_index(s).unwrap_or(*original))
                .collect()
        }
        None => labels,
    };

    LabelOutcome { labels, rule_hits }
}
