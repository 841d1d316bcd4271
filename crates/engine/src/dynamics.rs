//! Confidence, Escape and Stretch
//!
//! Per embedding row:
//!
//! - **confidence**: transition mass from the active microstate toward
//!   microstates of its own regime; **escape** is `1 - confidence`
//! - **stretch**: `ln(d(i+1, j+1) / d(i, j))` for the nearest neighbor `j`
//!   outside the Theiler window, clipped to its 5th/95th percentiles
//! - **rolling stretch**: trailing mean and trailing fraction of positive
//!   stretch values

use phasegraph_numerics::distance::{euclidean, nearest_neighbor};
use phasegraph_numerics::rolling::{rolling_fraction_positive, rolling_mean};
use phasegraph_numerics::stats::clip_to_quantiles;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::metastable::RegimeAssignment;
use crate::transition::TransitionMatrix;

/// Guard against zero neighbor distances in the log ratio
const DISTANCE_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchConfig {
    /// Neighbors closer than this in time are excluded
    pub theiler_window: usize,
    pub clip_low: f64,
    pub clip_high: f64,
}

impl Default for StretchConfig {
    fn default() -> Self {
        Self {
            theiler_window: 10,
            clip_low: 0.05,
            clip_high: 0.95,
        }
    }
}

/// Confidence and escape per row
pub fn confidence_series(
    labels: &[usize],
    matrix: &TransitionMatrix,
    regimes: &RegimeAssignment,
) -> (Vec<f64>, Vec<f64>) {
    // Precompute per microstate, then broadcast over rows
    let per_state: Vec<f64> = (0..matrix.n_states())
        .map(|s| {
            let home = regimes.regime_of(s);
            matrix
                .row(s)
                .iter()
                .enumerate()
                .filter(|(j, _)| regimes.regime_of(*j) == home)
                .map(|(_, p)| p)
                .sum::<f64>()
                .clamp(0.0, 1.0)
        })
        .collect();

    let confidence: Vec<f64> = labels.iter().map(|l| per_state[*l]).collect();
    let escape = confidence.iter().map(|c| 1.0 - c).collect();
    (confidence, escape)
}

/// Clipped local stretch per embedding row
///
/// Rows without a valid successor pair reuse the nearest computed value; an
/// embedding too short for any pair yields all zeros.
pub fn stretch_series(embedding: &Embedding, config: &StretchConfig) -> Vec<f64> {
    let points = embedding.points();
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let last = n - 1;
    let theiler = config.theiler_window;

    let raw: Vec<Option<f64>> = (0..last)
        .map(|i| {
            let (j, d0) =
                nearest_neighbor(points, &points[i], |j| j < last && j.abs_diff(i) > theiler)?;
            let d1 = euclidean(&points[i + 1], &points[j + 1]);
            Some(((d1 + DISTANCE_FLOOR) / (d0 + DISTANCE_FLOOR)).ln())
        })
        .collect();

    let computed: Vec<f64> = raw.iter().flatten().copied().collect();
    if computed.is_empty() {
        return vec![0.0; n];
    }
    let clipped = clip_to_quantiles(&computed, config.clip_low, config.clip_high);

    // Scatter the clipped values back, then pad gaps by edge repetition
    let mut out: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut values = clipped.into_iter();
    for r in &raw {
        out.push(r.and_then(|_| values.next()));
    }
    out.push(None);
    fill_by_repetition(out)
}

fn fill_by_repetition(values: Vec<Option<f64>>) -> Vec<f64> {
    let first = values.iter().flatten().next().copied().unwrap_or(0.0);
    let mut last_seen = first;
    values
        .into_iter()
        .map(|v| {
            if let Some(x) = v {
                last_seen = x;
            }
            last_seen
        })
        .collect()
}

/// Trailing mean and trailing fraction of positive stretch
pub fn rolling_stretch(stretch: &[f64], window: usize) -> (Vec<f64>, Vec<f64>) {
    (
        rolling_mean(stretch, window),
        rolling_fraction_positive(stretch, window),
    )
}
