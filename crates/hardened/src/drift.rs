//! Layer 3: structural drift score
//!
//! Slides a reference window and the current window that immediately follows
//! it across the series (causal: the current window ends at `t`). Each step
//! yields a principal-angle distance and a share gap; both are robust
//! z-scored against their own expanding history and combined as
//!
//! ```text
//! structural_score = z(angle) + λ·z(gap)
//! ```

use phasegraph_numerics::rolling::expanding_robust_z;
use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::subspace::{Layer2Report, analyze_window, compare, marchenko_pastur_outliers};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer3Report {
    /// One score per evaluated window pair, oldest first
    pub structural_scores: Vec<f64>,
    pub latest_score: f64,
    /// Series index at which each score's current window ends
    pub window_ends: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftSeries {
    pub angles: Vec<f64>,
    pub gaps: Vec<f64>,
    pub window_ends: Vec<usize>,
    pub subspace: Layer2Report,
}

/// Raw angle/gap series over all causal window pairs
pub fn drift_series(values: &[f64], config: &WindowConfig, hankel_rows: usize) -> DriftSeries {
    let r = config.reference_window;
    let c = config.current_window;
    let span = r + c;

    let mut angles = Vec::new();
    let mut gaps = Vec::new();
    let mut window_ends = Vec::new();
    let mut subspace = Layer2Report {
        hankel_rows,
        windows_evaluated: 0,
        reference_rank: 0,
        current_rank: 0,
        latest_angle_distance: 0.0,
        latest_share_gap: 0.0,
        mp_outliers: 0,
    };

    if values.len() < span {
        return DriftSeries {
            angles,
            gaps,
            window_ends,
            subspace,
        };
    }

    // Align the last window with the end of the series
    let last_end = values.len() - 1;
    let first_end = span - 1 + (last_end - (span - 1)) % config.stride.max(1);
    for end in (first_end..=last_end).step_by(config.stride.max(1)) {
        let current = &values[end + 1 - c..=end];
        let reference = &values[end + 1 - span..end + 1 - c];

        let ref_sub = analyze_window(reference, hankel_rows);
        let cur_sub = analyze_window(current, hankel_rows);
        let (angle, gap) = compare(&ref_sub, &cur_sub);

        angles.push(angle);
        gaps.push(gap);
        window_ends.push(end);

        subspace.reference_rank = ref_sub.rank;
        subspace.current_rank = cur_sub.rank;
        subspace.latest_angle_distance = angle;
        subspace.latest_share_gap = gap;
        subspace.mp_outliers =
            marchenko_pastur_outliers(&cur_sub.singular_values, cur_sub.rows, cur_sub.cols);
    }
    subspace.windows_evaluated = angles.len();

    DriftSeries {
        angles,
        gaps,
        window_ends,
        subspace,
    }
}

/// `z(angle) + λ·z(gap)` with expanding-window robust z-scores
pub fn structural_scores(drift: &DriftSeries, config: &WindowConfig) -> Layer3Report {
    let z_angle = expanding_robust_z(&drift.angles, config.min_drift_history);
    let z_gap = expanding_robust_z(&drift.gaps, config.min_drift_history);
    let structural_scores: Vec<f64> = z_angle
        .iter()
        .zip(&z_gap)
        .map(|(a, g)| a + config.gap_weight * g)
        .collect();

    Layer3Report {
        latest_score: structural_scores.last().copied().unwrap_or(0.0),
        structural_scores,
        window_ends: drift.window_ends.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(range: std::ops::Range<usize>, period: f64) -> impl Iterator<Item = f64> {
        range.map(move |i| (2.0 * std::f64::consts::PI * i as f64 / period).sin())
    }

    fn small_windows() -> WindowConfig {
        WindowConfig {
            reference_window: 60,
            current_window: 20,
            hankel_rows: Some(6),
            stride: 1,
            gap_weight: 0.5,
            min_drift_history: 10,
        }
    }

    #[test]
    fn test_windows_are_causal_and_aligned() {
        let values: Vec<f64> = sine(0..200, 13.7).collect();
        let config = WindowConfig {
            stride: 3,
            ..small_windows()
        };
        let drift = drift_series(&values, &config, 6);
        assert_eq!(*drift.window_ends.last().unwrap(), 199);
        assert!(drift.window_ends[0] >= 79);
        assert!(drift.window_ends.windows(2).all(|w| w[1] - w[0] == 3));
        assert_eq!(drift.subspace.windows_evaluated, drift.angles.len());
    }

    #[test]
    fn test_too_short_gives_empty_series() {
        let values: Vec<f64> = sine(0..50, 13.7).collect();
        let drift = drift_series(&values, &small_windows(), 6);
        assert!(drift.angles.is_empty());
        let report = structural_scores(&drift, &small_windows());
        assert_eq!(report.latest_score, 0.0);
    }

    #[test]
    fn test_frequency_change_raises_score() {
        let mut values: Vec<f64> = sine(0..300, 23.1).collect();
        values.extend(sine(300..320, 4.3));
        let config = small_windows();
        let drift = drift_series(&values, &config, 6);
        let report = structural_scores(&drift, &config);
        assert!(report.latest_score > 3.0, "score {}", report.latest_score);
    }
}
