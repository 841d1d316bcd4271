//! Causal window statistics
//!
//! Every output at index `t` depends only on inputs at indices `<= t`.

use crate::stats::{mean, robust_z, std_dev};

/// Trailing mean over at most `window` values ending at each index
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|t| {
            let start = (t + 1).saturating_sub(window);
            mean(&values[start..=t])
        })
        .collect()
}

/// Trailing population standard deviation over at most `window` values
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|t| {
            let start = (t + 1).saturating_sub(window);
            std_dev(&values[start..=t])
        })
        .collect()
}

/// Trailing fraction of strictly positive values
pub fn rolling_fraction_positive(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|t| {
            let start = (t + 1).saturating_sub(window);
            let slice = &values[start..=t];
            slice.iter().filter(|v| **v > 0.0).count() as f64 / slice.len() as f64
        })
        .collect()
}

/// Expanding-window robust z-score of each value against its own history
///
/// The first `min_history` entries are 0.0 (not enough baseline).
pub fn expanding_robust_z(values: &[f64], min_history: usize) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t + 1 < min_history.max(2) {
                0.0
            } else {
                robust_z(values[t], &values[..=t])
            }
        })
        .collect()
}
