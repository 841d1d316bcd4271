//! Embedding Parameter Estimation
//!
//! Lag τ: first local minimum (else global minimum) of a scoring curve over
//! candidate lags, either average mutual information or autocorrelation.
//!
//! Dimension m: increase m until the false-nearest-neighbor fraction or Cao's
//! E1 ratio stabilizes.
//!
//! Estimation never fails: a series too short to evaluate a criterion falls
//! back to the lower bound of the search range.

use phasegraph_numerics::stats::{mean, std_dev, variance};
use serde::{Deserialize, Serialize};

/// Minimum number of lagged pairs / embedded rows a criterion needs
const MIN_EVAL_POINTS: usize = 20;

/// Search bounds for lag and dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingBounds {
    pub min_lag: usize,
    pub max_lag: usize,
    pub min_dim: usize,
    pub max_dim: usize,
}

impl Default for EmbeddingBounds {
    fn default() -> Self {
        Self {
            min_lag: 1,
            max_lag: 20,
            min_dim: 2,
            max_dim: 8,
        }
    }
}

impl EmbeddingBounds {
    fn normalized(&self) -> Self {
        let min_lag = self.min_lag.max(1);
        let min_dim = self.min_dim.max(2);
        Self {
            min_lag,
            max_lag: self.max_lag.max(min_lag),
            min_dim,
            max_dim: self.max_dim.max(min_dim),
        }
    }
}

/// Lag scoring function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LagCriterion {
    /// Average mutual information from an equal-width 2-D histogram
    MutualInformation { bins: usize },
    /// Sample autocorrelation
    Autocorrelation,
}

impl Default for LagCriterion {
    fn default() -> Self {
        LagCriterion::MutualInformation { bins: 16 }
    }
}

/// Dimension stopping rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensionCriterion {
    /// Kennel et al. false nearest neighbors
    FalseNearestNeighbors { rtol: f64, atol: f64, tolerance: f64 },
    /// Cao's E1 saturation
    Cao { tolerance: f64 },
}

impl Default for DimensionCriterion {
    fn default() -> Self {
        DimensionCriterion::FalseNearestNeighbors {
            rtol: 15.0,
            atol: 2.0,
            tolerance: 0.02,
        }
    }
}

/// Configuration for embedding parameter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Fixed lag (skips lag estimation)
    pub lag: Option<usize>,
    /// Fixed dimension (skips dimension estimation)
    pub dimension: Option<usize>,
    pub bounds: EmbeddingBounds,
    pub lag_criterion: LagCriterion,
    pub dimension_criterion: DimensionCriterion,
    /// Neighbor searches only use the most recent `max_points` samples
    pub max_points: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            lag: None,
            dimension: None,
            bounds: EmbeddingBounds::default(),
            lag_criterion: LagCriterion::default(),
            dimension_criterion: DimensionCriterion::default(),
            max_points: 1000,
        }
    }
}

/// Selected embedding parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingParams {
    pub dimension: usize,
    pub lag: usize,
    /// False when both values came from configuration
    pub estimated: bool,
}

/// Automatic (m, τ) selection
pub struct EmbeddingEstimator {
    config: EmbeddingConfig,
}

impl EmbeddingEstimator {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn default_estimator() -> Self {
        Self::new(EmbeddingConfig::default())
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Estimate (m, τ) for `values`, honouring fixed values from the config
    pub fn estimate(&self, values: &[f64]) -> EmbeddingParams {
        let bounds = self.config.bounds.normalized();
        let start = values.len().saturating_sub(self.config.max_points.max(MIN_EVAL_POINTS));
        let recent = &values[start..];

        let lag = match self.config.lag {
            Some(lag) => lag.max(1),
            None => select_lag(recent, &bounds, self.config.lag_criterion),
        };
        let dimension = match self.config.dimension {
            Some(dim) => dim.max(2),
            None => select_dimension(recent, lag, &bounds, self.config.dimension_criterion),
        };

        let params = EmbeddingParams {
            dimension,
            lag,
            estimated: self.config.lag.is_none() || self.config.dimension.is_none(),
        };
        log::debug!(
            "Embedding parameters: m={} tau={} (estimated={})",
            params.dimension,
            params.lag,
            params.estimated
        );
        params
    }
}

impl Default for EmbeddingEstimator {
    fn default() -> Self {
        Self::default_estimator()
    }
}

/// Select the lag minimizing the chosen criterion
pub fn select_lag(values: &[f64], bounds: &EmbeddingBounds, criterion: LagCriterion) -> usize {
    let bounds = bounds.normalized();
    let lags: Vec<usize> = (bounds.min_lag..=bounds.max_lag)
        .filter(|&lag| values.len() >= lag + MIN_EVAL_POINTS)
        .collect();
    if lags.is_empty() {
        return bounds.min_lag;
    }

    let curve: Vec<f64> = lags
        .iter()
        .map(|&lag| match criterion {
            LagCriterion::MutualInformation { bins } => {
                average_mutual_information(values, lag, bins.max(2))
            }
            LagCriterion::Autocorrelation => autocorrelation(values, lag),
        })
        .collect();

    lags[first_local_minimum(&curve)]
}

/// Select the embedding dimension at which the criterion stabilizes
pub fn select_dimension(
    values: &[f64],
    lag: usize,
    bounds: &EmbeddingBounds,
    criterion: DimensionCriterion,
) -> usize {
    let bounds = bounds.normalized();
    let lag = lag.max(1);

    match criterion {
        DimensionCriterion::FalseNearestNeighbors {
            rtol,
            atol,
            tolerance,
        } => {
            let mut curve: Vec<(usize, f64)> = Vec::new();
            for dim in bounds.min_dim..=bounds.max_dim {
                let Some(fraction) = false_nearest_fraction(values, dim, lag, rtol, atol) else {
                    break;
                };
                if fraction < tolerance {
                    return dim;
                }
                if let Some(&(_, prev)) = curve.last() {
                    if (fraction - prev).abs() < tolerance {
                        return dim;
                    }
                }
                curve.push((dim, fraction));
            }
            lowest_point(&curve).unwrap_or(bounds.min_dim)
        }
        DimensionCriterion::Cao { tolerance } => {
            let mut e_values: Vec<(usize, f64)> = Vec::new();
            for dim in bounds.min_dim..=bounds.max_dim + 1 {
                match cao_mean_ratio(values, dim, lag) {
                    Some(e) => e_values.push((dim, e)),
                    None => break,
                }
            }
            // E1(m) = E(m+1) / E(m)
            let e1: Vec<(usize, f64)> = e_values
                .windows(2)
                .map(|w| {
                    let ratio = if w[0].1 > f64::EPSILON { w[1].1 / w[0].1 } else { 1.0 };
                    (w[0].0, ratio)
                })
                .collect();
            for w in e1.windows(2) {
                if (w[1].1 - w[0].1).abs() < tolerance {
                    return w[1].0;
                }
            }
            // Never saturated: take the dimension where E1 is closest to 1
            e1.iter()
                .min_by(|a, b| (1.0 - a.1).abs().total_cmp(&(1.0 - b.1).abs()))
                .map(|(dim, _)| *dim)
                .unwrap_or(bounds.min_dim)
        }
    }
}

fn lowest_point(curve: &[(usize, f64)]) -> Option<usize> {
    curve
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(dim, _)| *dim)
}

/// Index of the first strict local minimum, falling back to the global minimum
pub fn first_local_minimum(curve: &[f64]) -> usize {
    for i in 1..curve.len().saturating_sub(1) {
        if curve[i] < curve[i - 1] && curve[i] <= curve[i + 1] {
            return i;
        }
    }
    curve
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Average mutual information between `x(t)` and `x(t + lag)`
pub fn average_mutual_information(values: &[f64], lag: usize, bins: usize) -> f64 {
    if lag >= values.len() || bins < 2 {
        return 0.0;
    }
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if range <= f64::EPSILON {
        return 0.0;
    }

    let bin_of = |v: f64| -> usize { (((v - lo) / range * bins as f64) as usize).min(bins - 1) };

    let n_pairs = values.len() - lag;
    let mut joint = vec![0.0; bins * bins];
    let mut px = vec![0.0; bins];
    let mut py = vec![0.0; bins];
    for t in 0..n_pairs {
        let a = bin_of(values[t]);
        let b = bin_of(values[t + lag]);
        joint[a * bins + b] += 1.0;
        px[a] += 1.0;
        py[b] += 1.0;
    }

    let n = n_pairs as f64;
    let mut mi = 0.0;
    for a in 0..bins {
        for b in 0..bins {
            let c = joint[a * bins + b];
            if c > 0.0 {
                let p_ab = c / n;
                mi += p_ab * (p_ab / ((px[a] / n) * (py[b] / n))).ln();
            }
        }
    }
    mi
}

/// Sample autocorrelation at `lag`
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    if lag >= values.len() {
        return 0.0;
    }
    let m = mean(values);
    let denom = variance(values) * values.len() as f64;
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let num: f64 = (0..values.len() - lag)
        .map(|t| (values[t] - m) * (values[t + lag] - m))
        .sum();
    num / denom
}

/// Rows `[x(t), …, x(t - extra·τ)]` sharing one time index set
fn delay_rows(values: &[f64], width: usize, lag: usize) -> Vec<Vec<f64>> {
    let offset = (width - 1) * lag;
    if values.len() <= offset {
        return Vec::new();
    }
    (offset..values.len())
        .map(|t| (0..width).map(|k| values[t - k * lag]).collect())
        .collect()
}

/// Fraction of nearest neighbors in dimension `dim` that are false in `dim + 1`
///
/// Returns `None` when the series is too short to evaluate.
pub fn false_nearest_fraction(
    values: &[f64],
    dim: usize,
    lag: usize,
    rtol: f64,
    atol: f64,
) -> Option<f64> {
    let rows = delay_rows(values, dim + 1, lag);
    if rows.len() < MIN_EVAL_POINTS {
        return None;
    }
    let attractor_size = std_dev(values);
    if attractor_size <= f64::EPSILON {
        return Some(0.0);
    }

    let mut false_count = 0usize;
    let mut total = 0usize;
    for i in 0..rows.len() {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..rows.len() {
            if j.abs_diff(i) <= lag {
                continue;
            }
            let d: f64 = (0..dim).map(|k| (rows[i][k] - rows[j][k]).powi(2)).sum();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        let Some((j, d2)) = best else { continue };
        let r = d2.sqrt();
        if r <= f64::EPSILON {
            continue;
        }
        let extra = (rows[i][dim] - rows[j][dim]).abs();
        let grown = (d2 + extra * extra).sqrt();
        if extra / r > rtol || grown / attractor_size > atol {
            false_count += 1;
        }
        total += 1;
    }

    if total == 0 {
        return None;
    }
    Some(false_count as f64 / total as f64)
}

/// Cao's E(m): mean ratio of (m+1)- to m-dimensional neighbor distances
pub fn cao_mean_ratio(values: &[f64], dim: usize, lag: usize) -> Option<f64> {
    let rows = delay_rows(values, dim + 1, lag);
    if rows.len() < MIN_EVAL_POINTS {
        return None;
    }
    let chebyshev = |a: &[f64], b: &[f64], width: usize| -> f64 {
        (0..width).fold(0.0, |acc, k| acc.max((a[k] - b[k]).abs()))
    };

    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..rows.len() {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..rows.len() {
            if j == i {
                continue;
            }
            let d = chebyshev(&rows[i], &rows[j], dim);
            if d > f64::EPSILON && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        if let Some((j, d)) = best {
            sum += chebyshev(&rows[i], &rows[j], dim + 1) / d;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period).sin())
            .collect()
    }

    #[test]
    fn test_first_local_minimum() {
        assert_eq!(first_local_minimum(&[5.0, 3.0, 4.0, 1.0]), 1);
        assert_eq!(first_local_minimum(&[5.0, 4.0, 3.0, 2.0]), 3);
        assert_eq!(first_local_minimum(&[]), 0);
    }

    #[test]
    fn test_mutual_information_lag_near_quarter_period() {
        let x = sine(800, 40.0);
        let bounds = EmbeddingBounds {
            max_lag: 25,
            ..Default::default()
        };
        let lag = select_lag(&x, &bounds, LagCriterion::MutualInformation { bins: 16 });
        assert!((6..=14).contains(&lag), "lag {lag} not near a quarter period");
    }

    #[test]
    fn test_autocorrelation_of_sine() {
        let x = sine(400, 40.0);
        assert!(autocorrelation(&x, 20) < -0.9);
        assert!(autocorrelation(&x, 40) > 0.85);
        assert_eq!(autocorrelation(&[1.0; 10], 2), 0.0);
    }

    #[test]
    fn test_sine_needs_low_dimension() {
        let x = sine(600, 40.0);
        let bounds = EmbeddingBounds::default();
        let dim = select_dimension(&x, 10, &bounds, DimensionCriterion::default());
        assert!(dim <= 3, "a sine embeds in 2-3 dimensions, got {dim}");
    }

    #[test]
    fn test_cao_returns_within_bounds() {
        let x = sine(400, 33.0);
        let bounds = EmbeddingBounds::default();
        let dim = select_dimension(&x, 8, &bounds, DimensionCriterion::Cao { tolerance: 0.05 });
        assert!((bounds.min_dim..=bounds.max_dim + 1).contains(&dim));
    }

    #[test]
    fn test_short_series_falls_back_to_minimum() {
        let estimator = EmbeddingEstimator::default();
        let params = estimator.estimate(&[1.0, 2.0, 3.0]);
        assert_eq!(params.dimension, 2);
        assert_eq!(params.lag, 1);
        assert!(params.estimated);
    }

    #[test]
    fn test_fixed_parameters_are_honoured() {
        let estimator = EmbeddingEstimator::new(EmbeddingConfig {
            lag: Some(3),
            dimension: Some(4),
            ..Default::default()
        });
        let params = estimator.estimate(&sine(300, 20.0));
        assert_eq!((params.dimension, params.lag), (4, 3));
        assert!(!params.estimated);
    }
}
