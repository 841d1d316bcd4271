//! Descriptive and robust statistics
//!
//! All functions are total: empty or degenerate inputs return a neutral value
//! (usually `0.0`) instead of panicking or producing NaN.

/// Scale factor turning a MAD into a normal-consistent standard deviation
pub const MAD_SCALE: f64 = 1.4826;

/// Arithmetic mean (0.0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Quantile with linear interpolation between order statistics
///
/// `q` is clamped to [0, 1]. NaNs sort last and should be filtered by callers.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, q)
}

/// Quantile of an already ascending-sorted slice
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Median absolute deviation (unscaled)
pub fn mad(values: &[f64]) -> f64 {
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

/// Robust z-score of `x` against a reference sample
///
/// Uses median and scaled MAD; falls back to the standard deviation when the
/// MAD collapses, and to 0.0 when the reference has no spread at all.
pub fn robust_z(x: f64, reference: &[f64]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let med = median(reference);
    let mut scale = MAD_SCALE * mad(reference);
    if scale <= f64::EPSILON {
        scale = std_dev(reference);
    }
    if scale <= f64::EPSILON {
        return 0.0;
    }
    (x - med) / scale
}

/// Standardize to zero mean and unit variance (identity shift when flat)
pub fn standardize(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let s = std_dev(values);
    if s <= f64::EPSILON {
        return values.iter().map(|x| x - m).collect();
    }
    values.iter().map(|x| (x - m) / s).collect()
}

/// Clip every value into the `[lo_q, hi_q]` quantile band of the sample
pub fn clip_to_quantiles(values: &[f64], lo_q: f64, hi_q: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let lo = quantile(values, lo_q);
    let hi = quantile(values, hi_q);
    values.iter().map(|x| x.clamp(lo, hi)).collect()
}

/// First differences `x[i+1] - x[i]`
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Shannon entropy of a count vector normalized to [0, 1] by `ln(k)`
///
/// `k` is the number of categories (the vector length). Returns 0.0 when
/// there is fewer than two categories or no mass.
pub fn normalized_entropy(counts: &[f64]) -> f64 {
    let k = counts.len();
    let total: f64 = counts.iter().filter(|c| **c > 0.0).sum();
    if k < 2 || total <= 0.0 {
        return 0.0;
    }
    let h: f64 = counts
        .iter()
        .filter(|c| **c > 0.0)
        .map(|c| {
            let p = c / total;
            -p * p.ln()
        })
        .sum();
    (h / (k as f64).ln()).clamp(0.0, 1.0)
}

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_variance() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&v), 2.5);
        assert_relative_eq!(variance(&v), 1.25);
        assert_eq!(variance(&[7.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(quantile(&v, 0.0), 1.0);
        assert_relative_eq!(quantile(&v, 1.0), 4.0);
        assert_relative_eq!(quantile(&v, 0.5), 2.5);
        assert_relative_eq!(quantile(&v, 0.25), 1.75);
    }

    #[test]
    fn test_robust_z_ignores_outlier() {
        let mut reference: Vec<f64> = (0..50).map(|i| (i % 5) as f64).collect();
        reference.push(1000.0);
        let z = robust_z(2.0, &reference);
        assert!(z.abs() < 0.5, "median value should have small z, got {z}");
        assert!(robust_z(1000.0, &reference) > 100.0);
    }

    #[test]
    fn test_robust_z_flat_reference() {
        assert_eq!(robust_z(5.0, &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_clip_to_quantiles() {
        let v: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        let clipped = clip_to_quantiles(&v, 0.05, 0.95);
        assert_relative_eq!(clipped[0], 5.0);
        assert_relative_eq!(clipped[100], 95.0);
        assert_relative_eq!(clipped[50], 50.0);
    }

    #[test]
    fn test_normalized_entropy_bounds() {
        assert_relative_eq!(normalized_entropy(&[5.0, 5.0, 5.0, 5.0]), 1.0);
        assert_eq!(normalized_entropy(&[10.0, 0.0, 0.0]), 0.0);
        assert_eq!(normalized_entropy(&[3.0]), 0.0);
    }

    #[test]
    fn test_standardize() {
        let z = standardize(&[2.0, 4.0, 6.0]);
        assert_relative_eq!(mean(&z), 0.0, epsilon = 1e-12);
        assert_relative_eq!(std_dev(&z), 1.0, epsilon = 1e-12);
    }
}
