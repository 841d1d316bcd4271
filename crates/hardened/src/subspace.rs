//! Layer 2: Hankel subspaces
//!
//! For a window `w` of length `W` and row count `L`, the trajectory matrix is
//! `H[i][j] = w[i + j]` (`L × (W - L + 1)`) after removing the window mean.
//! Its SVD gives:
//!
//! - effective rank by the Gavish–Donoho optimal hard threshold
//!   `ω(β)·median(σ)`, `ω(β) ≈ 0.56β³ - 0.95β² + 1.82β + 1.43`
//! - the leading singular-value share `σ₁ / Σσ`
//! - a Marchenko–Pastur outlier count (diagnostic)
//!
//! Two windows are compared through the principal angles between their
//! top-rank left singular subspaces.

use nalgebra::DMatrix;
use phasegraph_numerics::stats::{mean, median};
use serde::{Deserialize, Serialize};

/// SVD summary of one window's trajectory matrix
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSubspace {
    /// Descending
    pub singular_values: Vec<f64>,
    /// Left singular vectors, columns aligned with `singular_values`
    pub basis: DMatrix<f64>,
    pub rank: usize,
    pub rows: usize,
    pub cols: usize,
}

/// Diagnostics for the most recent window pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer2Report {
    pub hankel_rows: usize,
    pub windows_evaluated: usize,
    pub reference_rank: usize,
    pub current_rank: usize,
    /// Principal-angle geodesic distance
    pub latest_angle_distance: f64,
    /// Leading singular-value share gap
    pub latest_share_gap: f64,
    pub mp_outliers: usize,
}

/// Demeaned trajectory matrix of `window` with `rows` rows
pub fn hankel(window: &[f64], rows: usize) -> DMatrix<f64> {
    let rows = rows.clamp(1, window.len().max(1));
    let cols = window.len() + 1 - rows;
    let m = mean(window);
    DMatrix::from_fn(rows, cols, |i, j| window[i + j] - m)
}

/// Gavish–Donoho ω(β) for unknown noise level, `β = min/max` aspect ratio
pub fn gavish_donoho_omega(beta: f64) -> f64 {
    let b = beta.clamp(0.0, 1.0);
    0.56 * b.powi(3) - 0.95 * b.powi(2) + 1.82 * b + 1.43
}

/// Singular values above `ω(β)·median(σ)`, never below 1
pub fn effective_rank(singular_values: &[f64], rows: usize, cols: usize) -> usize {
    if singular_values.is_empty() {
        return 1;
    }
    let beta = rows.min(cols) as f64 / rows.max(cols).max(1) as f64;
    let cutoff = gavish_donoho_omega(beta) * median(singular_values);
    singular_values
        .iter()
        .filter(|s| **s > cutoff)
        .count()
        .clamp(1, singular_values.len())
}

/// Eigenvalues of `HHᵀ/cols` above the Marchenko–Pastur upper edge
///
/// The noise variance is estimated from the median eigenvalue.
pub fn marchenko_pastur_outliers(singular_values: &[f64], rows: usize, cols: usize) -> usize {
    if singular_values.is_empty() || cols == 0 {
        return 0;
    }
    let eigenvalues: Vec<f64> = singular_values
        .iter()
        .map(|s| s * s / cols as f64)
        .collect();
    let noise_var = median(&eigenvalues);
    let ratio = rows as f64 / cols as f64;
    let edge = noise_var * (1.0 + ratio.sqrt()).powi(2);
    eigenvalues.iter().filter(|e| **e > edge).count()
}

/// SVD of the window's trajectory matrix, singular values sorted descending
pub fn analyze_window(window: &[f64], rows: usize) -> WindowSubspace {
    let h = hankel(window, rows);
    let (rows, cols) = h.shape();
    let svd = h.svd(true, false);

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| {
        svd.singular_values[b]
            .total_cmp(&svd.singular_values[a])
            .then(a.cmp(&b))
    });
    let singular_values: Vec<f64> = order.iter().map(|&i| svd.singular_values[i]).collect();
    let basis = match svd.u {
        Some(u) => DMatrix::from_fn(u.nrows(), order.len(), |r, c| u[(r, order[c])]),
        None => DMatrix::identity(rows, order.len()),
    };
    let rank = effective_rank(&singular_values, rows, cols);

    WindowSubspace {
        singular_values,
        basis,
        rank,
        rows,
        cols,
    }
}

/// Principal angles between the spans of the first `k` columns of `a` and `b`
pub fn principal_angles(a: &DMatrix<f64>, b: &DMatrix<f64>, k: usize) -> Vec<f64> {
    let k = k.min(a.ncols()).min(b.ncols());
    if k == 0 {
        return Vec::new();
    }
    let product = a.columns(0, k).transpose() * b.columns(0, k);
    product
        .singular_values()
        .iter()
        .map(|s| s.clamp(-1.0, 1.0).acos())
        .collect()
}

/// Grassmann geodesic distance `sqrt(Σθ²)`
pub fn geodesic_distance(angles: &[f64]) -> f64 {
    angles.iter().map(|t| t * t).sum::<f64>().sqrt()
}

/// `σ₁ / Σσ` (0 for an all-zero spectrum)
pub fn leading_share(singular_values: &[f64]) -> f64 {
    let total: f64 = singular_values.iter().sum();
    match singular_values.first() {
        Some(first) if total > f64::EPSILON => first / total,
        _ => 0.0,
    }
}

/// Angle distance and share gap between a reference and a current window
///
/// Angles use the leading `min(rank_ref, rank_cur)` directions; a change in
/// rank surfaces through the share gap instead.
pub fn compare(reference: &WindowSubspace, current: &WindowSubspace) -> (f64, f64) {
    let k = reference.rank.min(current.rank);
    let angles = principal_angles(&reference.basis, &current.basis, k);
    let gap = (leading_share(&current.singular_values) - leading_share(&reference.singular_values))
        .abs();
    (geodesic_distance(&angles), gap)
}
