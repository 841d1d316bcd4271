//! Metastable Regime Extraction
//!
//! Groups microstates into a few coarse regimes the chain tends to stay in.
//!
//! - **Spectral** (default): affinity `A = (P + Pᵀ)/2`, symmetric normalized
//!   Laplacian `I - D^-1/2 A D^-1/2`, eigenvectors of the `k` smallest
//!   eigenvalues, rows normalized, seeded k-means.
//! - **PCCA-like**: dominant `k`-dimensional invariant subspace of `Pᵀ` by
//!   seeded orthogonal iteration on the lazy operator `(Pᵀ + I)/2`, rows
//!   normalized, seeded k-means.

use nalgebra::{DMatrix, SymmetricEigen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::microstates::kmeans::{DEFAULT_MAX_ITER, DEFAULT_N_INIT, kmeans};
use crate::transition::TransitionMatrix;

const ORTHOGONAL_ITERATIONS: usize = 300;
const ORTHOGONAL_TOL: f64 = 1e-10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetastableMethod {
    #[default]
    Spectral,
    PccaLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub n_regimes: usize,
    pub method: MetastableMethod,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            n_regimes: 3,
            method: MetastableMethod::default(),
        }
    }
}

/// Microstate id → regime id, regime ids contiguous from 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeAssignment {
    regimes: Vec<usize>,
    n_regimes: usize,
}

impl RegimeAssignment {
    /// Compact arbitrary group ids to `[0, n)` by first appearance
    pub fn from_groups(groups: &[usize]) -> Self {
        let mut remap: Vec<(usize, usize)> = Vec::new();
        let regimes = groups
            .iter()
            .map(|g| match remap.iter().find(|(old, _)| old == g) {
                Some((_, new)) => *new,
                None => {
                    let new = remap.len();
                    remap.push((*g, new));
                    new
                }
            })
            .collect();
        Self {
            regimes,
            n_regimes: remap.len(),
        }
    }

    pub fn identity(n_states: usize) -> Self {
        Self {
            regimes: (0..n_states).collect(),
            n_regimes: n_states,
        }
    }

    pub fn single(n_states: usize) -> Self {
        Self {
            regimes: vec![0; n_states],
            n_regimes: usize::from(n_states > 0),
        }
    }

    pub fn regime_of(&self, microstate: usize) -> usize {
        self.regimes[microstate]
    }

    pub fn regimes(&self) -> &[usize] {
        &self.regimes
    }

    pub fn n_regimes(&self) -> usize {
        self.n_regimes
    }

    /// Microstates per regime
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_regimes];
        for r in &self.regimes {
            sizes[*r] += 1;
        }
        sizes
    }
}

/// Partition the microstates of `matrix` into at most `k` regimes
pub fn extract_regimes(
    matrix: &TransitionMatrix,
    k: usize,
    method: MetastableMethod,
    seed: u64,
) -> RegimeAssignment {
    let n = matrix.n_states();
    if k >= n {
        return RegimeAssignment::identity(n);
    }
    if k <= 1 {
        return RegimeAssignment::single(n);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let embedding = match method {
        MetastableMethod::Spectral => spectral_coordinates(matrix, k),
        MetastableMethod::PccaLike => invariant_subspace_coordinates(matrix, k, &mut rng),
    };
    let rows = normalize_rows(&embedding);
    let fit = kmeans(&rows, k, DEFAULT_N_INIT, DEFAULT_MAX_ITER, &mut rng);

    let assignment = RegimeAssignment::from_groups(&fit.labels);
    log::debug!(
        "Metastable extraction ({method:?}): {} microstates → {} regimes",
        n,
        assignment.n_regimes()
    );
    assignment
}

/// Eigenvectors of the `k` smallest normalized-Laplacian eigenvalues
fn spectral_coordinates(matrix: &TransitionMatrix, k: usize) -> DMatrix<f64> {
    let p = matrix.to_matrix();
    let affinity = (&p + p.transpose()) * 0.5;
    let n = affinity.nrows();

    let inv_sqrt_degree: Vec<f64> = (0..n)
        .map(|i| {
            let d: f64 = affinity.row(i).sum();
            if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 }
        })
        .collect();
    let laplacian = DMatrix::from_fn(n, n, |i, j| {
        let identity = if i == j { 1.0 } else { 0.0 };
        identity - inv_sqrt_degree[i] * affinity[(i, j)] * inv_sqrt_degree[j]
    });

    let eigen = SymmetricEigen::new(laplacian);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .total_cmp(&eigen.eigenvalues[b])
            .then(a.cmp(&b))
    });

    DMatrix::from_fn(n, k, |i, c| eigen.eigenvectors[(i, order[c])])
}

/// Orthonormal basis of the dominant `k`-dimensional subspace of `(Pᵀ + I)/2`
fn invariant_subspace_coordinates(
    matrix: &TransitionMatrix,
    k: usize,
    rng: &mut StdRng,
) -> DMatrix<f64> {
    let n = matrix.n_states();
    let lazy = (matrix.to_matrix().transpose() + DMatrix::identity(n, n)) * 0.5;

    let start = DMatrix::from_fn(n, k, |_, _| rng.r#gen::<f64>() - 0.5);
    let mut basis = start.qr().q();
    for _ in 0..ORTHOGONAL_ITERATIONS {
        let next = (&lazy * &basis).qr().q();
        // Subspace change: ‖Q_next Q_nextᵀ Q - Q‖
        let projected = &next * (next.transpose() * &basis);
        let change = (&projected - &basis).norm();
        basis = next;
        if change < ORTHOGONAL_TOL {
            break;
        }
    }
    basis
}

fn normalize_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..m.nrows())
        .map(|i| {
            let row: Vec<f64> = m.row(i).iter().copied().collect();
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > f64::EPSILON {
                row.iter().map(|x| x / norm).collect()
            } else {
                row
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two blocks {0,1,2} and {3,4,5} that rarely cross
    fn two_block_labels() -> Vec<usize> {
        let mut labels = Vec::new();
        for round in 0..20 {
            for _ in 0..10 {
                for s in [0, 1, 2, 1] {
                    labels.push(s + if round % 2 == 0 { 0 } else { 3 });
                }
            }
        }
        labels
    }

    fn assert_two_blocks(a: &RegimeAssignment) {
        assert_eq!(a.n_regimes(), 2);
        let r = a.regimes();
        assert_eq!(r[0], r[1]);
        assert_eq!(r[1], r[2]);
        assert_eq!(r[3], r[4]);
        assert_eq!(r[4], r[5]);
        assert_ne!(r[0], r[3]);
    }

    #[test]
    fn test_spectral_finds_blocks() {
        let m = TransitionMatrix::from_labels(&two_block_labels(), 6, 0.01).unwrap();
        let a = extract_regimes(&m, 2, MetastableMethod::Spectral, 7);
        assert_two_blocks(&a);
    }

    #[test]
    fn test_pcca_like_finds_blocks() {
        let m = TransitionMatrix::from_labels(&two_block_labels(), 6, 0.01).unwrap();
        let a = extract_regimes(&m, 2, MetastableMethod::PccaLike, 7);
        assert_two_blocks(&a);
    }

    #[test]
    fn test_degenerate_counts() {
        let m = TransitionMatrix::from_labels(&[0, 1, 2, 3], 4, 0.1).unwrap();
        assert_eq!(
            extract_regimes(&m, 4, MetastableMethod::Spectral, 1),
            RegimeAssignment::identity(4)
        );
        assert_eq!(
            extract_regimes(&m, 9, MetastableMethod::PccaLike, 1),
            RegimeAssignment::identity(4)
        );
        let single = extract_regimes(&m, 1, MetastableMethod::Spectral, 1);
        assert_eq!(single.n_regimes(), 1);
        assert_eq!(single.sizes(), vec![4]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let m = TransitionMatrix::from_labels(&two_block_labels(), 6, 0.5).unwrap();
        for method in [MetastableMethod::Spectral, MetastableMethod::PccaLike] {
            assert_eq!(
                extract_regimes(&m, 3, method, 11),
                extract_regimes(&m, 3, method, 11)
            );
        }
    }

    #[test]
    fn test_from_groups_compacts() {
        let a = RegimeAssignment::from_groups(&[5, 5, 2, 9, 2]);
        assert_eq!(a.regimes(), &[0, 0, 1, 2, 1]);
        assert_eq!(a.n_regimes(), 3);
    }
}
