//! Markov transition matrix over microstates

use nalgebra::DMatrix;
use phasegraph_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Row-stochastic transition matrix with the raw counts it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    counts: Vec<Vec<f64>>,
    probabilities: Vec<Vec<f64>>,
    alpha: f64,
}

impl TransitionMatrix {
    /// Count consecutive label pairs and row-normalize with additive smoothing
    ///
    /// A row with no mass at all (unvisited state, `alpha == 0`) becomes
    /// uniform.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `n_states == 0`, `alpha` is negative or not
    /// finite, or a label is out of range.
    pub fn from_labels(labels: &[usize], n_states: usize, alpha: f64) -> Result<Self> {
        if n_states == 0 {
            return Err(Error::InvalidParameter(
                "transition matrix needs at least one state".to_string(),
            ));
        }
        if !(alpha >= 0.0 && alpha.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "smoothing alpha must be finite and >= 0, got {alpha}"
            )));
        }
        if let Some(bad) = labels.iter().find(|l| **l >= n_states) {
            return Err(Error::InvalidParameter(format!(
                "label {bad} out of range for {n_states} states"
            )));
        }

        let mut counts = vec![vec![0.0; n_states]; n_states];
        for w in labels.windows(2) {
            counts[w[0]][w[1]] += 1.0;
        }

        let probabilities = counts
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum::<f64>() + alpha * n_states as f64;
                if total <= 0.0 {
                    vec![1.0 / n_states as f64; n_states]
                } else {
                    row.iter().map(|c| (c + alpha) / total).collect()
                }
            })
            .collect();

        Ok(Self {
            counts,
            probabilities,
            alpha,
        })
    }

    pub fn n_states(&self) -> usize {
        self.probabilities.len()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.probabilities[i]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.probabilities[i][j]
    }

    pub fn to_matrix(&self) -> DMatrix<f64> {
        let n = self.n_states();
        DMatrix::from_fn(n, n, |i, j| self.probabilities[i][j])
    }

    /// Stationary distribution by power iteration from the uniform vector
    ///
    /// Stops when the L1 change drops below `tol` or after `max_iter` steps.
    pub fn stationary_distribution(&self, tol: f64, max_iter: usize) -> Vec<f64> {
        let n = self.n_states();
        let mut pi = vec![1.0 / n as f64; n];
        for _ in 0..max_iter {
            let mut next = vec![0.0; n];
            for (i, p_i) in pi.iter().enumerate() {
                for (j, p_ij) in self.probabilities[i].iter().enumerate() {
                    next[j] += p_i * p_ij;
                }
            }
            let total: f64 = next.iter().sum();
            if total > 0.0 {
                next.iter_mut().for_each(|x| *x /= total);
            }
            let delta: f64 = next.iter().zip(&pi).map(|(a, b)| (a - b).abs()).sum();
            pi = next;
            if delta < tol {
                break;
            }
        }
        pi
    }

    /// Entropy rate `-Σ π_i P_ij ln P_ij`, normalized by `ln n` to `[0, 1]`
    pub fn entropy_rate(&self, stationary: &[f64]) -> f64 {
        let n = self.n_states();
        if n < 2 {
            return 0.0;
        }
        let h: f64 = stationary
            .iter()
            .zip(&self.probabilities)
            .map(|(pi, row)| {
                pi * row
                    .iter()
                    .filter(|p| **p > 0.0)
                    .map(|p| -p * p.ln())
                    .sum::<f64>()
            })
            .sum();
        (h / (n as f64).ln()).clamp(0.0, 1.0)
    }

    /// Probability of leaving each state in one step
    pub fn escape_rates(&self) -> Vec<f64> {
        (0..self.n_states())
            .map(|i| 1.0 - self.probabilities[i][i])
            .collect()
    }
}
