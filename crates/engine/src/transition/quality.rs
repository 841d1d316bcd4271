//! Graph quality scoring

use phasegraph_numerics::stats::normalized_entropy;
use serde::{Deserialize, Serialize};

use super::matrix::TransitionMatrix;
use super::micrograph::Micrograph;

const W_CONNECTIVITY: f64 = 0.30;
const W_DEGREE: f64 = 0.20;
const W_ENTROPY: f64 = 0.20;
const W_COVERAGE: f64 = 0.20;
const W_DENSITY: f64 = 0.10;

const STATIONARY_TOL: f64 = 1e-10;
const STATIONARY_MAX_ITER: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphQualityConfig {
    /// Nodes with fewer edges count as low-degree
    pub min_degree: usize,
    /// Microstates visited fewer times count as uncovered
    pub min_visits: usize,
}

impl Default for GraphQualityConfig {
    fn default() -> Self {
        Self {
            min_degree: 2,
            min_visits: 3,
        }
    }
}

/// Structural health of the microstate graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphQuality {
    /// Largest connected component over node count
    pub largest_component_ratio: f64,
    pub low_degree_fraction: f64,
    /// Normalized Shannon entropy of visit counts
    pub occupancy_entropy: f64,
    pub coverage: f64,
    pub density: f64,
    /// Normalized entropy rate of the Markov chain (diagnostic only)
    pub entropy_rate: f64,
    /// Weighted aggregate in `[0, 1]`
    pub score: f64,
}

impl GraphQuality {
    pub fn score(
        graph: &Micrograph,
        occupancy: &[usize],
        matrix: &TransitionMatrix,
        config: &GraphQualityConfig,
    ) -> Self {
        let n = graph.n_nodes();
        let single = n < 2;

        let largest_component_ratio = if single {
            1.0
        } else {
            graph.largest_component() as f64 / n as f64
        };
        let low_degree_fraction = if single {
            0.0
        } else {
            graph
                .degrees()
                .iter()
                .filter(|d| **d < config.min_degree)
                .count() as f64
                / n as f64
        };
        let density = if single { 1.0 } else { graph.density() };

        let counts: Vec<f64> = occupancy.iter().map(|c| *c as f64).collect();
        let occupancy_entropy = normalized_entropy(&counts);
        let coverage = if occupancy.is_empty() {
            0.0
        } else {
            occupancy.iter().filter(|c| **c >= config.min_visits).count() as f64
                / occupancy.len() as f64
        };

        let stationary = matrix.stationary_distribution(STATIONARY_TOL, STATIONARY_MAX_ITER);
        let entropy_rate = matrix.entropy_rate(&stationary);

        let score = (W_CONNECTIVITY * largest_component_ratio
            + W_DEGREE * (1.0 - low_degree_fraction)
            + W_ENTROPY * occupancy_entropy
            + W_COVERAGE * coverage
            + W_DENSITY * density)
            .clamp(0.0, 1.0);

        Self {
            largest_component_ratio,
            low_degree_fraction,
            occupancy_entropy,
            coverage,
            density,
            entropy_rate,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroids(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                let a = i as f64 * 0.7;
                vec![a.cos() * (1.0 + i as f64), a.sin()]
            })
            .collect()
    }

    fn cyclic_labels(n: usize, len: usize) -> Vec<usize> {
        (0..len).map(|i| i % n).collect()
    }

    #[test]
    fn test_score_in_unit_interval() {
        for n in 1..8 {
            let c = centroids(n);
            let labels = cyclic_labels(n, 40);
            let occupancy: Vec<usize> = (0..n)
                .map(|s| labels.iter().filter(|l| **l == s).count())
                .collect();
            let matrix = TransitionMatrix::from_labels(&labels, n, 0.1).unwrap();
            for k in 0..4 {
                let g = Micrograph::build(&c, &occupancy, k);
                let q = GraphQuality::score(&g, &occupancy, &matrix, &GraphQualityConfig::default());
                assert!((0.0..=1.0).contains(&q.score), "n={n} k={k} score={}", q.score);
                assert!((0.0..=1.0).contains(&q.entropy_rate));
            }
        }
    }

    #[test]
    fn test_disconnected_scores_below_connected() {
        let n = 6;
        let c = centroids(n);
        let occupancy = vec![10; n];
        let matrix = TransitionMatrix::from_labels(&cyclic_labels(n, 60), n, 0.1).unwrap();
        let config = GraphQualityConfig::default();

        let connected = GraphQuality::score(&Micrograph::build(&c, &occupancy, 3), &occupancy, &matrix, &config);
        let isolated = GraphQuality::score(&Micrograph::disconnected(&c, &occupancy), &occupancy, &matrix, &config);

        assert_eq!(isolated.density, 0.0);
        assert!(isolated.score < connected.score);
        assert_eq!(connected.largest_component_ratio, 1.0);
    }

    #[test]
    fn test_single_node_treated_as_connected() {
        let c = centroids(1);
        let matrix = TransitionMatrix::from_labels(&[0, 0, 0], 1, 0.1).unwrap();
        let g = Micrograph::build(&c, &[3], 4);
        let q = GraphQuality::score(&g, &[3], &matrix, &GraphQualityConfig::default());
        assert_eq!(q.largest_component_ratio, 1.0);
        assert_eq!(q.coverage, 1.0);
    }
}
