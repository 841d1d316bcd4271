//! Clustering backends behind one tagged interface

use phasegraph_core::{Error, Result};
use phasegraph_numerics::distance::centroid;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::dbscan::dbscan;
use super::hdbscan::hdbscan;
use super::kmeans::{DEFAULT_MAX_ITER, DEFAULT_N_INIT, kmeans};

/// Clustering backend used to discretize embedded points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clusterer {
    /// k-means with a fixed cluster count
    Partition { k: usize },
    /// DBSCAN; variable cluster count, marks noise
    DensityBased { eps: f64, min_samples: usize },
    /// HDBSCAN; automatic cluster count, marks noise
    HierarchicalDensity {
        min_cluster_size: usize,
        min_samples: usize,
    },
}

impl Default for Clusterer {
    fn default() -> Self {
        Clusterer::Partition { k: 20 }
    }
}

/// Clustering output before noise reassignment
#[derive(Debug, Clone, PartialEq)]
pub struct RawClustering {
    /// Cluster id per point, `None` for noise
    pub labels: Vec<Option<usize>>,
    /// One centroid per cluster id
    pub centroids: Vec<Vec<f64>>,
}

impl RawClustering {
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }
}

impl Clusterer {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Clusterer::Partition { k } if k == 0 => Err(Error::InvalidParameter(
                "partition clusterer needs k >= 1".to_string(),
            )),
            Clusterer::DensityBased { eps, .. } if !(eps > 0.0 && eps.is_finite()) => Err(
                Error::InvalidParameter(format!("density eps must be positive, got {eps}")),
            ),
            Clusterer::HierarchicalDensity {
                min_cluster_size, ..
            } if min_cluster_size < 2 => Err(Error::InvalidParameter(format!(
                "min_cluster_size must be >= 2, got {min_cluster_size}"
            ))),
            _ => Ok(()),
        }
    }

    /// Cluster `points`, keeping at most `max_states` clusters
    ///
    /// Density variants mark the points of clusters beyond the `max_states`
    /// largest as noise.
    pub fn fit_predict(
        &self,
        points: &[Vec<f64>],
        max_states: usize,
        rng: &mut StdRng,
    ) -> RawClustering {
        let max_states = max_states.max(1);
        match *self {
            Clusterer::Partition { k } => {
                let fit = kmeans(points, k.min(max_states), DEFAULT_N_INIT, DEFAULT_MAX_ITER, rng);
                RawClustering {
                    labels: fit.labels.into_iter().map(Some).collect(),
                    centroids: fit.centroids,
                }
            }
            Clusterer::DensityBased { eps, min_samples } => {
                keep_largest(points, dbscan(points, eps, min_samples), max_states)
            }
            Clusterer::HierarchicalDensity {
                min_cluster_size,
                min_samples,
            } => keep_largest(
                points,
                hdbscan(points, min_cluster_size, min_samples),
                max_states,
            ),
        }
    }
}

/// Keep the `max_states` largest clusters, renumbered by ascending original id
fn keep_largest(points: &[Vec<f64>], labels: Vec<Option<usize>>, max_states: usize) -> RawClustering {
    let n_clusters = labels.iter().flatten().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0usize; n_clusters];
    for l in labels.iter().flatten() {
        sizes[*l] += 1;
    }

    let mut by_size: Vec<usize> = (0..n_clusters).filter(|c| sizes[*c] > 0).collect();
    by_size.sort_by(|a, b| sizes[*b].cmp(&sizes[*a]).then(a.cmp(b)));
    by_size.truncate(max_states);
    by_size.sort_unstable();

    let mut remap = vec![None; n_clusters];
    for (new, old) in by_size.iter().enumerate() {
        remap[*old] = Some(new);
    }
    let labels: Vec<Option<usize>> = labels
        .into_iter()
        .map(|l| l.and_then(|c| remap[c]))
        .collect();

    let dim = points.first().map_or(0, |p| p.len());
    let centroids = (0..by_size.len())
        .map(|c| {
            centroid(
                points
                    .iter()
                    .zip(&labels)
                    .filter(|(_, l)| **l == Some(c))
                    .map(|(p, _)| p),
                dim,
            )
        })
        .collect();

    RawClustering { labels, centroids }
}
