//! DBSCAN density clustering

use phasegraph_numerics::distance::euclidean;

/// Cluster id per point, `None` for noise
///
/// A point is core when at least `min_samples` points (itself included) lie
/// within `eps`. Clusters are numbered in order of their first core point.
pub fn dbscan(points: &[Vec<f64>], eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let n = points.len();
    let min_samples = min_samples.max(1);

    let neighborhoods: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| euclidean(&points[i], &points[j]) <= eps)
                .collect()
        })
        .collect();
    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|nb| nb.len() >= min_samples)
        .collect();

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut next_cluster = 0;

    for start in 0..n {
        if visited[start] || !is_core[start] {
            continue;
        }
        let cluster = next_cluster;
        next_cluster += 1;

        let mut frontier = vec![start];
        visited[start] = true;
        labels[start] = Some(cluster);
        while let Some(p) = frontier.pop() {
            if !is_core[p] {
                continue;
            }
            for &q in &neighborhoods[p] {
                if labels[q].is_none() {
                    labels[q] = Some(cluster);
                }
                if !visited[q] {
                    visited[q] = true;
                    frontier.push(q);
                }
            }
        }
    }

    labels
}
