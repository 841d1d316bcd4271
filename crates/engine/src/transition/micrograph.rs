//! Spatial k-NN graph over microstate centroids

use std::collections::BTreeSet;

use phasegraph_numerics::distance::k_nearest;
use phasegraph_numerics::projection::pca_2d;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrographNode {
    pub id: usize,
    pub centroid: Vec<f64>,
    /// First two principal components of the centroid set
    pub projection: [f64; 2],
    pub visits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrographEdge {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
}

/// Undirected graph linking each centroid to its `k` nearest centroids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Micrograph {
    pub nodes: Vec<MicrographNode>,
    /// Deduplicated with `source < target`
    pub edges: Vec<MicrographEdge>,
}

impl Micrograph {
    /// Build the symmetric k-NN graph; `k == 0` yields no edges
    pub fn build(centroids: &[Vec<f64>], occupancy: &[usize], k: usize) -> Self {
        let projection = pca_2d(centroids);
        let nodes = centroids
            .iter()
            .enumerate()
            .map(|(id, c)| MicrographNode {
                id,
                centroid: c.clone(),
                projection: projection[id],
                visits: occupancy.get(id).copied().unwrap_or(0),
            })
            .collect();

        let mut seen = BTreeSet::new();
        let mut edges = Vec::new();
        if k > 0 {
            for i in 0..centroids.len() {
                for (j, distance) in k_nearest(centroids, i, k) {
                    let key = (i.min(j), i.max(j));
                    if seen.insert(key) {
                        edges.push(MicrographEdge {
                            source: key.0,
                            target: key.1,
                            distance,
                        });
                    }
                }
            }
        }
        edges.sort_by(|a, b| (a.source, a.target).cmp(&(b.source, b.target)));

        Self { nodes, edges }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.n_nodes()];
        for e in &self.edges {
            degrees[e.source] += 1;
            degrees[e.target] += 1;
        }
        degrees
    }

    /// Size of the largest connected component
    pub fn largest_component(&self) -> usize {
        let n = self.n_nodes();
        let mut adjacency = vec![Vec::new(); n];
        for e in &self.edges {
            adjacency[e.source].push(e.target);
            adjacency[e.target].push(e.source);
        }

        let mut visited = vec![false; n];
        let mut largest = 0;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut stack = vec![start];
            let mut size = 0;
            while let Some(v) = stack.pop() {
                size += 1;
                for &u in &adjacency[v] {
                    if !visited[u] {
                        visited[u] = true;
                        stack.push(u);
                    }
                }
            }
            largest = largest.max(size);
        }
        largest
    }

    /// Edge count over the complete-graph edge count
    pub fn density(&self) -> f64 {
        let n = self.n_nodes();
        if n < 2 {
            return 0.0;
        }
        self.n_edges() as f64 / (n * (n - 1) / 2) as f64
    }

    /// Graph with the given nodes and no edges
    pub fn disconnected(centroids: &[Vec<f64>], occupancy: &[usize]) -> Self {
        Self::build(centroids, occupancy, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![10.0, 10.0],
        ]
    }

    #[test]
    fn test_knn_edges_symmetric_and_deduplicated() {
        let g = Micrograph::build(&square(), &[1, 2, 3, 4, 5], 1);
        for e in &g.edges {
            assert!(e.source < e.target);
        }
        let mut keys: Vec<_> = g.edges.iter().map(|e| (e.source, e.target)).collect();
        keys.dedup();
        assert_eq!(keys.len(), g.n_edges());
        assert_eq!(g.nodes[4].visits, 5);
        // Outlier links to its nearest neighbor
        assert!(g.degrees()[4] >= 1);
    }

    #[test]
    fn test_k_zero_disables_edges() {
        let g = Micrograph::build(&square(), &[1; 5], 0);
        assert_eq!(g.n_edges(), 0);
        assert_eq!(g.largest_component(), 1);
        assert_eq!(g.density(), 0.0);
    }

    #[test]
    fn test_connected_with_enough_neighbors() {
        let g = Micrograph::build(&square(), &[1; 5], 2);
        assert_eq!(g.largest_component(), 5);
        assert!(g.density() > 0.0 && g.density() <= 1.0);
    }
}
