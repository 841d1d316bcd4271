//! HDBSCAN Hierarchical Density Clustering
//!
//! ```text
//! core distances ──► mutual reachability ──► Prim MST ──► single linkage
//!                                                              │
//!        labels ◄── excess-of-mass selection ◄── condensed tree ┘
//! ```
//!
//! Exact O(n²) construction; embedding sizes here are at most a few thousand
//! rows.

use std::cmp::{Ordering, Reverse};

use phasegraph_numerics::distance::{euclidean, kth_neighbor_distance};
use priority_queue::PriorityQueue;

/// Total-ordered f64 key for the MST frontier
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weight(f64);

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct MstEdge {
    a: usize,
    b: usize,
    weight: f64,
}

/// Merge step of the single-linkage hierarchy
#[derive(Debug, Clone, Copy)]
struct Merge {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

#[derive(Debug, Clone)]
struct CondensedCluster {
    parent: Option<usize>,
    birth: f64,
    children: Vec<usize>,
    /// Points that fell out of this cluster (not any child)
    points: Vec<usize>,
    stability: f64,
}

/// Cluster id per point, `None` for noise
pub fn hdbscan(
    points: &[Vec<f64>],
    min_cluster_size: usize,
    min_samples: usize,
) -> Vec<Option<usize>> {
    let n = points.len();
    let min_cluster_size = min_cluster_size.max(2);
    if n < min_cluster_size {
        return vec![None; n];
    }

    let core = core_distances(points, min_samples.max(1));
    let mst = prim_mst(points, &core);
    let merges = single_linkage(n, mst);
    let clusters = condense(n, &merges, min_cluster_size);
    let selected = select_eom(&clusters);
    label_points(n, &clusters, &selected)
}

fn core_distances(points: &[Vec<f64>], min_samples: usize) -> Vec<f64> {
    // min_samples counts the point itself
    if min_samples <= 1 {
        return vec![0.0; points.len()];
    }
    (0..points.len())
        .map(|i| kth_neighbor_distance(points, i, min_samples - 1))
        .collect()
}

fn mutual_reachability(points: &[Vec<f64>], core: &[f64], i: usize, j: usize) -> f64 {
    euclidean(&points[i], &points[j]).max(core[i]).max(core[j])
}

/// Prim's algorithm over the complete mutual-reachability graph
fn prim_mst(points: &[Vec<f64>], core: &[f64]) -> Vec<MstEdge> {
    let n = points.len();
    let mut parent = vec![0usize; n];
    let mut frontier: PriorityQueue<usize, Reverse<(Weight, usize)>> = PriorityQueue::new();
    for j in 1..n {
        frontier.push(j, Reverse((Weight(mutual_reachability(points, core, 0, j)), j)));
    }

    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    while let Some((v, Reverse((Weight(weight), _)))) = frontier.pop() {
        edges.push(MstEdge {
            a: parent[v],
            b: v,
            weight,
        });
        let remaining: Vec<usize> = frontier.iter().map(|(u, _)| *u).collect();
        for u in remaining {
            let d = mutual_reachability(points, core, v, u);
            let improves = frontier
                .get_priority(&u)
                .is_some_and(|Reverse((Weight(current), _))| d < *current);
            if improves {
                frontier.change_priority(&u, Reverse((Weight(d), u)));
                parent[u] = v;
            }
        }
    }
    edges
}

fn find(parents: &mut [usize], mut x: usize) -> usize {
    while parents[x] != x {
        parents[x] = parents[parents[x]];
        x = parents[x];
    }
    x
}

/// Scipy-style linkage: merge `k` creates node `n + k`
fn single_linkage(n: usize, mut mst: Vec<MstEdge>) -> Vec<Merge> {
    mst.sort_by(|x, y| {
        x.weight
            .total_cmp(&y.weight)
            .then(x.a.min(x.b).cmp(&y.a.min(y.b)))
    });

    let mut parents: Vec<usize> = (0..2 * n).collect();
    let mut sizes = vec![1usize; 2 * n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    for edge in mst {
        let ra = find(&mut parents, edge.a);
        let rb = find(&mut parents, edge.b);
        if ra == rb {
            continue;
        }
        let node = n + merges.len();
        let size = sizes[ra] + sizes[rb];
        parents[ra] = node;
        parents[rb] = node;
        sizes[node] = size;
        merges.push(Merge {
            left: ra,
            right: rb,
            distance: edge.weight,
            size,
        });
    }
    merges
}

fn node_size(n: usize, merges: &[Merge], node: usize) -> usize {
    if node < n { 1 } else { merges[node - n].size }
}

fn leaves(n: usize, merges: &[Merge], node: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(x) = stack.pop() {
        if x < n {
            out.push(x);
        } else {
            let m = merges[x - n];
            stack.push(m.left);
            stack.push(m.right);
        }
    }
    out
}

fn condense(n: usize, merges: &[Merge], min_cluster_size: usize) -> Vec<CondensedCluster> {
    let mut clusters = vec![CondensedCluster {
        parent: None,
        birth: 0.0,
        children: Vec::new(),
        points: Vec::new(),
        stability: 0.0,
    }];
    let Some(root) = (n + merges.len()).checked_sub(1).filter(|r| *r >= n) else {
        clusters[0].points = (0..n).collect();
        return clusters;
    };

    let mut stack = vec![(root, 0usize)];
    while let Some((node, cluster)) = stack.pop() {
        let merge = merges[node - n];
        let lambda = 1.0 / merge.distance.max(1e-12);
        let birth = clusters[cluster].birth;
        let left_size = node_size(n, merges, merge.left);
        let right_size = node_size(n, merges, merge.right);

        let shed = |child: usize, clusters: &mut Vec<CondensedCluster>| {
            let fallen = leaves(n, merges, child);
            clusters[cluster].stability += fallen.len() as f64 * (lambda - birth);
            clusters[cluster].points.extend(fallen);
        };

        match (left_size >= min_cluster_size, right_size >= min_cluster_size) {
            (true, true) => {
                for (child, size) in [(merge.left, left_size), (merge.right, right_size)] {
                    let id = clusters.len();
                    clusters.push(CondensedCluster {
                        parent: Some(cluster),
                        birth: lambda,
                        children: Vec::new(),
                        points: Vec::new(),
                        stability: 0.0,
                    });
                    clusters[cluster].children.push(id);
                    clusters[cluster].stability += size as f64 * (lambda - birth);
                    stack.push((child, id));
                }
            }
            (true, false) => {
                shed(merge.right, &mut clusters);
                stack.push((merge.left, cluster));
            }
            (false, true) => {
                shed(merge.left, &mut clusters);
                stack.push((merge.right, cluster));
            }
            (false, false) => {
                shed(merge.left, &mut clusters);
                shed(merge.right, &mut clusters);
            }
        }
    }
    clusters
}

/// Excess-of-mass selection; the root is only eligible when it never splits
fn select_eom(clusters: &[CondensedCluster]) -> Vec<bool> {
    let mut selected = vec![false; clusters.len()];
    let mut subtree = vec![0.0; clusters.len()];

    // Children always have larger ids than their parent
    for c in (0..clusters.len()).rev() {
        let children_total: f64 = clusters[c].children.iter().map(|ch| subtree[*ch]).sum();
        if clusters[c].children.is_empty() {
            selected[c] = true;
            subtree[c] = clusters[c].stability;
        } else if c != 0 && clusters[c].stability > children_total {
            selected[c] = true;
            subtree[c] = clusters[c].stability;
            let mut stack = clusters[c].children.clone();
            while let Some(d) = stack.pop() {
                selected[d] = false;
                stack.extend(clusters[d].children.iter().copied());
            }
        } else {
            subtree[c] = children_total;
        }
    }
    selected
}

fn label_points(n: usize, clusters: &[CondensedCluster], selected: &[bool]) -> Vec<Option<usize>> {
    let mut ids: Vec<Option<usize>> = vec![None; clusters.len()];
    let mut next = 0;
    for (c, is_selected) in selected.iter().enumerate() {
        if *is_selected {
            ids[c] = Some(next);
            next += 1;
        }
    }

    let mut labels = vec![None; n];
    for (c, cluster) in clusters.iter().enumerate() {
        let mut owner = Some(c);
        while let Some(o) = owner {
            if selected[o] {
                break;
            }
            owner = clusters[o].parent;
        }
        let label = owner.and_then(|o| ids[o]);
        for &p in &cluster.points {
            labels[p] = label;
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(start: f64, count: usize, step: f64) -> Vec<Vec<f64>> {
        (0..count).map(|i| vec![start + i as f64 * step, 0.0]).collect()
    }

    #[test]
    fn test_finds_two_dense_groups() {
        let mut pts = line(0.0, 15, 0.1);
        pts.extend(line(20.0, 15, 0.1));
        let labels = hdbscan(&pts, 5, 3);

        let a = labels[0];
        let b = labels[15];
        assert!(a.is_some() && b.is_some());
        assert_ne!(a, b);
        assert!(labels[..15].iter().all(|l| *l == a));
        assert!(labels[15..].iter().all(|l| *l == b));
    }

    #[test]
    fn test_outlier_is_noise() {
        let mut pts = line(0.0, 12, 0.1);
        pts.extend(line(30.0, 12, 0.1));
        pts.push(vec![500.0, 500.0]);
        let labels = hdbscan(&pts, 5, 3);
        assert_eq!(labels[24], None);
        assert!(labels[0].is_some());
    }

    #[test]
    fn test_too_few_points() {
        let pts = line(0.0, 3, 1.0);
        assert!(hdbscan(&pts, 5, 2).iter().all(|l| l.is_none()));
    }

    #[test]
    fn test_mst_spans_all_points() {
        let pts = line(0.0, 10, 1.0);
        let core = core_distances(&pts, 2);
        let mst = prim_mst(&pts, &core);
        assert_eq!(mst.len(), 9);
        assert!(mst.iter().all(|e| (e.weight - 1.0).abs() < 1e-12));
    }
}
