//! Seeded k-means (Lloyd) with k-means++ initialization

use phasegraph_numerics::distance::{centroid, squared_euclidean};
use rand::Rng;
use rand::rngs::StdRng;

pub const DEFAULT_N_INIT: usize = 8;
pub const DEFAULT_MAX_ITER: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

/// Best of `n_init` seeded k-means runs
///
/// `k` is clamped to `[1, points.len()]`. Empty input yields an empty fit.
pub fn kmeans(
    points: &[Vec<f64>],
    k: usize,
    n_init: usize,
    max_iter: usize,
    rng: &mut StdRng,
) -> KMeansFit {
    if points.is_empty() {
        return KMeansFit {
            labels: Vec::new(),
            centroids: Vec::new(),
            inertia: 0.0,
        };
    }
    let k = k.clamp(1, points.len());

    let mut best: Option<KMeansFit> = None;
    for _ in 0..n_init.max(1) {
        let seeds = plus_plus_seeds(points, k, rng);
        let fit = lloyd(points, seeds, max_iter.max(1));
        if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }
    best.unwrap_or_else(|| lloyd(points, vec![points[0].clone()], 1))
}

/// k-means++ seeding: D²-weighted sampling
fn plus_plus_seeds(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut seeds = Vec::with_capacity(k);
    seeds.push(points[rng.gen_range(0..n)].clone());

    let mut d2: Vec<f64> = points
        .iter()
        .map(|p| squared_euclidean(p, &seeds[0]))
        .collect();

    while seeds.len() < k {
        let total: f64 = d2.iter().sum();
        let next = if total <= f64::EPSILON {
            rng.gen_range(0..n)
        } else {
            let mut target = rng.r#gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, w) in d2.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        };
        let seed = points[next].clone();
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(squared_euclidean(p, &seed));
        }
        seeds.push(seed);
    }
    seeds
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, center) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, center);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize) -> KMeansFit {
    let dim = points[0].len();
    let k = centroids.len();
    let mut labels = vec![usize::MAX; points.len()];

    for _ in 0..max_iter {
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let (c, _) = nearest_centroid(p, &centroids);
            if labels[i] != c {
                labels[i] = c;
                changed = true;
            }
        }

        for (c, center) in centroids.iter_mut().enumerate() {
            let members = points
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == c)
                .map(|(p, _)| p);
            let updated = centroid(members, dim);
            if !updated.is_empty() {
                *center = updated;
            }
        }

        // Re-seed empty clusters from the point farthest from its centroid
        for c in 0..k {
            if labels.iter().any(|l| *l == c) {
                continue;
            }
            let farthest = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i, squared_euclidean(p, &centroids[labels[i]])))
                .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)));
            if let Some((i, d)) = farthest {
                if d > 0.0 {
                    centroids[c] = points[i].clone();
                    labels[i] = c;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, l)| squared_euclidean(p, &centroids[*l]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn blobs() -> Vec<Vec<f64>> {
        let mut pts = Vec::new();
        for i in 0..20 {
            let jitter = (i as f64 * 0.37).sin() * 0.1;
            pts.push(vec![0.0 + jitter, 0.0 - jitter]);
            pts.push(vec![10.0 - jitter, 10.0 + jitter]);
            pts.push(vec![-10.0 + jitter, 10.0 + jitter]);
        }
        pts
    }

    #[test]
    fn test_separates_blobs() {
        let pts = blobs();
        let mut rng = StdRng::seed_from_u64(7);
        let fit = kmeans(&pts, 3, DEFAULT_N_INIT, DEFAULT_MAX_ITER, &mut rng);
        assert_eq!(fit.centroids.len(), 3);
        // Every triple (one point per blob) lands in three distinct clusters
        for chunk in fit.labels.chunks(3) {
            assert_ne!(chunk[0], chunk[1]);
            assert_ne!(chunk[1], chunk[2]);
            assert_ne!(chunk[0], chunk[2]);
        }
        assert!(fit.inertia < 5.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let pts = blobs();
        let a = kmeans(&pts, 4, 3, 100, &mut StdRng::seed_from_u64(11));
        let b = kmeans(&pts, 4, 3, 100, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_clamped_to_point_count() {
        let pts = vec![vec![0.0], vec![1.0]];
        let fit = kmeans(&pts, 5, 2, 10, &mut StdRng::seed_from_u64(1));
        assert_eq!(fit.centroids.len(), 2);
        assert_ne!(fit.labels[0], fit.labels[1]);
    }

    #[test]
    fn test_empty_input() {
        let fit = kmeans(&[], 3, 2, 10, &mut StdRng::seed_from_u64(1));
        assert!(fit.labels.is_empty());
    }
}
