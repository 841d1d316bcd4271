//! Euclidean distances and brute-force neighbor search
//!
//! Point sets here are small (hundreds to low thousands of rows), so exact
//! O(n²) search is used throughout. Ties resolve to the lowest index, which
//! keeps every caller deterministic.

pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Index of the point nearest to `query` among those accepted by `allow`
pub fn nearest_neighbor<F>(points: &[Vec<f64>], query: &[f64], allow: F) -> Option<(usize, f64)>
where
    F: Fn(usize) -> bool,
{
    let mut best: Option<(usize, f64)> = None;
    for (j, p) in points.iter().enumerate() {
        if !allow(j) {
            continue;
        }
        let d = squared_euclidean(p, query);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((j, d)),
        }
    }
    best.map(|(j, d)| (j, d.sqrt()))
}

/// The `k` nearest points to `points[i]` (excluding `i`), nearest first
pub fn k_nearest(points: &[Vec<f64>], i: usize, k: usize) -> Vec<(usize, f64)> {
    let mut candidates: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(j, p)| (j, euclidean(p, &points[i])))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    candidates.truncate(k);
    candidates
}

/// Distance from `points[i]` to its `k`-th nearest neighbor (`k >= 1`)
pub fn kth_neighbor_distance(points: &[Vec<f64>], i: usize, k: usize) -> f64 {
    k_nearest(points, i, k.max(1))
        .last()
        .map(|(_, d)| *d)
        .unwrap_or(0.0)
}

/// Component-wise mean of a set of points (empty when no points)
pub fn centroid<'a, I>(points: I, dim: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Vec<f64>>,
{
    let mut sum = vec![0.0; dim];
    let mut count = 0usize;
    for p in points {
        for (s, x) in sum.iter_mut().zip(p) {
            *s += x;
        }
        count += 1;
    }
    if count == 0 {
        return Vec::new();
    }
    sum.iter().map(|s| s / count as f64).collect()
}
