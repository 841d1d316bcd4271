//! Low-dimensional projections for display
//!
//! Centroids live in the embedding space (dimension m); the micrograph carries
//! a 2-D PCA projection so external plotting stages need no linear algebra.

use nalgebra::DMatrix;

/// Project points onto their first two principal components
///
/// Points of dimension 1 get a zero second coordinate; fewer than two points
/// project to the origin.
pub fn pca_2d(points: &[Vec<f64>]) -> Vec<[f64; 2]> {
    let n = points.len();
    if n < 2 {
        return vec![[0.0, 0.0]; n];
    }
    let dim = points[0].len();
    if dim == 0 {
        return vec![[0.0, 0.0]; n];
    }

    let mut means = vec![0.0; dim];
    for p in points {
        for (m, x) in means.iter_mut().zip(p) {
            *m += x / n as f64;
        }
    }

    let centered = DMatrix::from_fn(n, dim, |i, j| points[i][j] - means[j]);
    let svd = centered.clone().svd(false, true);
    let Some(v_t) = svd.v_t else {
        return vec![[0.0, 0.0]; n];
    };

    // svd does not guarantee ordering; sort components by singular value
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    let component = |rank: usize| -> Option<Vec<f64>> {
        order
            .get(rank)
            .map(|&row| (0..dim).map(|j| v_t[(row, j)]).collect())
    };
    let pc1 = component(0);
    let pc2 = component(1);

    (0..n)
        .map(|i| {
            let row: Vec<f64> = (0..dim).map(|j| centered[(i, j)]).collect();
            let project = |pc: &Option<Vec<f64>>| {
                pc.as_ref()
                    .map(|v| row.iter().zip(v).map(|(a, b)| a * b).sum())
                    .unwrap_or(0.0)
            };
            [project(&pc1), project(&pc2)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_collinear_points_project_on_first_axis() {
        let pts: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 2.0 * i as f64, 0.0]).collect();
        let proj = pca_2d(&pts);
        assert_eq!(proj.len(), 5);
        for p in &proj {
            assert_relative_eq!(p[1], 0.0, epsilon = 1e-9);
        }
        let spread = (proj[4][0] - proj[0][0]).abs();
        assert_relative_eq!(spread, (16.0f64 + 64.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(pca_2d(&[]).is_empty());
        assert_eq!(pca_2d(&[vec![1.0, 2.0]]), vec![[0.0, 0.0]]);
    }

    #[test]
    fn test_one_dimensional_points() {
        let pts = vec![vec![1.0], vec![3.0]];
        let proj = pca_2d(&pts);
        assert_relative_eq!((proj[0][0] - proj[1][0]).abs(), 2.0, epsilon = 1e-9);
        assert_eq!(proj[0][1], 0.0);
    }
}
