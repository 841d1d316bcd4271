//! Takens Delay Embedding
//!
//! Row `i` holds `[x(t), x(t-τ), …, x(t-(m-1)τ)]` with `t = i + (m-1)τ`, so
//! the embedding has `n - (m-1)τ` rows, all drawn from one contiguous series.

use phasegraph_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Delay-coordinate embedding matrix (row-major)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    dimension: usize,
    lag: usize,
    points: Vec<Vec<f64>>,
}

impl Embedding {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.points.get(i).map(|r| r.as_slice())
    }

    /// Series index of row 0, i.e. `(m-1)τ`
    pub fn offset(&self) -> usize {
        (self.dimension - 1) * self.lag
    }

    /// Series index that row `i` ends at
    pub fn series_index(&self, row: usize) -> usize {
        row + self.offset()
    }
}

/// Minimum series length for an `(m, τ)` embedding
pub fn required_length(dimension: usize, lag: usize) -> usize {
    (dimension.saturating_sub(1)) * lag + 1
}

/// Build the delay embedding of `values`
///
/// # Errors
///
/// - `InvalidParameter` if `dimension < 2` or `lag < 1`
/// - `SeriesTooShort` if `values.len() < (m-1)τ + 1`
pub fn embed(values: &[f64], dimension: usize, lag: usize) -> Result<Embedding> {
    if dimension < 2 {
        return Err(Error::InvalidParameter(format!(
            "embedding dimension must be >= 2, got {dimension}"
        )));
    }
    if lag < 1 {
        return Err(Error::InvalidParameter(format!(
            "embedding lag must be >= 1, got {lag}"
        )));
    }

    let required = required_length(dimension, lag);
    if values.len() < required {
        return Err(Error::SeriesTooShort {
            required,
            actual: values.len(),
        });
    }

    let offset = (dimension - 1) * lag;
    let points = (offset..values.len())
        .map(|t| (0..dimension).map(|k| values[t - k * lag]).collect())
        .collect();

    Ok(Embedding {
        dimension,
        lag,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rows() {
        let emb = embed(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, 1).unwrap();
        assert_eq!(
            emb.points(),
            &[
                vec![3.0, 2.0, 1.0],
                vec![4.0, 3.0, 2.0],
                vec![5.0, 4.0, 3.0]
            ]
        );
        assert_eq!(emb.offset(), 2);
        assert_eq!(emb.series_index(0), 2);
    }

    #[test]
    fn test_row_count_and_lagged_values() {
        let values: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        for (m, tau) in [(2, 1), (3, 4), (5, 2), (4, 7)] {
            let emb = embed(&values, m, tau).unwrap();
            assert_eq!(emb.len(), values.len() - (m - 1) * tau);
            for (i, row) in emb.points().iter().enumerate() {
                let t = i + (m - 1) * tau;
                for (k, v) in row.iter().enumerate() {
                    assert_eq!(*v, values[t - k * tau]);
                }
            }
        }
    }

    #[test]
    fn test_exact_minimum_length() {
        let emb = embed(&[1.0, 2.0, 3.0], 2, 2).unwrap();
        assert_eq!(emb.len(), 1);
        assert_eq!(emb.row(0), Some(&[3.0, 1.0][..]));
    }

    #[test]
    fn test_too_short() {
        let err = embed(&[1.0, 2.0], 3, 1).unwrap_err();
        assert_eq!(
            err,
            Error::SeriesTooShort {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            embed(&[1.0; 10], 1, 1),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            embed(&[1.0; 10], 2, 0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
