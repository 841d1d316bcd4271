//! Noise reassignment and label compaction

use phasegraph_numerics::distance::{centroid, nearest_neighbor};
use serde::{Deserialize, Serialize};

use super::clusterer::RawClustering;

/// Final microstate labels: contiguous ids in `[0, n_states)`, one per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrostateAssignment {
    labels: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    /// Rows the clusterer flagged as noise before reassignment
    noise_reassigned: usize,
}

impl MicrostateAssignment {
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn n_states(&self) -> usize {
        self.centroids.len()
    }

    pub fn noise_reassigned(&self) -> usize {
        self.noise_reassigned
    }

    pub(crate) fn with_noise_count(mut self, noise_reassigned: usize) -> Self {
        self.noise_reassigned = noise_reassigned;
        self
    }

    /// Visit count per microstate
    pub fn occupancy(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_states()];
        for l in &self.labels {
            counts[*l] += 1;
        }
        counts
    }
}

/// Assign noise rows to their nearest centroid and compact labels
///
/// Empty clusters are dropped and surviving ids renumbered in ascending order
/// of their original id; centroids are recomputed from final membership. If
/// every row is noise, all rows form a single microstate.
pub fn reassign_noise(raw: RawClustering, points: &[Vec<f64>]) -> MicrostateAssignment {
    let dim = points.first().map_or(0, |p| p.len());
    let noise = raw.noise_count();

    let mut used: Vec<usize> = raw.labels.iter().flatten().copied().collect();
    used.sort_unstable();
    used.dedup();

    if used.is_empty() {
        let labels = vec![0; points.len()];
        let centroids = if points.is_empty() {
            Vec::new()
        } else {
            vec![centroid(points.iter(), dim)]
        };
        return MicrostateAssignment {
            labels,
            centroids,
            noise_reassigned: noise,
        };
    }

    let compact = |old: usize| used.binary_search(&old).ok();
    let anchors: Vec<Vec<f64>> = used
        .iter()
        .map(|&old| match raw.centroids.get(old) {
            Some(c) if c.len() == dim => c.clone(),
            _ => centroid(
                points
                    .iter()
                    .zip(&raw.labels)
                    .filter(|(_, l)| **l == Some(old))
                    .map(|(p, _)| p),
                dim,
            ),
        })
        .collect();

    let labels: Vec<usize> = raw
        .labels
        .iter()
        .zip(points)
        .map(|(label, p)| {
            label.and_then(compact).unwrap_or_else(|| {
                nearest_neighbor(&anchors, p, |_| true).map_or(0, |(j, _)| j)
            })
        })
        .collect();

    let centroids = (0..used.len())
        .map(|c| {
            let members = points
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == c)
                .map(|(p, _)| p);
            let updated = centroid(members, dim);
            if updated.is_empty() { anchors[c].clone() } else { updated }
        })
        .collect();

    MicrostateAssignment {
        labels,
        centroids,
        noise_reassigned: noise,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_goes_to_nearest_centroid() {
        let points = vec![vec![0.0], vec![0.2], vec![10.0], vec![9.0], vec![1.0]];
        let raw = RawClustering {
            labels: vec![Some(3), Some(3), Some(7), None, None],
            centroids: vec![],
        };
        let a = reassign_noise(raw, &points);
        assert_eq!(a.labels(), &[0, 0, 1, 1, 0]);
        assert_eq!(a.n_states(), 2);
        assert_eq!(a.noise_reassigned(), 2);
        assert_eq!(a.occupancy(), vec![3, 2]);
        assert!((a.centroids()[1][0] - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_labels_are_contiguous() {
        let points: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let raw = RawClustering {
            labels: vec![Some(5), Some(5), None, Some(2), Some(9), Some(9)],
            centroids: vec![],
        };
        let a = reassign_noise(raw, &points);
        let mut seen: Vec<usize> = a.labels().to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, (0..a.n_states()).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_noise_becomes_single_state() {
        let points = vec![vec![1.0, 1.0], vec![3.0, 3.0]];
        let raw = RawClustering {
            labels: vec![None, None],
            centroids: vec![],
        };
        let a = reassign_noise(raw, &points);
        assert_eq!(a.labels(), &[0, 0]);
        assert_eq!(a.centroids(), &[vec![2.0, 2.0]]);
    }
}
