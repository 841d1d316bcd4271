//! Viterbi Sequence Smoothing
//!
//! Treats an observed symbol sequence as a noisy emission of a hidden symbol
//! sequence and returns the most likely hidden path:
//!
//! - hidden states = observed symbols `0..K`
//! - transitions = observed consecutive-pair counts, Laplace smoothed
//! - emission keeps the symbol with probability `1 - noise`, spreading `noise`
//!   evenly over the other `K - 1` symbols
//!
//! Shared by microstate smoothing and final-label smoothing.

/// Most likely hidden symbol path for `observed`
///
/// `noise_level` is clamped to `[0, 1)`. Ties resolve toward the lower symbol.
pub fn smooth_sequence(observed: &[usize], noise_level: f64) -> Vec<usize> {
    let n = observed.len();
    let k = observed.iter().max().map_or(0, |m| m + 1);
    if n < 3 || k < 2 {
        return observed.to_vec();
    }
    let noise = noise_level.clamp(0.0, 1.0 - 1e-9);

    let mut counts = vec![vec![1.0; k]; k];
    for w in observed.windows(2) {
        counts[w[0]][w[1]] += 1.0;
    }
    let log_trans: Vec<Vec<f64>> = counts
        .iter()
        .map(|row| {
            let total: f64 = row.iter().sum();
            row.iter().map(|c| (c / total).ln()).collect()
        })
        .collect();

    let mut initial = vec![1.0; k];
    for s in observed {
        initial[*s] += 1.0;
    }
    let init_total: f64 = initial.iter().sum();

    let log_keep = (1.0 - noise).ln();
    let log_flip = (noise / (k - 1) as f64).ln();
    let emission = |hidden: usize, seen: usize| if hidden == seen { log_keep } else { log_flip };

    let mut score: Vec<f64> = (0..k)
        .map(|h| (initial[h] / init_total).ln() + emission(h, observed[0]))
        .collect();
    let mut back: Vec<Vec<usize>> = Vec::with_capacity(n);
    back.push(vec![0; k]);

    for &seen in &observed[1..] {
        let mut next = vec![f64::NEG_INFINITY; k];
        let mut pointers = vec![0usize; k];
        for h in 0..k {
            let mut best = (0usize, f64::NEG_INFINITY);
            for prev in 0..k {
                let s = score[prev] + log_trans[prev][h];
                if s > best.1 {
                    best = (prev, s);
                }
            }
            next[h] = best.1 + emission(h, seen);
            pointers[h] = best.0;
        }
        score = next;
        back.push(pointers);
    }

    let mut state = 0;
    for h in 1..k {
        if score[h] > score[state] {
            state = h;
        }
    }

    let mut path = vec![0usize; n];
    for t in (0..n).rev() {
        path[t] = state;
        state = back[t][state];
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_single_step_flicker() {
        let mut seq = vec![0; 20];
        seq.push(1);
        seq.extend(vec![0; 20]);
        seq.extend(vec![1; 20]);

        let smoothed = smooth_sequence(&seq, 0.05);
        assert_eq!(smoothed.len(), seq.len());
        assert_eq!(smoothed[20], 0, "flicker should be removed");
        assert!(smoothed[..41].iter().all(|s| *s == 0));
        assert!(smoothed[41..].iter().all(|s| *s == 1), "real switch kept");
    }

    #[test]
    fn test_zero_noise_is_identity() {
        let seq = vec![0, 1, 0, 2, 2, 1, 0, 0, 1];
        assert_eq!(smooth_sequence(&seq, 0.0), seq);
    }

    #[test]
    fn test_short_or_constant_sequences_unchanged() {
        assert_eq!(smooth_sequence(&[], 0.1), Vec::<usize>::new());
        assert_eq!(smooth_sequence(&[1, 0], 0.1), vec![1, 0]);
        assert_eq!(smooth_sequence(&[0, 0, 0, 0], 0.3), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_output_symbols_within_range() {
        let seq: Vec<usize> = (0..100).map(|i| (i * 7 % 5) % 3).collect();
        let smoothed = smooth_sequence(&seq, 0.2);
        assert!(smoothed.iter().all(|s| *s < 3));
    }
}
