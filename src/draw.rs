//! Weighted draws over non-negative weight vectors.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Divides every entry by the maximum entry.
///
/// Vectors whose maximum is not positive are left untouched.
pub fn max_normalize(weights: &mut [f64]) {
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 && max.is_finite() {
        weights.iter_mut().for_each(|w| *w /= max);
    }
}

/// Index of the largest entry, first one on ties.
///
/// `None` if the slice is empty or no entry is positive.
pub fn where_max(weights: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &w) in weights.iter().enumerate() {
        if w > best.map_or(0.0, |(_, b)| b) {
            best = Some((i, w));
        }
    }
    best.map(|(i, _)| i)
}

/// Draws an index with probability proportional to its weight.
///
/// Returns `None` for an invalid weight vector (empty, all zero, or holding
/// a negative or non-finite entry).
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    WeightedIndex::new(weights).ok().map(|dist| dist.sample(rng))
}

/// Draws until `accept` holds, at most `max_attempts` times.
pub fn sample_with_retry<R, F>(
    weights: &[f64],
    max_attempts: usize,
    rng: &mut R,
    accept: F,
) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(usize) -> bool,
{
    let dist = WeightedIndex::new(weights).ok()?;
    (0..max_attempts)
        .map(|_| dist.sample(rng))
        .find(|&i| accept(i))
}
