//! Vector similarity primitives.
//!
//! [`cosine_similarity`] is the single similarity function used across the
//! crate. It never fails: vectors that cannot be compared (empty, different
//! dimensions, zero magnitude) score `0.0`, which makes an exemplar with a
//! corrupt or foreign embedding look irrelevant instead of blocking retrieval.

/// Cosine of the angle between `a` and `b`.
///
/// Returns a value in `[-1, 1]` for well-formed inputs, and `0.0` when either
/// vector is empty, the lengths differ, or either vector has zero magnitude.
/// Non-finite results (NaN or overflowing components) also score `0.0`.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let denominator = magnitude(a) * magnitude(b);
    if denominator == 0.0 {
        return 0.0;
    }

    let similarity = dot(a, b) / denominator;
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Dot product over the common prefix of `a` and `b`.
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
