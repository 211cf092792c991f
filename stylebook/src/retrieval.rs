//! Diverse exemplar retrieval using Maximal Marginal Relevance (MMR).
//!
//! Given a query embedding and a snapshot of the style library, the retriever
//! picks `k` exemplars that are relevant to the query but not redundant with
//! each other, so few-shot guidance spans several voices instead of `k`
//! near-copies of the single best match.
//!
//! # Algorithm
//!
//! 1. `relevance(c) = cos(query, c)` is computed once per call.
//! 2. The most relevant exemplar is picked first.
//! 3. Each following pick maximizes
//!    `lambda * relevance(c) - (1 - lambda) * max_{s in selected} cos(c, s)`.
//!
//! When `k` covers the whole library, every exemplar is returned ordered by
//! descending relevance.
//!
//! # Ties
//!
//! Selection is deterministic. The first pick goes to the earliest exemplar
//! among equally relevant ones. During the MMR phase an exact score tie goes
//! to the candidate least similar to what is already selected, then to the
//! earliest in library order.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use tracing::{debug, debug_span, trace, warn};

use crate::library::StyleExemplar;
use crate::vector::cosine_similarity;

/// Default relevance/diversity trade-off.
pub const DEFAULT_LAMBDA: f64 = 0.7;

/// Default number of exemplars to retrieve.
pub const DEFAULT_K: usize = 3;

/// Parameters for a single selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    /// Relevance/diversity trade-off. `1.0` ranks purely by relevance, `0.0`
    /// maximizes spread. Values outside `[0, 1]` are used as given.
    pub lambda: f64,
    /// Number of exemplars requested.
    pub k: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            k: DEFAULT_K,
        }
    }
}

impl SelectionParams {
    /// Create selection parameters.
    #[must_use]
    pub const fn new(lambda: f64, k: usize) -> Self {
        Self { lambda, k }
    }

    /// Set the relevance/diversity trade-off.
    #[must_use]
    pub const fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the number of exemplars to retrieve.
    #[must_use]
    pub const fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// MMR retriever over style library snapshots.
///
/// Holds no state besides its parameters; one retriever can serve concurrent
/// calls with different snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiverseRetriever {
    params: SelectionParams,
}

impl DiverseRetriever {
    /// Create a retriever with the given parameters.
    #[must_use]
    pub const fn new(params: SelectionParams) -> Self {
        Self { params }
    }

    /// The parameters used by [`select`](Self::select).
    #[must_use]
    pub const fn params(&self) -> SelectionParams {
        self.params
    }

    /// Set the relevance/diversity trade-off.
    #[must_use]
    pub const fn with_lambda(mut self, lambda: f64) -> Self {
        self.params.lambda = lambda;
        self
    }

    /// Set the number of exemplars to retrieve.
    #[must_use]
    pub const fn with_k(mut self, k: usize) -> Self {
        self.params.k = k;
        self
    }

    /// Selects exemplars for `query`, in selection order.
    #[must_use]
    pub fn select(&self, query: &[f64], library: &[StyleExemplar]) -> Vec<StyleExemplar> {
        select(query, library, self.params)
    }

    /// Like [`select`](Self::select) but returns positions into `library`.
    #[must_use]
    pub fn rank(&self, query: &[f64], library: &[StyleExemplar]) -> Vec<usize> {
        rank(query, library, self.params)
    }
}

/// Selects up to `params.k` exemplars from `library`, in selection order.
///
/// Never fails: an empty library or `k == 0` yields an empty result, and
/// exemplars whose embeddings cannot be compared with the query score zero.
#[must_use]
pub fn select(
    query: &[f64],
    library: &[StyleExemplar],
    params: SelectionParams,
) -> Vec<StyleExemplar> {
    rank(query, library, params)
        .into_iter()
        .map(|i| library[i].clone())
        .collect()
}

/// Index-level form of [`select`]: positions into `library`, in selection order.
#[must_use]
pub fn rank(query: &[f64], library: &[StyleExemplar], params: SelectionParams) -> Vec<usize> {
    let n = library.len();
    if n == 0 || params.k == 0 {
        return Vec::new();
    }

    let _span = debug_span!("mmr_select", n, k = params.k, lambda = params.lambda).entered();

    let mismatched = library
        .iter()
        .filter(|e| e.ndims() != query.len())
        .count();
    if mismatched > 0 {
        warn!(
            mismatched,
            query_ndims = query.len(),
            "exemplars with mismatched embedding dimensions will score zero"
        );
    }

    let relevance = relevance_scores(query, library);

    if params.k >= n {
        let mut order: Vec<usize> = (0..n).collect();
        // Stable: equally relevant exemplars keep library order.
        order.sort_by_key(|&i| Reverse(OrderedFloat(relevance[i])));
        debug!(selected = n, "k covers the library, ranking by relevance");
        return order;
    }

    let first = most_relevant(&relevance);
    trace!(index = first, relevance = relevance[first], "first pick");

    let mut selected = Vec::with_capacity(params.k);
    selected.push(first);

    // Candidates stay in library order so earlier exemplars win exact ties.
    let mut candidates: Vec<usize> = (0..n).filter(|&i| i != first).collect();
    // Largest similarity of each exemplar to anything selected so far.
    let mut redundancy = vec![f64::NEG_INFINITY; n];

    while selected.len() < params.k && !candidates.is_empty() {
        let last = library[selected[selected.len() - 1]].embedding();
        for &c in &candidates {
            let sim = cosine_similarity(library[c].embedding(), last);
            if sim > redundancy[c] {
                redundancy[c] = sim;
            }
        }

        let mut best_pos = 0;
        let mut best = Scored::new(candidates[0], &relevance, &redundancy, params.lambda);
        for (pos, &c) in candidates.iter().enumerate().skip(1) {
            let scored = Scored::new(c, &relevance, &redundancy, params.lambda);
            if scored.outranks(&best) {
                best = scored;
                best_pos = pos;
            }
        }

        trace!(
            index = best.index,
            score = best.score,
            redundancy = best.redundancy,
            "mmr pick"
        );
        candidates.remove(best_pos);
        selected.push(best.index);
    }

    debug!(selected = selected.len(), "mmr selection complete");
    selected
}

#[cfg(not(feature = "rayon"))]
fn relevance_scores(query: &[f64], library: &[StyleExemplar]) -> Vec<f64> {
    library
        .iter()
        .map(|e| cosine_similarity(query, e.embedding()))
        .collect()
}

#[cfg(feature = "rayon")]
fn relevance_scores(query: &[f64], library: &[StyleExemplar]) -> Vec<f64> {
    use rayon::prelude::*;

    library
        .par_iter()
        .map(|e| cosine_similarity(query, e.embedding()))
        .collect()
}

/// Position of the highest relevance; the earliest wins ties.
fn most_relevant(relevance: &[f64]) -> usize {
    let mut best = 0;
    for (i, &r) in relevance.iter().enumerate().skip(1) {
        if OrderedFloat(r) > OrderedFloat(relevance[best]) {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    index: usize,
    score: f64,
    redundancy: f64,
}

impl Scored {
    fn new(index: usize, relevance: &[f64], redundancy: &[f64], lambda: f64) -> Self {
        let redundancy = redundancy[index];
        Self {
            index,
            score: lambda * relevance[index] - (1.0 - lambda) * redundancy,
            redundancy,
        }
    }

    /// Whether `self` should replace `other`, which precedes it in library order.
    fn outranks(&self, other: &Self) -> bool {
        let (a, b) = (OrderedFloat(self.score), OrderedFloat(other.score));
        if a == b {
            return OrderedFloat(self.redundancy) < OrderedFloat(other.redundancy);
        }
        a > b
    }
}
