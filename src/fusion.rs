//! Score normalization, fusion, and ranking.
//!
//! The lexical and semantic indices score on incompatible scales (BM25 is
//! unbounded, cosine similarity lives in [-1, 1]), so each score array over
//! the same candidate set is min-max normalized independently before a
//! weighted combination.

use serde::{Deserialize, Serialize};

/// Weights for combining the two normalized signals.
///
/// The weights are caller-tunable and need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight for the lexical (term-statistics) score.
    pub lexical: f32,
    /// Weight for the semantic (embedding-similarity) score.
    pub semantic: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        FusionWeights {
            lexical: 0.7,
            semantic: 0.3,
        }
    }
}

impl FusionWeights {
    /// Create explicit weights.
    pub fn new(lexical: f32, semantic: f32) -> Self {
        FusionWeights { lexical, semantic }
    }

    /// Lexical-only weighting.
    pub fn lexical_only() -> Self {
        FusionWeights {
            lexical: 1.0,
            semantic: 0.0,
        }
    }
}

/// Min-max normalize a score array to `[0, 1]`.
///
/// A zero-variance array (including a single element) maps to all `1.0`:
/// this avoids division by zero and avoids penalizing a lone candidate
/// whose only "fault" is having nothing to be compared against.
///
/// # Examples
///
/// ```
/// use kyozai::fusion::min_max_normalize;
///
/// assert_eq!(min_max_normalize(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
/// assert_eq!(min_max_normalize(&[5.0, 5.0]), vec![1.0, 1.0]);
/// assert_eq!(min_max_normalize(&[0.42]), vec![1.0]);
/// ```
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max = scores.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let range = max - min;
    if range == 0.0 {
        return vec![1.0; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / range).collect()
}

/// Weighted combination of two normalized score arrays.
///
/// `semantic` is `None` when the query degraded to lexical-only scoring; the
/// semantic signal then contributes 0.
pub fn fuse(
    lexical: &[f32],
    semantic: Option<&[f32]>,
    weights: FusionWeights,
) -> Vec<f32> {
    lexical
        .iter()
        .enumerate()
        .map(|(i, &lex)| {
            let sem = semantic.map(|s| s[i]).unwrap_or(0.0);
            weights.lexical * lex + weights.semantic * sem
        })
        .collect()
}

/// Indices of `scores` in descending score order.
///
/// The sort is stable: equal-score candidates retain their original
/// relative position, so candidate-generation order is the deterministic
/// tie-break.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}
