//! BM25 index over the chunk corpus.

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::Tokenizer;
use crate::error::Result;
use crate::segment::Corpus;

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation parameter.
    pub k1: f32,
    /// Length-normalization parameter.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

/// Postings for one term: how many chunks contain it and the per-chunk
/// term frequencies.
#[derive(Debug, Clone, Default)]
struct Postings {
    doc_freq: u32,
    entries: Vec<(u32, u32)>,
}

/// Term-statistics ranking structure over the chunk corpus.
///
/// Built once per corpus: every chunk is tokenized exactly once, and the
/// index records per-term document frequency, per-chunk term frequency, and
/// the average chunk length. Scoring uses the BM25 formula with saturating
/// term-frequency weighting and length normalization.
#[derive(Debug)]
pub struct LexicalIndex {
    params: Bm25Params,
    postings: AHashMap<String, Postings>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f64,
}

impl LexicalIndex {
    /// Tokenize every corpus chunk and build the index.
    pub fn build(
        corpus: &Corpus,
        tokenizer: &(dyn Tokenizer),
        params: Bm25Params,
    ) -> Result<Self> {
        let term_freqs: Vec<AHashMap<String, u32>> = corpus
            .chunks()
            .par_iter()
            .map(|chunk| -> Result<AHashMap<String, u32>> {
                let mut freqs = AHashMap::new();
                for token in tokenizer.tokenize(&chunk.content)? {
                    *freqs.entry(token.text).or_insert(0) += 1;
                }
                Ok(freqs)
            })
            .collect::<Result<_>>()?;

        let mut postings: AHashMap<String, Postings> = AHashMap::new();
        let mut doc_lengths = Vec::with_capacity(term_freqs.len());
        for (doc, freqs) in term_freqs.iter().enumerate() {
            let length: u32 = freqs.values().sum();
            doc_lengths.push(length);
            for (term, &freq) in freqs {
                let entry = postings.entry(term.clone()).or_default();
                entry.doc_freq += 1;
                entry.entries.push((doc as u32, freq));
            }
        }

        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            doc_lengths.iter().map(|&l| l as f64).sum::<f64>() / doc_lengths.len() as f64
        };

        info!(
            chunks = doc_lengths.len(),
            terms = postings.len(),
            avg_chunk_tokens = avg_doc_length,
            "lexical index built"
        );

        Ok(LexicalIndex {
            params,
            postings,
            doc_lengths,
            avg_doc_length,
        })
    }

    /// Number of indexed chunks.
    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    /// BM25 scores for the query, aligned to corpus order.
    ///
    /// Repeated query tokens contribute once per occurrence, mirroring how
    /// a maximal tokenization of a short keyword weights its components.
    pub fn score(&self, query_tokens: &[String]) -> Vec<f32> {
        let n = self.doc_lengths.len();
        let mut scores = vec![0.0f32; n];
        if n == 0 {
            return scores;
        }

        let Bm25Params { k1, b } = self.params;
        let total_docs = n as f32;

        for token in query_tokens {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let df = postings.doc_freq as f32;
            // IDF = ln(1 + (N - df + 0.5) / (df + 0.5)). The +1 keeps the
            // weight strictly positive even in tiny corpora where df == N.
            let idf = (1.0 + (total_docs - df + 0.5) / (df + 0.5)).ln();
            for &(doc, tf) in &postings.entries {
                let tf = tf as f32;
                let len = self.doc_lengths[doc as usize] as f32;
                let norm = 1.0 - b + b * (len / self.avg_doc_length as f32);
                scores[doc as usize] += idf * (tf * (k1 + 1.0)) / (tf + k1 * norm);
            }
        }
        scores
    }

    /// Scores for the query over an explicit candidate set, aligned to it.
    pub fn score_subset(&self, query_tokens: &[String], candidates: &[u32]) -> Vec<f32> {
        let scores = self.score(query_tokens);
        candidates
            .iter()
            .map(|&doc| scores.get(doc as usize).copied().unwrap_or(0.0))
            .collect()
    }

    /// Top-n candidate generation over a scope.
    ///
    /// With no scope, ranks the full corpus and keeps only chunks with a
    /// positive score (a zero score means no query term appears at all).
    /// With a metadata-filtered scope, the top n are kept regardless of
    /// score so that a small in-scope set is never emptied out. Ties keep
    /// corpus order (the sort is stable).
    pub fn top_n(&self, query_tokens: &[String], scope: Option<&[u32]>, n: usize) -> Vec<u32> {
        let scores = self.score(query_tokens);

        let mut ranked: Vec<u32> = match scope {
            Some(ids) => ids.to_vec(),
            None => (0..self.doc_lengths.len() as u32)
                .filter(|&doc| scores[doc as usize] > 0.0)
                .collect(),
        };

        ranked.sort_by(|&a, &b| {
            scores[b as usize]
                .partial_cmp(&scores[a as usize])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MaximalTokenizer;
    use crate::segment::SourceFile;

    fn build_index() -> LexicalIndex {
        let corpus = Corpus::from_files(&[SourceFile::new(
            "ds.md",
            "## 1-1 陣列\n陣列是一種連續記憶體結構\n\
             ## 1-2 堆疊\n堆疊是一種後進先出結構\n\
             ## 1-3 佇列\n佇列是一種先進先出結構\n",
        )]);
        LexicalIndex::build(&corpus, &MaximalTokenizer::new(), Bm25Params::default()).unwrap()
    }

    fn tokens(text: &str) -> Vec<String> {
        MaximalTokenizer::new()
            .tokenize(text)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_scores_align_to_corpus_order() {
        let index = build_index();
        let scores = index.score(&tokens("陣列"));
        assert_eq!(scores.len(), 3);
        // Chunk 0 matches 陣, 陣列 and 列; chunk 2 shares only the common
        // character 列 (佇列); chunk 1 shares nothing.
        assert!(scores[0] > scores[2]);
        assert!(scores[2] > 0.0);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_exact_match_dominates() {
        let index = build_index();
        let ranked = index.top_n(&tokens("堆疊"), None, 3);
        assert_eq!(ranked.first(), Some(&1));
    }

    #[test]
    fn test_full_corpus_top_n_drops_zero_scores() {
        let index = build_index();
        let ranked = index.top_n(&tokens("陣列"), None, 10);
        assert_eq!(ranked, vec![0, 2]);
        assert!(!ranked.contains(&1));
    }

    #[test]
    fn test_scoped_top_n_keeps_zero_scores() {
        let index = build_index();
        let ranked = index.top_n(&tokens("陣列"), Some(&[1, 2]), 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_scoped_ties_keep_scope_order() {
        let index = build_index();
        // No query term matches chunks 2 or 1: both score 0.0.
        let ranked = index.top_n(&tokens("陣列"), Some(&[2, 1]), 10);
        assert_eq!(ranked, vec![2, 1]);
    }

    #[test]
    fn test_score_subset_alignment() {
        let index = build_index();
        let q = tokens("堆疊");
        let subset = index.score_subset(&q, &[2, 1]);
        let full = index.score(&q);
        assert_eq!(subset, vec![full[2], full[1]]);
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = Corpus::from_files(&[]);
        let index =
            LexicalIndex::build(&corpus, &MaximalTokenizer::new(), Bm25Params::default())
                .unwrap();
        assert_eq!(index.doc_count(), 0);
        assert!(index.score(&tokens("陣列")).is_empty());
        assert!(index.top_n(&tokens("陣列"), None, 5).is_empty());
    }

    #[test]
    fn test_unknown_token_scores_zero() {
        let index = build_index();
        let scores = index.score(&["quicksort".to_string()]);
        assert!(scores.iter().all(|&s| s == 0.0));
    }
}
