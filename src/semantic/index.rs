//! Semantic index: corpus vectors plus cosine-similarity scoring.

use tracing::{info, warn};

use crate::error::{KyozaiError, Result};
use crate::segment::Corpus;
use crate::semantic::embedder::Embedder;
use crate::semantic::store::{StoredVector, StoredVectors, VectorStore};

/// Batch size used when embedding the corpus.
const EMBED_BATCH_SIZE: usize = 32;

/// Dense-vector index over the chunk corpus.
///
/// Vectors are aligned to corpus order; a chunk whose embedding failed
/// during the build holds no vector and is invisible to semantic candidate
/// generation. The index is read-only after construction.
#[derive(Debug)]
pub struct SemanticIndex {
    dimension: usize,
    vectors: Vec<Option<Vec<f32>>>,
}

impl SemanticIndex {
    /// Build the index, reusing persisted vectors when they are current.
    ///
    /// A persisted set is trusted only when its fingerprint matches the
    /// corpus fingerprint and its dimension matches the embedder; otherwise
    /// the corpus is re-embedded and the store overwritten. A load failure
    /// is logged and treated as an absent store. Per-chunk embedding
    /// failures are skipped with a warning; the build errors only when a
    /// non-empty corpus produced no vectors at all.
    pub fn build_or_load(
        corpus: &Corpus,
        embedder: &dyn Embedder,
        store: &dyn VectorStore,
    ) -> Result<Self> {
        match store.load() {
            Ok(Some(stored))
                if stored.fingerprint == corpus.fingerprint()
                    && stored.dimension == embedder.dimension() =>
            {
                info!(
                    vectors = stored.entries.len(),
                    chunks = corpus.len(),
                    "loaded persisted corpus vectors"
                );
                return Ok(Self::from_stored(corpus.len(), stored));
            }
            Ok(Some(_)) => {
                warn!("persisted vector store is stale, re-embedding corpus");
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "vector store unreadable, re-embedding corpus");
            }
        }

        let index = Self::embed_corpus(corpus, embedder)?;
        if let Err(e) = store.save(&index.to_stored(corpus.fingerprint())) {
            warn!(error = %e, "failed to persist corpus vectors, continuing in-memory");
        }
        Ok(index)
    }

    fn from_stored(corpus_len: usize, stored: StoredVectors) -> Self {
        let mut vectors = vec![None; corpus_len];
        for entry in stored.entries {
            if let Some(slot) = vectors.get_mut(entry.chunk as usize) {
                *slot = Some(entry.vector);
            }
        }
        SemanticIndex {
            dimension: stored.dimension,
            vectors,
        }
    }

    fn to_stored(&self, fingerprint: u32) -> StoredVectors {
        StoredVectors {
            fingerprint,
            dimension: self.dimension,
            entries: self
                .vectors
                .iter()
                .enumerate()
                .filter_map(|(chunk, vector)| {
                    vector.as_ref().map(|v| StoredVector {
                        chunk: chunk as u32,
                        vector: v.clone(),
                    })
                })
                .collect(),
        }
    }

    fn embed_corpus(corpus: &Corpus, embedder: &dyn Embedder) -> Result<Self> {
        let dimension = embedder.dimension();
        let mut vectors: Vec<Option<Vec<f32>>> = Vec::with_capacity(corpus.len());

        for batch in corpus.chunks().chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            match embedder.embed_batch(&texts) {
                Ok(batch_vectors) if batch_vectors.len() == texts.len() => {
                    vectors.extend(batch_vectors.into_iter().map(Some));
                }
                Ok(_) | Err(_) => {
                    // Batch failed: retry chunk by chunk so one bad document
                    // does not sink its neighbours.
                    for (chunk, text) in batch.iter().zip(texts.iter().copied()) {
                        match embedder.embed(text) {
                            Ok(vector) => vectors.push(Some(vector)),
                            Err(e) => {
                                warn!(
                                    source = %chunk.source,
                                    error = %e,
                                    "embedding failed for chunk, skipping"
                                );
                                vectors.push(None);
                            }
                        }
                    }
                }
            }
        }

        let embedded = vectors.iter().filter(|v| v.is_some()).count();
        if embedded == 0 && !corpus.is_empty() {
            return Err(KyozaiError::embedding(
                "corpus embedding produced no vectors",
            ));
        }

        info!(
            embedded,
            chunks = corpus.len(),
            dimension,
            "semantic index built"
        );
        Ok(SemanticIndex { dimension, vectors })
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of chunks holding a vector.
    pub fn embedded_count(&self) -> usize {
        self.vectors.iter().filter(|v| v.is_some()).count()
    }

    /// Cosine scores for a query vector over a candidate set, aligned to it.
    ///
    /// Candidates without a vector score 0.
    pub fn score_subset(&self, query: &[f32], candidates: &[u32]) -> Vec<f32> {
        candidates
            .iter()
            .map(|&doc| {
                self.vectors
                    .get(doc as usize)
                    .and_then(|v| v.as_ref())
                    .map(|v| cosine_similarity(query, v))
                    .unwrap_or(0.0)
            })
            .collect()
    }

    /// Top-n semantic candidates over a scope, by cosine similarity.
    ///
    /// Chunks without a vector are skipped; ties keep scope order.
    pub fn top_n(&self, query: &[f32], scope: Option<&[u32]>, n: usize) -> Vec<u32> {
        let mut ranked: Vec<(u32, f32)> = match scope {
            Some(ids) => ids
                .iter()
                .filter_map(|&doc| {
                    self.vectors
                        .get(doc as usize)
                        .and_then(|v| v.as_ref())
                        .map(|v| (doc, cosine_similarity(query, v)))
                })
                .collect(),
            None => self
                .vectors
                .iter()
                .enumerate()
                .filter_map(|(doc, vector)| {
                    vector
                        .as_ref()
                        .map(|v| (doc as u32, cosine_similarity(query, v)))
                })
                .collect(),
        };

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked.into_iter().map(|(doc, _)| doc).collect()
    }
}

/// Cosine similarity between two vectors.
///
/// Zero-norm input (or mismatched lengths, which a well-behaved embedder
/// never produces) yields 0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
