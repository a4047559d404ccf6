//! Retrieval engine: the public entry point.
//!
//! [`RetrievalEngine`] owns the corpus and both indices explicitly (no
//! module-level singletons) and builds them lazily behind a mutex, so
//! concurrent first callers share one build. After construction everything
//! is read-only and shared through `Arc`s; corpus edits require
//! [`RetrievalEngine::invalidate`] followed by a rebuild on next use.

use std::sync::Arc;

use ahash::AHashSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{MaximalTokenizer, Tokenizer};
use crate::error::Result;
use crate::fusion::{self, FusionWeights};
use crate::lexical::{Bm25Params, LexicalIndex};
use crate::segment::{Corpus, SourceFile};
use crate::semantic::{Embedder, SemanticIndex, VectorStore};

/// Engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// BM25 parameters for the lexical index.
    pub bm25: Bm25Params,
    /// Per-signal candidate list size during candidate generation.
    pub candidate_pool: usize,
    /// Default fusion weights, used by [`RetrievalEngine::retrieve`].
    pub weights: FusionWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            bm25: Bm25Params::default(),
            candidate_pool: 10,
            weights: FusionWeights::default(),
        }
    }
}

/// Both indices over one corpus snapshot.
struct Indices {
    lexical: Arc<LexicalIndex>,
    semantic: Option<Arc<SemanticIndex>>,
}

/// Hybrid retrieval engine over a teaching-material corpus.
///
/// The engine is constructed from in-memory source files plus the two
/// external collaborators (embedder and vector store), and is safe to share
/// across threads.
pub struct RetrievalEngine {
    files: Vec<SourceFile>,
    config: EngineConfig,
    tokenizer: MaximalTokenizer,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    corpus: Mutex<Option<Arc<Corpus>>>,
    indices: Mutex<Option<Arc<Indices>>>,
}

impl RetrievalEngine {
    /// Create an engine with default configuration.
    pub fn new(
        files: Vec<SourceFile>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self::with_config(files, embedder, store, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(
        files: Vec<SourceFile>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: EngineConfig,
    ) -> Self {
        RetrievalEngine {
            files,
            config,
            tokenizer: MaximalTokenizer::new(),
            embedder,
            store,
            corpus: Mutex::new(None),
            indices: Mutex::new(None),
        }
    }

    /// Build corpus and indices now instead of on first query.
    ///
    /// Semantic-index failures degrade (logged, cached as unavailable)
    /// rather than failing the call; only lexical build failures are
    /// returned as errors.
    pub fn ensure_built(&self) -> Result<()> {
        self.ensure_indices().map(|_| ())
    }

    /// Drop all cached state; the next call rebuilds from the source files.
    pub fn invalidate(&self) {
        *self.indices.lock() = None;
        *self.corpus.lock() = None;
        info!("engine state invalidated");
    }

    /// Whether the currently built state includes a semantic index.
    ///
    /// `false` when nothing is built yet or when the semantic build
    /// degraded.
    pub fn semantic_available(&self) -> bool {
        self.indices
            .lock()
            .as_ref()
            .is_some_and(|i| i.semantic.is_some())
    }

    /// Teaching-material text for one unit, or `None` if nothing matches.
    pub fn get_unit(&self, chapter: u32, unit: u32) -> Option<String> {
        self.ensure_corpus().unit_text(chapter, unit)
    }

    /// Teaching-material text for one chapter, or `None` if nothing matches.
    pub fn get_chapter(&self, chapter: u32) -> Option<String> {
        self.ensure_corpus().chapter_text(chapter)
    }

    /// Hybrid retrieval with the configured default weights.
    pub fn retrieve(&self, keywords: &[&str], top_k: usize) -> Result<Option<Vec<String>>> {
        self.retrieve_weighted(keywords, top_k, self.config.weights)
    }

    /// Hybrid retrieval with explicit fusion weights.
    ///
    /// Runs the candidate-generation → dual-scoring → fusion pipeline once
    /// per keyword, caps each ranked list at `top_k`, concatenates the
    /// lists in keyword order, and deduplicates by chunk identity keeping
    /// the first (highest-ranked) occurrence. Returns `Ok(None)` when no
    /// keyword matched anything, including for an empty keyword list.
    pub fn retrieve_weighted(
        &self,
        keywords: &[&str],
        top_k: usize,
        weights: FusionWeights,
    ) -> Result<Option<Vec<String>>> {
        if keywords.is_empty() {
            return Ok(None);
        }

        let corpus = self.ensure_corpus();
        let indices = self.ensure_indices()?;

        let mut merged: Vec<u32> = Vec::new();
        let mut seen: AHashSet<u32> = AHashSet::new();
        for &keyword in keywords {
            let ranked = self.retrieve_keyword(&corpus, &indices, keyword, top_k, weights)?;
            for doc in ranked {
                if seen.insert(doc) {
                    merged.push(doc);
                }
            }
        }

        if merged.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            merged
                .into_iter()
                .map(|doc| corpus.chunks()[doc as usize].content.clone())
                .collect(),
        ))
    }

    /// The full pipeline for one keyword, returning ranked chunk ordinals.
    fn retrieve_keyword(
        &self,
        corpus: &Corpus,
        indices: &Indices,
        keyword: &str,
        top_k: usize,
        weights: FusionWeights,
    ) -> Result<Vec<u32>> {
        // Metadata scope filter: restrict to chunks whose chapter or
        // paragraph mentions the keyword; an empty filter result falls back
        // to the full corpus.
        let scoped: Vec<u32> = corpus
            .chunks()
            .iter()
            .enumerate()
            .filter(|(_, chunk)| {
                chunk
                    .chapter
                    .as_deref()
                    .is_some_and(|v| v.contains(keyword))
                    || chunk
                        .paragraph
                        .as_deref()
                        .is_some_and(|v| v.contains(keyword))
            })
            .map(|(i, _)| i as u32)
            .collect();
        let scope = if scoped.is_empty() { None } else { Some(scoped) };

        let query_tokens: Vec<String> = self
            .tokenizer
            .tokenize(keyword)?
            .map(|t| t.text)
            .collect();

        let pool = self.config.candidate_pool;
        let lex_top = indices
            .lexical
            .top_n(&query_tokens, scope.as_deref(), pool);

        // Query embedding; failure degrades this query to lexical-only.
        let query_vector = if weights.semantic != 0.0 {
            indices.semantic.as_ref().and_then(|sem| {
                match self.embedder.embed(keyword) {
                    Ok(vector) => Some((sem, vector)),
                    Err(e) => {
                        warn!(
                            keyword,
                            error = %e,
                            "query embedding failed, lexical-only for this query"
                        );
                        None
                    }
                }
            })
        } else {
            None
        };

        let sem_top = query_vector
            .as_ref()
            .map(|(sem, vector)| sem.top_n(vector, scope.as_deref(), pool))
            .unwrap_or_default();

        // Union the candidate lists by chunk identity. Lexical candidates
        // come first; that order is also the tie-break order after fusion.
        let mut candidates = lex_top;
        let mut in_union: AHashSet<u32> = candidates.iter().copied().collect();
        for doc in sem_top {
            if in_union.insert(doc) {
                candidates.push(doc);
            }
        }

        if candidates.is_empty() {
            debug!(keyword, "no candidates for keyword");
            return Ok(Vec::new());
        }

        // Score every unioned candidate on both signals before fusing.
        let lex_scores = indices.lexical.score_subset(&query_tokens, &candidates);
        let sem_scores = query_vector
            .as_ref()
            .map(|(sem, vector)| sem.score_subset(vector, &candidates));

        let norm_lex = fusion::min_max_normalize(&lex_scores);
        let norm_sem = sem_scores.as_deref().map(fusion::min_max_normalize);
        let fused = fusion::fuse(&norm_lex, norm_sem.as_deref(), weights);

        let order = fusion::rank_descending(&fused);
        debug!(
            keyword,
            scoped = scope.as_ref().map(|s| s.len()).unwrap_or(0),
            candidates = candidates.len(),
            semantic = sem_scores.is_some(),
            "keyword retrieval complete"
        );
        Ok(order
            .into_iter()
            .take(top_k)
            .map(|i| candidates[i])
            .collect())
    }

    fn ensure_corpus(&self) -> Arc<Corpus> {
        let mut guard = self.corpus.lock();
        if let Some(corpus) = guard.as_ref() {
            return corpus.clone();
        }
        let corpus = Arc::new(Corpus::from_files(&self.files));
        info!(
            files = self.files.len(),
            chunks = corpus.len(),
            "corpus segmented"
        );
        *guard = Some(corpus.clone());
        corpus
    }

    fn ensure_indices(&self) -> Result<Arc<Indices>> {
        let corpus = self.ensure_corpus();
        let mut guard = self.indices.lock();
        if let Some(indices) = guard.as_ref() {
            return Ok(indices.clone());
        }

        let lexical = Arc::new(LexicalIndex::build(
            &corpus,
            &self.tokenizer,
            self.config.bm25,
        )?);
        let semantic = match SemanticIndex::build_or_load(
            &corpus,
            self.embedder.as_ref(),
            self.store.as_ref(),
        ) {
            Ok(index) => Some(Arc::new(index)),
            Err(e) => {
                warn!(
                    error = %e,
                    "semantic index unavailable, retrieval degrades to lexical-only"
                );
                None
            }
        };

        let indices = Arc::new(Indices { lexical, semantic });
        *guard = Some(indices.clone());
        Ok(indices)
    }
}
