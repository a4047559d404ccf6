//! Embedder trait: the seam to the external embedding service.

use crate::error::{KyozaiError, Result};

/// Maps text to a fixed-length dense vector.
///
/// This is a collaborator contract: implementations wrap an external
/// embedding model or service. The engine relies on two properties:
///
/// - `embed` is deterministic for identical input and model version;
/// - every returned vector has `dimension()` elements.
///
/// Implementations cross a service boundary and should time-bound their
/// calls; the engine treats any error as a degrade signal, not a fatal one.
pub trait Embedder: Send + Sync {
    /// Length of every vector produced by this embedder.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, aligned to the input order.
    ///
    /// The default implementation embeds item by item; service-backed
    /// implementations should override this with a real batch call.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get the name of this embedder (for logging and diagnostics).
    fn name(&self) -> &'static str {
        "embedder"
    }
}

/// An embedder that supports nothing, for running the engine without a
/// semantic collaborator.
///
/// Every call returns an error, which the engine's degrade path turns into
/// lexical-only retrieval. Null-object counterpart to a real service-backed
/// embedder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmbedder;

impl NoopEmbedder {
    /// Create a new no-op embedder.
    pub fn new() -> Self {
        NoopEmbedder
    }
}

impl Embedder for NoopEmbedder {
    fn dimension(&self) -> usize {
        0
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(KyozaiError::embedding(
            "NoopEmbedder does not support embedding",
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
