//! Semantic (embedding-similarity) index module.
//!
//! Maps chunks to dense vectors through an external [`Embedder`], persists
//! the corpus vectors through a [`VectorStore`] keyed by chunk ordinal and
//! guarded by a corpus fingerprint, and answers cosine-similarity queries.

pub mod embedder;
pub mod index;
pub mod store;

pub use embedder::{Embedder, NoopEmbedder};
pub use index::{SemanticIndex, cosine_similarity};
pub use store::{FileVectorStore, MemoryVectorStore, StoredVector, StoredVectors, VectorStore};
