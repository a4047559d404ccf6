//! # Kyozai
//!
//! A hybrid retrieval engine for structured teaching materials.
//!
//! Kyozai turns header-marked material files into a searchable chunk corpus
//! and answers relevance queries by fusing two independent ranking signals:
//! a lexical (BM25 term-statistics) score and a semantic
//! (embedding-cosine-similarity) score, min-max normalized per query and
//! combined with caller-tunable weights.
//!
//! ## Features
//!
//! - Four-level header segmentation with hierarchical chunk metadata
//! - Maximal-recall tokenization for mixed CJK/Latin text
//! - BM25 lexical index built once, lazily, per corpus
//! - Pluggable embedder and persisted vector store with staleness detection
//! - Union candidate generation, stable fusion ranking, multi-keyword merge
//! - Graceful degradation to lexical-only scoring when embedding fails
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use kyozai::engine::RetrievalEngine;
//! use kyozai::segment::SourceFile;
//! use kyozai::semantic::{MemoryVectorStore, NoopEmbedder};
//!
//! let files = vec![SourceFile::new(
//!     "ds.md",
//!     "# 1 資料結構\n## 1-1 陣列\n陣列是一種連續記憶體結構\n",
//! )];
//! let engine = RetrievalEngine::new(
//!     files,
//!     Arc::new(NoopEmbedder::new()),
//!     Arc::new(MemoryVectorStore::new()),
//! );
//!
//! let unit = engine.get_unit(1, 1).unwrap();
//! assert!(unit.contains("陣列是一種連續記憶體結構"));
//! ```

pub mod analysis;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod lexical;
pub mod segment;
pub mod semantic;

pub use engine::{EngineConfig, RetrievalEngine};
pub use error::{KyozaiError, Result};
pub use fusion::FusionWeights;
pub use segment::{Chunk, Corpus, SourceFile, UnitCode};
pub use semantic::{Embedder, VectorStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
