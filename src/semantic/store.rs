//! Persistence for corpus embedding vectors.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{KyozaiError, Result};

/// Persisted corpus vectors, keyed by chunk ordinal.
///
/// Chunk ordinals are stable across rebuilds as long as the corpus ordering
/// is unchanged; the fingerprint records the corpus content the vectors
/// were computed from so a stale store is detected instead of trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVectors {
    /// Fingerprint of the corpus these vectors were computed from.
    pub fingerprint: u32,
    /// Embedding dimension.
    pub dimension: usize,
    /// Vectors for the chunks that embedded successfully.
    pub entries: Vec<StoredVector>,
}

/// One persisted chunk vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVector {
    /// Chunk ordinal in corpus order.
    pub chunk: u32,
    /// Embedding vector.
    pub vector: Vec<f32>,
}

/// Storage handle for persisted corpus vectors.
pub trait VectorStore: Send + Sync {
    /// Load the persisted vector set, or `None` when nothing is persisted.
    fn load(&self) -> Result<Option<StoredVectors>>;

    /// Persist a vector set, replacing any previous one.
    fn save(&self, vectors: &StoredVectors) -> Result<()>;
}

/// File-backed vector store using bincode.
#[derive(Debug, Clone)]
pub struct FileVectorStore {
    path: PathBuf,
}

impl FileVectorStore {
    /// Create a store backed by the given file path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileVectorStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VectorStore for FileVectorStore {
    fn load(&self) -> Result<Option<StoredVectors>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        let vectors = bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            KyozaiError::serialization(format!(
                "malformed vector store at {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(vectors))
    }

    fn save(&self, vectors: &StoredVectors) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        bincode::serialize_into(BufWriter::new(file), vectors).map_err(|e| {
            KyozaiError::serialization(format!(
                "failed to persist vector store at {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// In-memory vector store for tests and ephemeral engines.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    inner: Mutex<Option<StoredVectors>>,
}

impl MemoryVectorStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorStore for MemoryVectorStore {
    fn load(&self) -> Result<Option<StoredVectors>> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, vectors: &StoredVectors) -> Result<()> {
        *self.inner.lock() = Some(vectors.clone());
        Ok(())
    }
}
