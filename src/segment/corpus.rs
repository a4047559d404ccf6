//! Corpus assembly and unit/chapter text retrieval.

use std::collections::BTreeMap;

use crate::segment::chunk::{Chunk, UnitCode};
use crate::segment::loader::SourceFile;
use crate::segment::splitter::HeaderSplitter;

/// The full ordered set of chunks for one engine lifetime.
///
/// Order is preserved from source-file traversal. A corpus is built exactly
/// once per engine; rebuilding requires explicit invalidation. The
/// fingerprint is a CRC32 over chunk contents and metadata in corpus order
/// and is used to detect a stale persisted vector store.
#[derive(Debug, Clone)]
pub struct Corpus {
    chunks: Vec<Chunk>,
    fingerprint: u32,
}

impl Corpus {
    /// Segment the given files, in order, into a corpus.
    ///
    /// An empty file set yields an empty corpus, not an error.
    pub fn from_files(files: &[SourceFile]) -> Self {
        let splitter = HeaderSplitter::new();
        let chunks: Vec<Chunk> = files.iter().flat_map(|f| splitter.split(f)).collect();
        let fingerprint = Self::fingerprint_of(&chunks);
        Corpus {
            chunks,
            fingerprint,
        }
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Content fingerprint for staleness checks on persisted vectors.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Concatenated content of every chunk in the requested unit.
    ///
    /// Chunks are emitted in corpus order under a visible `=== c-u ===`
    /// marker. Returns `None` when no chunk matches. Chunks without a unit
    /// header never match.
    pub fn unit_text(&self, chapter: u32, unit: u32) -> Option<String> {
        let target = UnitCode::new(chapter, unit);
        let matched: Vec<&str> = self
            .chunks
            .iter()
            .filter(|c| c.unit_code() == Some(target))
            .map(|c| c.content.trim())
            .collect();

        if matched.is_empty() {
            return None;
        }

        let mut out = vec![target.marker()];
        out.extend(matched.iter().map(|s| s.to_string()));
        Some(out.join("\n"))
    }

    /// Concatenated content of every unit in the requested chapter.
    ///
    /// Units are grouped by their numeric code, groups sorted by that code,
    /// each preceded by its marker; chunk order inside a group is corpus
    /// order. Returns `None` when no chunk matches.
    pub fn chapter_text(&self, chapter: u32) -> Option<String> {
        let mut groups: BTreeMap<UnitCode, Vec<&str>> = BTreeMap::new();
        for chunk in &self.chunks {
            if let Some(code) = chunk.unit_code() {
                groups.entry(code).or_default().push(chunk.content.trim());
            }
        }

        let mut out = Vec::new();
        for (code, contents) in &groups {
            if code.chapter == chapter {
                out.push(code.marker());
                out.extend(contents.iter().map(|s| s.to_string()));
            }
        }

        if out.is_empty() {
            None
        } else {
            Some(out.join("\n"))
        }
    }

    fn fingerprint_of(chunks: &[Chunk]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for chunk in chunks {
            hasher.update(chunk.content.as_bytes());
            hasher.update(b"\0");
            for field in [&chunk.chapter, &chunk.unit, &chunk.paragraph] {
                if let Some(value) = field {
                    hasher.update(value.as_bytes());
                }
                hasher.update(b"\0");
            }
            hasher.update(chunk.source.as_bytes());
            hasher.update(b"\0");
        }
        hasher.finalize()
    }
}
