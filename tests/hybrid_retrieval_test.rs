use std::sync::Arc;

use kyozai::engine::RetrievalEngine;
use kyozai::error::{KyozaiError, Result};
use kyozai::fusion::FusionWeights;
use kyozai::segment::SourceFile;
use kyozai::semantic::{Embedder, MemoryVectorStore, NoopEmbedder};

/// Deterministic embedder: the first table entry contained in the input
/// decides the vector; unknown text errors.
struct TableEmbedder {
    table: Vec<(&'static str, Vec<f32>)>,
}

impl TableEmbedder {
    fn new(table: Vec<(&'static str, Vec<f32>)>) -> Self {
        TableEmbedder { table }
    }
}

impl Embedder for TableEmbedder {
    fn dimension(&self) -> usize {
        2
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.table
            .iter()
            .find(|(key, _)| text.contains(key))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| KyozaiError::embedding(format!("no vector for {text:?}")))
    }
}

const MATERIAL: &str = "\
# 1 資料結構\n\
## 1-1 陣列\n陣列是一種連續記憶體結構\n\
## 1-2 堆疊\n堆疊是一種後進先出結構\n";

fn lexical_engine() -> RetrievalEngine {
    RetrievalEngine::new(
        vec![SourceFile::new("ds.md", MATERIAL)],
        Arc::new(NoopEmbedder::new()),
        Arc::new(MemoryVectorStore::new()),
    )
}

fn hybrid_engine() -> RetrievalEngine {
    let embedder = TableEmbedder::new(vec![
        ("queue", vec![0.2, 0.8]),
        ("陣列", vec![1.0, 0.0]),
        ("堆疊", vec![0.0, 1.0]),
    ]);
    RetrievalEngine::new(
        vec![SourceFile::new("ds.md", MATERIAL)],
        Arc::new(embedder),
        Arc::new(MemoryVectorStore::new()),
    )
}

#[test]
fn test_get_unit_returns_only_requested_unit() {
    let engine = lexical_engine();

    let text = engine.get_unit(1, 1).unwrap();
    assert!(text.contains("=== 1-1 ==="));
    assert!(text.contains("陣列是一種連續記憶體結構"));
    assert!(!text.contains("堆疊是一種後進先出結構"));

    // Idempotent against an unchanged corpus.
    assert_eq!(engine.get_unit(1, 1), Some(text));
}

#[test]
fn test_get_chapter_covers_all_units() {
    let engine = lexical_engine();
    let text = engine.get_chapter(1).unwrap();
    let array = text.find("=== 1-1 ===").unwrap();
    let stack = text.find("=== 1-2 ===").unwrap();
    assert!(array < stack);
}

#[test]
fn test_lexical_exact_match_ranks_first() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let engine = hybrid_engine();
    let results = engine
        .retrieve_weighted(&["陣列"], 1, FusionWeights::new(1.0, 0.0))?
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].contains("陣列是一種連續記憶體結構"));
    Ok(())
}

#[test]
fn test_semantic_signal_surfaces_lexically_absent_chunk()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    // "queue" shares no token with the corpus, so its lexical candidate
    // list is empty; the embedder places it near the stack chunk, and with
    // a non-zero semantic weight that chunk must still surface.
    let engine = hybrid_engine();
    let results = engine
        .retrieve_weighted(&["queue"], 1, FusionWeights::new(0.7, 0.3))?
        .unwrap();
    assert!(results[0].contains("堆疊是一種後進先出結構"));
    Ok(())
}

#[test]
fn test_multi_keyword_merge_keeps_keyword_order()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    let engine = hybrid_engine();
    let results = engine
        .retrieve_weighted(&["陣列", "堆疊"], 1, FusionWeights::new(1.0, 0.0))?
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].contains("陣列"));
    assert!(results[1].contains("堆疊"));
    Ok(())
}

#[test]
fn test_multi_keyword_merge_deduplicates()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    let engine = hybrid_engine();
    // Both keywords rank the array chunk first; it appears once.
    let results = engine
        .retrieve_weighted(&["陣列", "記憶體"], 1, FusionWeights::new(1.0, 0.0))?
        .unwrap();
    assert_eq!(results.len(), 1);
    Ok(())
}

#[test]
fn test_empty_keyword_list_is_not_found() {
    let engine = hybrid_engine();
    assert_eq!(engine.retrieve(&[], 5).unwrap(), None);
}

#[test]
fn test_unmatched_keywords_are_not_found() {
    let engine = lexical_engine();
    assert_eq!(engine.retrieve(&["quicksort"], 5).unwrap(), None);
}

#[test]
fn test_equal_scores_keep_corpus_order()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    // Two chunks identical under the query's vocabulary: both contain 排序
    // once and have equal token counts, so their BM25 scores tie and the
    // stable ranking must keep corpus order.
    let files = vec![SourceFile::new(
        "sort.md",
        "## 3-1 排序一\n排序 alpha\n## 3-2 排序二\n排序 beta\n",
    )];
    let engine = RetrievalEngine::new(
        files,
        Arc::new(NoopEmbedder::new()),
        Arc::new(MemoryVectorStore::new()),
    );
    let results = engine
        .retrieve_weighted(&["排序"], 2, FusionWeights::lexical_only())?
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].contains("alpha"));
    assert!(results[1].contains("beta"));
    Ok(())
}

#[test]
fn test_query_embedding_failure_degrades_to_lexical()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    // Corpus embeds fine, but the query keyword has no vector: the engine
    // must answer lexically instead of erroring.
    let embedder = TableEmbedder::new(vec![
        ("陣列", vec![1.0, 0.0]),
        ("堆疊", vec![0.0, 1.0]),
    ]);
    let engine = RetrievalEngine::new(
        vec![SourceFile::new("ds.md", MATERIAL)],
        Arc::new(embedder),
        Arc::new(MemoryVectorStore::new()),
    );
    let results = engine.retrieve(&["記憶體"], 5)?.unwrap();
    assert!(results[0].contains("連續記憶體"));
    Ok(())
}
