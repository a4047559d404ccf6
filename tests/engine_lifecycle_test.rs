use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use kyozai::engine::RetrievalEngine;
use kyozai::error::Result;
use kyozai::segment::{SourceFile, load_material_dir};
use kyozai::semantic::{Embedder, FileVectorStore, StoredVectors, VectorStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Embedder that counts calls; the vector is the axis of the char count.
struct CountingEmbedder {
    calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        CountingEmbedder {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for CountingEmbedder {
    fn dimension(&self) -> usize {
        4
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0.0; 4];
        v[text.chars().count() % 4] = 1.0;
        Ok(v)
    }
}

const MATERIAL: &str = "\
# 1 資料結構\n\
## 1-1 陣列\n陣列是一種連續記憶體結構\n\
## 1-2 堆疊\n堆疊是一種後進先出結構\n";

fn files() -> Vec<SourceFile> {
    vec![SourceFile::new("ds.md", MATERIAL)]
}

#[test]
fn test_concurrent_first_callers_share_one_build()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let embedder = Arc::new(CountingEmbedder::new());
    let engine = Arc::new(RetrievalEngine::new(
        files(),
        embedder.clone(),
        Arc::new(FileVectorStore::new(dir.path().join("vectors.bin"))),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || engine.ensure_built())
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked")?;
    }

    // Two chunks, each embedded exactly once across all callers.
    assert_eq!(embedder.calls(), 2);
    assert!(engine.semantic_available());
    Ok(())
}

#[test]
fn test_persisted_vectors_survive_engine_restart()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("vectors.bin");

    let first = CountingEmbedder::new();
    RetrievalEngine::new(
        files(),
        Arc::new(first),
        Arc::new(FileVectorStore::new(&store_path)),
    )
    .ensure_built()?;

    // A new engine over the same corpus loads the store without embedding.
    let second = Arc::new(CountingEmbedder::new());
    let engine = RetrievalEngine::new(
        files(),
        second.clone(),
        Arc::new(FileVectorStore::new(&store_path)),
    );
    engine.ensure_built()?;
    assert_eq!(second.calls(), 0);
    assert!(engine.semantic_available());
    Ok(())
}

#[test]
fn test_stale_store_is_re_embedded() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("vectors.bin");

    // Persist vectors under a fingerprint that cannot match the corpus.
    let store = FileVectorStore::new(&store_path);
    store.save(&StoredVectors {
        fingerprint: 0,
        dimension: 4,
        entries: vec![],
    })?;

    let embedder = Arc::new(CountingEmbedder::new());
    let engine = RetrievalEngine::new(files(), embedder.clone(), Arc::new(store));
    engine.ensure_built()?;
    assert_eq!(embedder.calls(), 2);
    Ok(())
}

#[test]
fn test_invalidate_then_rebuild_reuses_current_store()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let embedder = Arc::new(CountingEmbedder::new());
    let engine = RetrievalEngine::new(
        files(),
        embedder.clone(),
        Arc::new(FileVectorStore::new(dir.path().join("vectors.bin"))),
    );

    engine.ensure_built()?;
    assert_eq!(embedder.calls(), 2);

    engine.invalidate();
    assert!(!engine.semantic_available());

    // The corpus is unchanged, so the rebuild loads the persisted vectors.
    engine.ensure_built()?;
    assert_eq!(embedder.calls(), 2);
    assert!(engine.semantic_available());
    Ok(())
}

#[test]
fn test_directory_loader_feeds_engine() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let material_dir = tempfile::tempdir()?;
    fs::write(
        material_dir.path().join("ch1.md"),
        "# 1 資料結構\n## 1-1 陣列\n陣列是一種連續記憶體結構\n",
    )?;
    fs::write(
        material_dir.path().join("ch2.md"),
        "# 2 演算法\n## 2-1 排序\n排序演算法比較元素大小\n",
    )?;

    let store_dir = tempfile::tempdir()?;
    let engine = RetrievalEngine::new(
        load_material_dir(material_dir.path()),
        Arc::new(CountingEmbedder::new()),
        Arc::new(FileVectorStore::new(store_dir.path().join("vectors.bin"))),
    );

    assert!(engine.get_chapter(1).unwrap().contains("陣列"));
    assert!(engine.get_chapter(2).unwrap().contains("排序"));
    assert_eq!(engine.get_chapter(3), None);

    let results = engine.retrieve(&["排序"], 3)?.unwrap();
    assert!(results[0].contains("排序演算法"));
    Ok(())
}

#[test]
fn test_missing_material_dir_yields_empty_engine() {
    let engine = RetrievalEngine::new(
        load_material_dir("/nonexistent/kyozai-material"),
        Arc::new(CountingEmbedder::new()),
        Arc::new(kyozai::semantic::MemoryVectorStore::new()),
    );
    assert_eq!(engine.get_unit(1, 1), None);
    assert_eq!(engine.retrieve(&["陣列"], 5).unwrap(), None);
}
