//! Material file loading.
//!
//! File discovery and reading are owned by the surrounding system; the
//! engine itself consumes in-memory `(path, content)` pairs. The directory
//! loader here is a convenience for the common layout: a flat directory of
//! UTF-8 `.md` material files.

use std::fs;
use std::path::Path;

use tracing::warn;

/// One teaching-material file: a path label and its UTF-8 content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path label recorded on every chunk segmented from this file.
    pub path: String,
    /// Raw file content.
    pub content: String,
}

impl SourceFile {
    /// Create a source file from a path label and content.
    pub fn new<P: Into<String>, C: Into<String>>(path: P, content: C) -> Self {
        SourceFile {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Load every `.md` file in a directory, in sorted filename order.
///
/// Unreadable entries are skipped with a warning; a missing or empty
/// directory yields an empty file set, not an error.
pub fn load_material_dir<P: AsRef<Path>>(dir: P) -> Vec<SourceFile> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "material directory unreadable, using empty corpus");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(content) => {
                files.push(SourceFile::new(path.display().to_string(), content));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable material file");
            }
        }
    }
    files
}
