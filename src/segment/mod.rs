//! Document segmentation module.
//!
//! Parses raw material files into metadata-tagged [`Chunk`]s and assembles
//! them into a [`Corpus`], the ordered chunk sequence the two indices are
//! built over. Also provides direct unit/chapter text retrieval for the
//! content-delivery side of the system.

pub mod chunk;
pub mod corpus;
pub mod loader;
pub mod splitter;

pub use chunk::{Chunk, UnitCode};
pub use corpus::Corpus;
pub use loader::{SourceFile, load_material_dir};
pub use splitter::HeaderSplitter;
