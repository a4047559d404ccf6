//! Lexical (term-statistics) index module.

pub mod index;

pub use index::{Bm25Params, LexicalIndex};
