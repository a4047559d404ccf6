//! Text analysis module for Kyozai.
//!
//! Provides the tokenization layer used by the lexical index. The corpus is
//! teaching-material text without reliable word boundaries (mixed CJK and
//! Latin script), so the default [`MaximalTokenizer`] emits overlapping
//! multi-granularity tokens to maximize recall for short queries.

pub mod maximal;
pub mod ngram;
pub mod token;

pub use maximal::MaximalTokenizer;
pub use ngram::NgramTokenizer;
pub use token::{Token, TokenStream};

use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
