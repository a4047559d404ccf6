//! Character n-gram tokenizer.

use crate::analysis::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{KyozaiError, Result};

/// A tokenizer that generates overlapping character n-grams.
///
/// N-grams are the workhorse for scripts without explicit word boundaries
/// (Chinese, Japanese, Korean): every substring of length `min_gram` to
/// `max_gram` becomes a token, so a two-character query term still matches
/// inside a longer run of ideographs.
///
/// # Examples
///
/// ```
/// use kyozai::analysis::{NgramTokenizer, Tokenizer};
///
/// let tokenizer = NgramTokenizer::new(2, 2).unwrap();
/// let tokens: Vec<_> = tokenizer.tokenize("hello").unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, vec!["he", "el", "ll", "lo"]);
///
/// // Variable length (1-2) emits unigrams and bigrams interleaved
/// let tokenizer = NgramTokenizer::new(1, 2).unwrap();
/// let tokens: Vec<_> = tokenizer.tokenize("abc").unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, vec!["a", "ab", "b", "bc", "c"]);
/// ```
#[derive(Clone, Debug)]
pub struct NgramTokenizer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
}

impl NgramTokenizer {
    /// Create a new n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram` is 0 or `max_gram` is less than
    /// `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(KyozaiError::analysis(
                "min_gram must be at least 1".to_string(),
            ));
        }
        if max_gram < min_gram {
            return Err(KyozaiError::analysis(format!(
                "max_gram ({}) must be >= min_gram ({})",
                max_gram, min_gram
            )));
        }
        Ok(Self { min_gram, max_gram })
    }

    /// Create a tokenizer emitting both unigrams and bigrams (n=1..2).
    pub fn unigrams_and_bigrams() -> Self {
        Self {
            min_gram: 1,
            max_gram: 2,
        }
    }

    /// Create a bigram tokenizer (n=2).
    pub fn bigram() -> Self {
        Self {
            min_gram: 2,
            max_gram: 2,
        }
    }
}

impl Tokenizer for NgramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut token_position = 0;

        for start in 0..chars.len() {
            for gram_size in self.min_gram..=self.max_gram {
                let end = start + gram_size;
                if end > chars.len() {
                    break;
                }

                let ngram: String = chars[start..end].iter().collect();
                tokens.push(Token::new(ngram, token_position));
                token_position += 1;
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "ngram"
    }
}
