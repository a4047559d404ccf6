//! Maximal-recall tokenizer for mixed-script text.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::Tokenizer;
use crate::analysis::ngram::NgramTokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that emits overlapping multi-granularity tokens.
///
/// Teaching-material text mixes CJK prose with Latin-script terminology, and
/// queries are short keywords, so recall matters more than token economy.
/// This tokenizer handles the two script families differently:
///
/// - Contiguous CJK runs are expanded into every unigram and bigram
///   (overlapping), so a query term matches regardless of how the original
///   text would segment into words.
/// - Everything else is segmented on Unicode word boundaries (UAX #29) and
///   lowercased, keeping identifiers like `BM25` or `stack` whole.
///
/// # Examples
///
/// ```
/// use kyozai::analysis::{MaximalTokenizer, Tokenizer};
///
/// let tokenizer = MaximalTokenizer::new();
/// let tokens: Vec<_> = tokenizer.tokenize("Stack 堆疊")
///     .unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, vec!["stack", "堆", "堆疊", "疊"]);
/// ```
#[derive(Clone, Debug)]
pub struct MaximalTokenizer {
    cjk_ngrams: NgramTokenizer,
}

impl MaximalTokenizer {
    /// Create a new maximal tokenizer.
    pub fn new() -> Self {
        Self {
            cjk_ngrams: NgramTokenizer::unigrams_and_bigrams(),
        }
    }

    /// Check whether a character belongs to a script without word boundaries.
    ///
    /// Covers CJK ideographs (including extension A and compatibility
    /// blocks), Hiragana, Katakana, and Hangul syllables.
    fn is_cjk(ch: char) -> bool {
        matches!(ch,
            '\u{4E00}'..='\u{9FFF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{AC00}'..='\u{D7AF}')
    }

    fn flush_words(pending: &mut String, tokens: &mut Vec<Token>) {
        if pending.is_empty() {
            return;
        }
        for word in pending.unicode_words() {
            tokens.push(Token::new(word.to_lowercase(), tokens.len()));
        }
        pending.clear();
    }

    fn flush_cjk_run(
        &self,
        run: &mut String,
        tokens: &mut Vec<Token>,
    ) -> Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        for token in self.cjk_ngrams.tokenize(run)? {
            tokens.push(Token::new(token.text, tokens.len()));
        }
        run.clear();
        Ok(())
    }
}

impl Default for MaximalTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for MaximalTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut cjk_run = String::new();
        let mut plain = String::new();

        for ch in text.chars() {
            if Self::is_cjk(ch) {
                Self::flush_words(&mut plain, &mut tokens);
                cjk_run.push(ch);
            } else {
                self.flush_cjk_run(&mut cjk_run, &mut tokens)?;
                plain.push(ch);
            }
        }
        self.flush_cjk_run(&mut cjk_run, &mut tokens)?;
        Self::flush_words(&mut plain, &mut tokens);

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "maximal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        MaximalTokenizer::new()
            .tokenize(input)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_cjk_multi_granularity() {
        assert_eq!(texts("陣列"), vec!["陣", "陣列", "列"]);
    }

    #[test]
    fn test_latin_words_kept_whole() {
        assert_eq!(texts("BM25 ranking"), vec!["bm25", "ranking"]);
    }

    #[test]
    fn test_mixed_script() {
        assert_eq!(
            texts("heap 堆疊 push"),
            vec!["heap", "堆", "堆疊", "疊", "push"]
        );
    }

    #[test]
    fn test_punctuation_breaks_cjk_runs() {
        // The comma splits the run, so no bigram spans it.
        assert_eq!(texts("陣列，堆疊"), vec!["陣", "陣列", "列", "堆", "堆疊", "疊"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(texts("").is_empty());
        assert!(texts("  ,;  ").is_empty());
    }

    #[test]
    fn test_positions_sequential_across_segments() {
        let positions: Vec<usize> = MaximalTokenizer::new()
            .tokenize("a 堆")
            .unwrap()
            .map(|t| t.position)
            .collect();
        assert_eq!(positions, vec![0, 1]);
    }
}
