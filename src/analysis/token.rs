//! Token types for text analysis.

/// A token is a single unit of text after tokenization.
///
/// # Examples
///
/// ```
/// use kyozai::analysis::Token;
///
/// let token = Token::new("hello", 0);
/// assert_eq!(token.text, "hello");
/// assert_eq!(token.position, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The text content of the token.
    pub text: String,
    /// Position of the token in the stream (0-based).
    pub position: usize,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }
}

/// A stream of tokens produced by a tokenizer.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
