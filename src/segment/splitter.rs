//! Header-driven segmentation of teaching-material files.

use crate::segment::chunk::Chunk;
use crate::segment::loader::SourceFile;

/// Splits material files on a four-level header markup into chunks.
///
/// The markup uses markdown-style headers: `#` chapter, `##` unit, `###`
/// paragraph, `####` sub-paragraph. Each body block is bound to its nearest
/// enclosing headers; sub-paragraph headers split blocks but are not stored
/// on the chunk. The nearest paragraph header is prepended to the chunk
/// content so that header vocabulary participates in lexical matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSplitter;

impl HeaderSplitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        HeaderSplitter
    }

    /// Segment one source file into chunks, in document order.
    pub fn split(&self, file: &SourceFile) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chapter: Option<String> = None;
        let mut unit: Option<String> = None;
        let mut paragraph: Option<String> = None;
        let mut body = String::new();
        let mut in_code_fence = false;

        let mut flush = |chapter: &Option<String>,
                         unit: &Option<String>,
                         paragraph: &Option<String>,
                         body: &mut String| {
            let text = body.trim();
            if !text.is_empty() {
                let content = match paragraph {
                    Some(header) => format!("{header}\n{text}"),
                    None => text.to_string(),
                };
                chunks.push(Chunk {
                    content,
                    chapter: chapter.clone(),
                    unit: unit.clone(),
                    paragraph: paragraph.clone(),
                    source: file.path.clone(),
                });
            }
            body.clear();
        };

        for line in file.content.lines() {
            if line.trim_start().starts_with("```") {
                in_code_fence = !in_code_fence;
                body.push_str(line);
                body.push('\n');
                continue;
            }
            if in_code_fence {
                body.push_str(line);
                body.push('\n');
                continue;
            }

            match Self::parse_header(line) {
                Some((1, text)) => {
                    flush(&chapter, &unit, &paragraph, &mut body);
                    chapter = Some(text);
                    unit = None;
                    paragraph = None;
                }
                Some((2, text)) => {
                    flush(&chapter, &unit, &paragraph, &mut body);
                    unit = Some(text);
                    paragraph = None;
                }
                Some((3, text)) => {
                    flush(&chapter, &unit, &paragraph, &mut body);
                    paragraph = Some(text);
                }
                Some((4, _)) => {
                    // Sub-paragraph: splits the block, metadata unchanged.
                    flush(&chapter, &unit, &paragraph, &mut body);
                }
                _ => {
                    body.push_str(line);
                    body.push('\n');
                }
            }
        }
        flush(&chapter, &unit, &paragraph, &mut body);

        chunks
    }

    /// Recognize a header line, returning its level (1-4) and title text.
    ///
    /// A header is 1-4 `#` characters followed by whitespace (or nothing).
    /// Deeper nesting and `#text` without a space are treated as body text.
    fn parse_header(line: &str) -> Option<(usize, String)> {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        if level == 0 || level > 4 {
            return None;
        }
        let rest = &trimmed[level..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        Some((level, rest.trim().to_string()))
    }
}
