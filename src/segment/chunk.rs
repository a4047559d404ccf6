//! Chunk and unit-code types.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref LEADING_INT: Regex = Regex::new(r"^(\d+)").unwrap();
}

/// A minimal unit of indexed text plus its structural metadata.
///
/// Chunks are created once by the segmenter and immutable thereafter. The
/// `content` field is never empty; the header fields are `None` when the
/// source text carried no enclosing header at that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Body text, with the nearest paragraph header prepended when present.
    pub content: String,
    /// Nearest enclosing chapter header text.
    pub chapter: Option<String>,
    /// Nearest enclosing unit header text (e.g. `"1-2 陣列與鏈結串列"`).
    pub unit: Option<String>,
    /// Nearest enclosing paragraph header text.
    pub paragraph: Option<String>,
    /// Source file the chunk was segmented from.
    pub source: String,
}

impl Chunk {
    /// Parse the numeric sort key from this chunk's unit header.
    ///
    /// Returns `None` when the chunk has no unit header at all; an
    /// unparsable header yields the minimum code `(0, 0)` rather than an
    /// error.
    pub fn unit_code(&self) -> Option<UnitCode> {
        self.unit.as_deref().map(UnitCode::parse)
    }
}

/// Numeric identity of a unit within a chapter, used for grouping and as a
/// well-defined sort key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitCode {
    /// Chapter number.
    pub chapter: u32,
    /// Unit number within the chapter.
    pub unit: u32,
}

impl UnitCode {
    /// Create a unit code from explicit components.
    pub fn new(chapter: u32, unit: u32) -> Self {
        UnitCode { chapter, unit }
    }

    /// Extract the leading `"<int>-<int>"` sort key from a unit header.
    ///
    /// Only the first two dash-separated components are considered; each
    /// component contributes its leading digits. A component with no leading
    /// digits defaults to 0, so this never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use kyozai::segment::UnitCode;
    ///
    /// assert_eq!(UnitCode::parse("1-2 陣列與鏈結串列"), UnitCode::new(1, 2));
    /// assert_eq!(UnitCode::parse("1-1-1"), UnitCode::new(1, 1));
    /// assert_eq!(UnitCode::parse("緒論"), UnitCode::new(0, 0));
    /// ```
    pub fn parse(header: &str) -> Self {
        let mut parts = header.trim().split('-');
        let chapter = Self::leading_int(parts.next());
        let unit = Self::leading_int(parts.next());
        UnitCode { chapter, unit }
    }

    /// The visible section marker used when assembling unit text.
    pub fn marker(&self) -> String {
        format!("=== {}-{} ===", self.chapter, self.unit)
    }

    fn leading_int(part: Option<&str>) -> u32 {
        part.and_then(|p| LEADING_INT.captures(p.trim_start()))
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0)
    }
}
