//! segconv-format: Pure text-format serializers and parsers (sans-IO)
//!
//! Two line-oriented formats, both with coordinates normalized to the
//! image size:
//!
//! - polygon records: `<label> <x0> <y0> <x1> <y1> ...`
//! - bounding boxes: `<label> <cx> <cy> <w> <h>`

pub mod boxes;
pub mod polygons;

pub use boxes::parse_boxes;
pub use polygons::{parse_polygons, to_polygon_text};

/// Errors raised while parsing a text format.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A line could not be parsed.
    #[error("line {line}: {reason}")]
    InvalidLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}
