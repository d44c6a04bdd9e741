//! Normalized bounding-box text: one box per line.
//!
//! ```text
//! <label> <cx> <cy> <w> <h>
//! ```
//!
//! All four numbers are fractions of the image size, in center form.

use segconv_pipeline::NormalizedBox;

use crate::FormatError;
use crate::polygons::{parse_coord, parse_label};

/// Parse bounding-box text. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`FormatError::InvalidLine`] if a line does not hold exactly a
/// label and four numbers.
pub fn parse_boxes(text: &str) -> Result<Vec<NormalizedBox>, FormatError> {
    let mut boxes = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let [label, cx, cy, w, h] = tokens[..] else {
            return Err(FormatError::InvalidLine {
                line: line_no,
                reason: format!("expected 5 fields, got {}", tokens.len()),
            });
        };
        boxes.push(NormalizedBox {
            label: parse_label(label, line_no)?,
            cx: parse_coord(cx, line_no)?,
            cy: parse_coord(cy, line_no)?,
            w: parse_coord(w, line_no)?,
            h: parse_coord(h, line_no)?,
        });
    }
    Ok(boxes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_center_form_boxes() {
        let boxes = parse_boxes("0 0.5 0.5 0.2 0.4\n\n7 0.1 0.2 0.05 0.05\n").unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].label, 0);
        assert!((boxes[0].h - 0.4).abs() < 1e-12);
        assert_eq!(boxes[1].label, 7);
    }

    #[test]
    fn rejects_polygon_rows() {
        let err = parse_boxes("1 0.1 0.1 0.2 0.2 0.3 0.3\n").unwrap_err();
        assert!(matches!(err, FormatError::InvalidLine { line: 1, .. }));
    }

    #[test]
    fn rejects_short_rows() {
        assert!(parse_boxes("1 0.1 0.1\n").is_err());
    }
}
