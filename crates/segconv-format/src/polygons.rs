//! Normalized polygon text: one detected instance per line.
//!
//! ```text
//! <label> <x0> <y0> <x1> <y1> ...
//! ```
//!
//! Coordinates are fractions of the image width and height, written with
//! 6 decimal places. Each line is newline-terminated with no trailing
//! space.

use std::fmt::Write;

use segconv_pipeline::{NormalizedPolygonRecord, Point};

use crate::FormatError;

/// Serialize records, one line each.
///
/// # Examples
///
/// ```
/// use segconv_pipeline::{NormalizedPolygonRecord, Point};
/// use segconv_format::to_polygon_text;
///
/// let record = NormalizedPolygonRecord {
///     label: 1,
///     points: vec![Point::new(0.1, 0.1), Point::new(0.4, 0.1), Point::new(0.4, 0.4)],
/// };
/// assert_eq!(
///     to_polygon_text(&[record]),
///     "1 0.100000 0.100000 0.400000 0.100000 0.400000 0.400000\n",
/// );
/// ```
#[must_use]
pub fn to_polygon_text(records: &[NormalizedPolygonRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = write!(out, "{}", record.label);
        for p in &record.points {
            let _ = write!(out, " {:.6} {:.6}", p.x, p.y);
        }
        out.push('\n');
    }
    out
}

/// Parse polygon text.
///
/// Blank lines and lines with fewer than 3 tokens are skipped.
///
/// # Errors
///
/// Returns [`FormatError::InvalidLine`] if a label is not a
/// non-negative integer, a coordinate is not a number, or a line has an
/// odd number of coordinates.
pub fn parse_polygons(text: &str) -> Result<Vec<NormalizedPolygonRecord>, FormatError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let line_no = index + 1;
        let label = parse_label(tokens[0], line_no)?;
        let coords = &tokens[1..];
        if coords.len() % 2 != 0 {
            return Err(FormatError::InvalidLine {
                line: line_no,
                reason: format!("expected x/y pairs, got {} coordinates", coords.len()),
            });
        }
        let points = coords
            .chunks_exact(2)
            .map(|pair| {
                Ok(Point::new(
                    parse_coord(pair[0], line_no)?,
                    parse_coord(pair[1], line_no)?,
                ))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        records.push(NormalizedPolygonRecord { label, points });
    }
    Ok(records)
}

pub(crate) fn parse_label(token: &str, line: usize) -> Result<u32, FormatError> {
    token.parse().map_err(|e| FormatError::InvalidLine {
        line,
        reason: format!("invalid label {token:?}: {e}"),
    })
}

pub(crate) fn parse_coord(token: &str, line: usize) -> Result<f64, FormatError> {
    token.parse().map_err(|e| FormatError::InvalidLine {
        line,
        reason: format!("invalid coordinate {token:?}: {e}"),
    })
}
