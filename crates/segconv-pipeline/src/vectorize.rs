//! Vectorization: recover normalized polygons from a class mask.
//!
//! For every distinct non-background value in the mask (ascending order):
//!
//! 1. Look the value up in the [`ColorLabelMap`]. Unknown values are
//!    logged, recorded in the report, and skipped entirely.
//! 2. Build a binary mask of exactly that value.
//! 3. Trace external contours (holes are ignored).
//! 4. Simplify each contour with `epsilon = ratio * perimeter`; results
//!    with fewer than 3 vertices are degenerate and dropped.
//! 5. Normalize the remaining vertices by the mask width and height.

use crate::contour::ContourTracer;
use crate::labels::MaskValue;
use crate::mask::Mask;
use crate::simplify::{closed_perimeter, simplify_closed};
use crate::transform::normalize;
use crate::types::{ConversionConfig, NormalizedPolygonRecord};

/// Outcome of vectorizing one mask.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorizeReport {
    /// Emitted records, by value discovery order then contour discovery
    /// order.
    pub records: Vec<NormalizedPolygonRecord>,

    /// Non-background values with no label; their regions were excluded.
    pub unknown: Vec<MaskValue>,

    /// Number of contours dropped for simplifying to fewer than 3 vertices.
    pub degenerate: usize,
}

/// Extract normalized polygon records from `mask`.
#[must_use = "returns the vectorization report"]
pub fn vectorize(mask: &Mask, config: &ConversionConfig) -> VectorizeReport {
    let dimensions = mask.dimensions();
    let mut report = VectorizeReport::default();

    for value in mask.distinct_values() {
        let Some(label) = config.colors.label_of(value) else {
            log::warn!("undefined mask color {value}; region skipped");
            report.unknown.push(value);
            continue;
        };

        let binary = mask.binary(value);
        for contour in config.contour_tracer.trace(&binary) {
            let points = contour.to_points();
            let epsilon = config.simplify_ratio * closed_perimeter(&points);
            let polygon = simplify_closed(&points, epsilon);
            if polygon.len() < 3 {
                log::debug!(
                    "dropping degenerate contour for label {label} ({} vertices)",
                    polygon.len()
                );
                report.degenerate += 1;
                continue;
            }
            report.records.push(NormalizedPolygonRecord {
                label,
                points: polygon
                    .into_iter()
                    .map(|p| normalize(p, dimensions))
                    .collect(),
            });
        }
    }

    report
}
