//! segconv-pipeline: Pure polygon/mask conversion core (sans-IO).
//!
//! Two independent directions share one [`ColorLabelMap`]:
//!
//! - annotation JSON -> coordinate transform -> rasterizer -> mask
//! - mask -> per-class binary masks -> contour tracing ->
//!   simplification -> normalized polygon records
//!
//! This crate has **no filesystem dependencies** -- it operates on
//! in-memory text and images. Directory handling and image decode/encode
//! live in `segconv-io`.

pub mod contour;
pub mod labels;
pub mod mask;
pub mod rasterize;
pub mod simplify;
pub mod transform;
pub mod types;
pub mod vectorize;

pub use contour::{ContourTracer, ContourTracerKind};
pub use labels::{ColorLabelMap, MaskValue};
pub use mask::Mask;
pub use rasterize::{rasterize, rasterize_boxes, rasterize_records};
pub use transform::{box_to_pixels, scale_annotation};
pub use types::{
    Annotation, BoxStroke, ConversionConfig, Dimensions, MaskKind, NormalizedBox,
    NormalizedPolygonRecord, PairingPolicy, PipelineError, PixelBox, Point, Shape,
};
pub use vectorize::{VectorizeReport, vectorize};

/// Result of converting one annotation document into a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskResult {
    /// The annotation after coordinate scaling.
    pub annotation: Annotation,

    /// The rasterized mask, sized to the scaled source dimensions.
    pub mask: Mask,
}

/// Convert annotation JSON into a mask for a source image of the given
/// size.
///
/// # Steps
///
/// 1. Parse the annotation document
/// 2. Scale every vertex by `config.scale_factor`
/// 3. Rasterize onto a canvas of `source * scale_factor` pixels
///
/// # Errors
///
/// Returns [`PipelineError::MalformedAnnotation`] if the JSON is invalid
/// or a shape lacks `label` or `points`.
pub fn annotation_to_mask(
    json: &str,
    source: Dimensions,
    config: &ConversionConfig,
) -> Result<MaskResult, PipelineError> {
    let annotation = Annotation::from_json(json)?;
    let scaled = scale_annotation(&annotation, config.scale_factor);
    let mask = rasterize(&scaled, source.scaled(config.scale_factor), config);
    Ok(MaskResult {
        annotation: scaled,
        mask,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "imagePath": "cell.tif",
        "shapes": [
            {"label": "mito", "shape_type": "polygon",
             "points": [[1.0, 1.0], [4.5, 1.0], [4.5, 4.5], [1.0, 4.5]]}
        ]
    }"#;

    #[test]
    fn annotation_to_mask_scales_points_and_canvas() {
        let config = ConversionConfig {
            scale_factor: 10.0,
            ..ConversionConfig::default()
        };
        let result = annotation_to_mask(SQUARE, Dimensions::new(8, 6), &config).unwrap();
        assert_eq!(result.mask.dimensions(), Dimensions::new(80, 60));
        assert_eq!(result.annotation.shapes[0].points[1], [45.0, 10.0]);
        assert_eq!(result.annotation.extra["imagePath"], "cell.tif");
        assert_eq!(result.mask.value_at(45, 45), MaskValue::Rgb([255, 0, 0]));
        assert!(result.mask.value_at(46, 45).is_background());
    }

    #[test]
    fn annotation_to_mask_rejects_malformed_json() {
        let result = annotation_to_mask(
            r#"{"shapes": [{"label": "mito"}]}"#,
            Dimensions::new(8, 8),
            &ConversionConfig::default(),
        );
        assert!(matches!(result, Err(PipelineError::MalformedAnnotation(_))));
    }

    #[test]
    fn mask_round_trips_to_single_record() {
        let config = ConversionConfig::default();
        let result = annotation_to_mask(SQUARE, Dimensions::new(10, 10), &config).unwrap();
        let report = vectorize(&result.mask, &config);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].label, 1);
    }
}
