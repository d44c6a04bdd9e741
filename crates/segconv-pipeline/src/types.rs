//! Shared types for the segconv conversion pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contour::ContourTracerKind;
use crate::labels::ColorLabelMap;

/// Re-export `GrayImage` so downstream crates can reference
/// single-channel masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference color masks
/// without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge, or a fraction of the
    /// width once normalized).
    pub x: f64,
    /// Vertical position (pixels from top edge, or a fraction of the
    /// height once normalized).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// The traced pixel boundary of one connected foreground region.
///
/// Coordinates are integer grid positions. The boundary is implicitly
/// closed: the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour(Vec<(u32, u32)>);

impl Contour {
    /// Create a contour from traced pixel positions.
    #[must_use]
    pub const fn new(pixels: Vec<(u32, u32)>) -> Self {
        Self(pixels)
    }

    /// Returns the number of boundary pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the contour has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all boundary pixels.
    #[must_use]
    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.0
    }

    /// Boundary pixels as floating-point [`Point`]s.
    #[must_use]
    pub fn to_points(&self) -> Vec<Point> {
        self.0
            .iter()
            .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions multiplied by `factor`, truncated to whole pixels.
    ///
    /// Used to size the canvas for annotations whose coordinates were
    /// scaled by the same factor.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: (f64::from(self.width) * factor) as u32,
            height: (f64::from(self.height) * factor) as u32,
        }
    }
}

/// Name of the only shape type that is rasterized.
pub const POLYGON_SHAPE_TYPE: &str = "polygon";

fn default_shape_type() -> String {
    POLYGON_SHAPE_TYPE.to_owned()
}

/// One labeled shape inside an [`Annotation`] document.
///
/// Fields this crate does not interpret (`group_id`, `flags`, ...) are
/// kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Class name, e.g. `"mito"`.
    pub label: String,

    /// Ordered `[x, y]` vertices in pixel (or scaled-pixel) space.
    pub points: Vec<[f64; 2]>,

    /// Geometry kind. Only [`POLYGON_SHAPE_TYPE`] is rasterized.
    /// Missing values default to `"polygon"`.
    #[serde(default = "default_shape_type")]
    pub shape_type: String,

    /// Any other fields present on the shape.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Shape {
    /// Returns `true` if this shape is a polygon.
    #[must_use]
    pub fn is_polygon(&self) -> bool {
        self.shape_type == POLYGON_SHAPE_TYPE
    }
}

/// A polygon annotation document: a named collection of [`Shape`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Shapes in document order. Later shapes paint over earlier ones.
    pub shapes: Vec<Shape>,

    /// Any other top-level fields (`version`, `imagePath`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Annotation {
    /// Parse an annotation document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedAnnotation`] if the document is
    /// not valid JSON, lacks a `shapes` array, or any shape lacks its
    /// `label` or `points` field.
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(text).map_err(PipelineError::MalformedAnnotation)
    }

    /// Serialize the document as pretty-printed JSON (2-space indent).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AnnotationEncode`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self).map_err(PipelineError::AnnotationEncode)
    }
}

/// One detected polygon instance within one mask, in normalized
/// `[0, 1]` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPolygonRecord {
    /// Integer class label.
    pub label: u32,
    /// Vertices as fractions of the mask width and height.
    pub points: Vec<Point>,
}

/// A bounding box in normalized center form: `(cx, cy, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    /// Integer class label.
    pub label: u32,
    /// Center x as a fraction of the width.
    pub cx: f64,
    /// Center y as a fraction of the height.
    pub cy: f64,
    /// Box width as a fraction of the width.
    pub w: f64,
    /// Box height as a fraction of the height.
    pub h: f64,
}

/// A bounding box in pixel corner form: `(x1, y1)` top-left to
/// `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Integer class label.
    pub label: u32,
    /// Left edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
    /// Right edge.
    pub x2: f64,
    /// Bottom edge.
    pub y2: f64,
}

/// Channel depth of rasterized masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// 3-channel RGB mask; classes are encoded as colors.
    #[default]
    Color,
    /// Single-channel mask; classes are encoded as gray values.
    Gray,
}

/// How the batch orchestrator pairs images with annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Zip both sorted directory listings, truncating to the shorter one.
    #[default]
    ListingOrder,
    /// Match files whose stems are equal (ignoring a `scaled_` prefix on
    /// annotation files).
    Basename,
}

/// Stroke used by [`rasterize_boxes`](crate::rasterize::rasterize_boxes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxStroke {
    /// Outline color (RGB).
    pub color: [u8; 3],
    /// Outline thickness in pixels, growing inward from the box edge.
    pub thickness: u32,
}

impl Default for BoxStroke {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            thickness: 2,
        }
    }
}

/// Process-wide configuration shared read-only by every component.
///
/// Built once at startup (defaults, a JSON file, or CLI overrides) and
/// passed explicitly into each operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Accepted annotation class names and the integer label each maps
    /// to. Shapes whose label is absent are skipped during rasterization.
    pub classes: BTreeMap<String, u32>,

    /// Raster color (or gray value) for each integer label.
    pub colors: ColorLabelMap,

    /// Channel depth of rasterized masks.
    pub mask_kind: MaskKind,

    /// Coordinate scale factor applied to annotation points; the canvas
    /// is scaled by the same factor.
    pub scale_factor: f64,

    /// Outline style for bounding-box rasterization.
    pub box_stroke: BoxStroke,

    /// Which contour tracing algorithm the vectorizer uses.
    pub contour_tracer: ContourTracerKind,

    /// Simplification tolerance as a fraction of contour perimeter.
    pub simplify_ratio: f64,

    /// Image/annotation pairing policy for batch rasterization.
    pub pairing: PairingPolicy,
}

impl ConversionConfig {
    /// Default coordinate scale factor.
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

    /// Default simplification tolerance ratio (`epsilon = 0.01 * perimeter`).
    pub const DEFAULT_SIMPLIFY_RATIO: f64 = 0.01;

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the scale factor is not
    /// finite and positive, the simplify ratio is outside `[0, 1)`, the
    /// box stroke is zero pixels thick, or an accepted class maps to the
    /// background label `0`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "scale_factor must be finite and positive, got {}",
                self.scale_factor
            )));
        }
        if !(0.0..1.0).contains(&self.simplify_ratio) {
            return Err(PipelineError::InvalidConfig(format!(
                "simplify_ratio must be in [0, 1), got {}",
                self.simplify_ratio
            )));
        }
        if self.box_stroke.thickness == 0 {
            return Err(PipelineError::InvalidConfig(
                "box_stroke.thickness must be at least 1".to_owned(),
            ));
        }
        if let Some((name, _)) = self.classes.iter().find(|&(_, &label)| label == 0) {
            return Err(PipelineError::InvalidConfig(format!(
                "class {name:?} maps to label 0, which is reserved for background"
            )));
        }
        Ok(())
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            classes: ["mito", "ap", "cc"]
                .into_iter()
                .map(|name| (name.to_owned(), 1))
                .collect(),
            colors: ColorLabelMap::default(),
            mask_kind: MaskKind::default(),
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            box_stroke: BoxStroke::default(),
            contour_tracer: ContourTracerKind::default(),
            simplify_ratio: Self::DEFAULT_SIMPLIFY_RATIO,
            pairing: PairingPolicy::default(),
        }
    }
}

/// Errors that can occur in the conversion core.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The annotation JSON is invalid or missing a required field.
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(#[source] serde_json::Error),

    /// The annotation could not be serialized back to JSON.
    #[error("failed to encode annotation: {0}")]
    AnnotationEncode(#[source] serde_json::Error),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
