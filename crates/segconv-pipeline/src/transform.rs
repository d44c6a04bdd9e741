//! Coordinate transforms between pixel, scaled-pixel and normalized space.
//!
//! Scaling multiplies annotation vertices without rounding; rounding is
//! left to the rasterizer. Normalization divides by the mask dimensions,
//! and denormalization multiplies back and truncates to pixel indices, so
//! a round trip is exact only up to one pixel per axis.

use imageproc::point::Point as PixelPoint;

use crate::types::{Annotation, Dimensions, NormalizedBox, PixelBox, Point};

/// Return a copy of `annotation` with every vertex multiplied by `factor`.
///
/// Shape order, labels, shape types and all other fields are preserved.
#[must_use = "returns the scaled annotation"]
pub fn scale_annotation(annotation: &Annotation, factor: f64) -> Annotation {
    let mut scaled = annotation.clone();
    for shape in &mut scaled.shapes {
        for [x, y] in &mut shape.points {
            *x *= factor;
            *y *= factor;
        }
    }
    scaled
}

/// Map a pixel coordinate into `[0, 1]` space.
#[must_use]
pub fn normalize(point: Point, dimensions: Dimensions) -> Point {
    Point::new(
        point.x / f64::from(dimensions.width),
        point.y / f64::from(dimensions.height),
    )
}

/// Map a normalized coordinate back onto the canvas, without truncating.
#[must_use]
pub fn to_canvas(point: Point, dimensions: Dimensions) -> Point {
    Point::new(
        point.x * f64::from(dimensions.width),
        point.y * f64::from(dimensions.height),
    )
}

/// Map a normalized coordinate back to integer pixel indices
/// (multiplication, then truncation toward zero).
#[must_use]
pub fn denormalize(point: Point, dimensions: Dimensions) -> PixelPoint<i32> {
    let p = to_canvas(point, dimensions);
    to_pixel(p.x, p.y)
}

/// Truncate a floating-point pixel coordinate to integer pixel indices.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_pixel(x: f64, y: f64) -> PixelPoint<i32> {
    PixelPoint::new(x as i32, y as i32)
}

/// Convert a normalized center-form box to pixel corners.
#[must_use]
pub fn box_to_pixels(b: NormalizedBox, dimensions: Dimensions) -> PixelBox {
    let width = f64::from(dimensions.width);
    let height = f64::from(dimensions.height);
    PixelBox {
        label: b.label,
        x1: (b.cx - b.w / 2.0) * width,
        y1: (b.cy - b.h / 2.0) * height,
        x2: (b.cx + b.w / 2.0) * width,
        y2: (b.cy + b.h / 2.0) * height,
    }
}
