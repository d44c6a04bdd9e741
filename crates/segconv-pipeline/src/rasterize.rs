//! Rasterization: paint polygons (or box outlines) onto a blank mask.
//!
//! Vertices are clipped to a one-pixel band around the canvas, truncated
//! to integer pixels and filled with the color the [`ColorLabelMap`]
//! assigns to the shape's class. Shapes are painted in order, so later
//! shapes overwrite earlier ones where they overlap.

use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect;

use crate::labels::ColorLabelMap;
use crate::mask::Mask;
use crate::transform::{to_canvas, to_pixel};
use crate::types::{
    Annotation, BoxStroke, ConversionConfig, Dimensions, NormalizedPolygonRecord, PixelBox, Point,
};

/// Rasterize the accepted polygon shapes of `annotation` onto a canvas of
/// the given size.
///
/// Non-polygon shapes and shapes whose label is not one of
/// `config.classes` are skipped silently; that is ordinary filtering.
/// A class with no color in `config.colors` is logged and skipped.
#[must_use = "returns the rasterized mask"]
pub fn rasterize(
    annotation: &Annotation,
    dimensions: Dimensions,
    config: &ConversionConfig,
) -> Mask {
    let mut mask = Mask::blank(config.mask_kind, dimensions);
    let mut painted = 0_usize;

    for shape in &annotation.shapes {
        if !shape.is_polygon() {
            log::debug!("skipping {} shape {:?}", shape.shape_type, shape.label);
            continue;
        }
        let Some(&label) = config.classes.get(&shape.label) else {
            log::debug!("skipping shape with unaccepted label {:?}", shape.label);
            continue;
        };
        let vertices: Vec<Point> = shape.points.iter().map(|&[x, y]| Point::new(x, y)).collect();
        if fill_polygon(&mut mask, &vertices, label, &config.colors) {
            painted += 1;
        }
    }

    log::debug!(
        "painted {painted} of {} shapes onto {}x{} canvas",
        annotation.shapes.len(),
        dimensions.width,
        dimensions.height
    );
    mask
}

/// Rasterize normalized polygon records onto a canvas of the given size.
///
/// Each vertex is denormalized (multiplied by the canvas size, then
/// truncated). Records whose label has no color are logged and skipped;
/// they are never painted with a fallback color.
#[must_use = "returns the rasterized mask"]
pub fn rasterize_records(
    records: &[NormalizedPolygonRecord],
    dimensions: Dimensions,
    config: &ConversionConfig,
) -> Mask {
    let mut mask = Mask::blank(config.mask_kind, dimensions);
    let mut painted = 0_usize;

    for record in records {
        let vertices: Vec<Point> = record
            .points
            .iter()
            .map(|&p| to_canvas(p, dimensions))
            .collect();
        if fill_polygon(&mut mask, &vertices, record.label, &config.colors) {
            painted += 1;
        }
    }

    log::debug!("painted {painted} of {} records", records.len());
    mask
}

/// Draw axis-aligned box outlines (not filled interiors).
///
/// Corners are truncated to integer pixels. The outline is
/// `stroke.thickness` pixels wide, growing inward from the box edge; a
/// stroke wider than half the box fills it. Only the part of each
/// outline that lands on the canvas is drawn.
#[must_use = "returns the rasterized mask"]
pub fn rasterize_boxes(boxes: &[PixelBox], dimensions: Dimensions, stroke: BoxStroke) -> Mask {
    let mut canvas = RgbImage::new(dimensions.width, dimensions.height);
    let color = Rgb(stroke.color);
    let t = i64::from(stroke.thickness);

    for b in boxes {
        let top_left = to_pixel(b.x1, b.y1);
        let bottom_right = to_pixel(b.x2, b.y2);
        let (left, right) = (
            i64::from(top_left.x.min(bottom_right.x)),
            i64::from(top_left.x.max(bottom_right.x)),
        );
        let (top, bottom) = (
            i64::from(top_left.y.min(bottom_right.y)),
            i64::from(top_left.y.max(bottom_right.y)),
        );

        // One band per side; together they cover every pixel of the box
        // within `t` of its edge.
        fill_on_canvas(&mut canvas, [left, top, right, (top + t - 1).min(bottom)], color);
        fill_on_canvas(&mut canvas, [left, (bottom - t + 1).max(top), right, bottom], color);
        fill_on_canvas(&mut canvas, [left, top, (left + t - 1).min(right), bottom], color);
        fill_on_canvas(&mut canvas, [(right - t + 1).max(left), top, right, bottom], color);
    }

    Mask::Color(canvas)
}

/// Fill the inclusive pixel rectangle `[left, top, right, bottom]`,
/// cropped to the canvas.
fn fill_on_canvas(canvas: &mut RgbImage, [left, top, right, bottom]: [i64; 4], color: Rgb<u8>) {
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = right.min(i64::from(canvas.width()) - 1);
    let y1 = bottom.min(i64::from(canvas.height()) - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }
    let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
        i32::try_from(x0),
        i32::try_from(y0),
        u32::try_from(x1 - x0 + 1),
        u32::try_from(y1 - y0 + 1),
    ) else {
        return;
    };
    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(width, height), color);
}

/// Fill one polygon with the value for `label`.
///
/// Returns `false` if nothing was painted: the polygon has fewer than 3
/// distinct vertices once clipped, or the label has no color at this
/// mask's depth.
fn fill_polygon(mask: &mut Mask, vertices: &[Point], label: u32, colors: &ColorLabelMap) -> bool {
    let pixels: Vec<PixelPoint<i32>> = clip_to_canvas(vertices, mask.dimensions())
        .into_iter()
        .map(|p| to_pixel(p.x, p.y))
        .collect();
    let ring = dedup_ring(&pixels);
    if ring.len() < 3 {
        log::debug!("skipping degenerate polygon with {} vertices", ring.len());
        return false;
    }

    match mask {
        Mask::Color(img) => {
            let Some(color) = colors.color_of(label) else {
                log::warn!("no color is configured for label {label}; polygon skipped");
                return false;
            };
            draw_polygon_mut(img, &ring, Rgb(color));
        }
        Mask::Gray(img) => {
            let Some(value) = colors.gray_of(label) else {
                log::warn!("no gray value is configured for label {label}; polygon skipped");
                return false;
            };
            draw_polygon_mut(img, &ring, Luma([value]));
        }
    }
    true
}

/// Clip a polygon to the canvas grown by one pixel on every side
/// (Sutherland-Hodgman against each of the four window edges).
///
/// The filled area inside the canvas is unchanged, and the vertices
/// handed to the fill stay small enough for `i32` edge arithmetic however
/// far outside the canvas the input reaches.
fn clip_to_canvas(vertices: &[Point], dimensions: Dimensions) -> Vec<Point> {
    let (x_min, y_min) = (-1.0, -1.0);
    let x_max = f64::from(dimensions.width) + 1.0;
    let y_max = f64::from(dimensions.height) + 1.0;

    let mut ring = vertices.to_vec();
    ring = clip_edge(&ring, |p| p.x >= x_min, |a, b| cross_x(a, b, x_min));
    ring = clip_edge(&ring, |p| p.x <= x_max, |a, b| cross_x(a, b, x_max));
    ring = clip_edge(&ring, |p| p.y >= y_min, |a, b| cross_y(a, b, y_min));
    clip_edge(&ring, |p| p.y <= y_max, |a, b| cross_y(a, b, y_max))
}

fn clip_edge(
    ring: &[Point],
    inside: impl Fn(Point) -> bool,
    cross: impl Fn(Point, Point) -> Point,
) -> Vec<Point> {
    let Some(&last) = ring.last() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(ring.len() + 2);
    let mut prev = last;
    for &cur in ring {
        match (inside(prev), inside(cur)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(cross(prev, cur)),
            (false, true) => {
                out.push(cross(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
        prev = cur;
    }
    out
}

/// Point where segment `a`-`b` crosses the vertical line at `x`.
fn cross_x(a: Point, b: Point, x: f64) -> Point {
    let t = (x - a.x) / (b.x - a.x);
    Point::new(x, (b.y - a.y).mul_add(t, a.y))
}

/// Point where segment `a`-`b` crosses the horizontal line at `y`.
fn cross_y(a: Point, b: Point, y: f64) -> Point {
    let t = (y - a.y) / (b.y - a.y);
    Point::new((b.x - a.x).mul_add(t, a.x), y)
}

/// Drop consecutive duplicate vertices and a closing vertex equal to the
/// first; the polygon fill closes the ring itself.
fn dedup_ring(vertices: &[PixelPoint<i32>]) -> Vec<PixelPoint<i32>> {
    let mut ring: Vec<PixelPoint<i32>> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if ring.last() != Some(&v) {
            ring.push(v);
        }
    }
    while ring.len() > 1 && ring.last() == ring.first() {
        ring.pop();
    }
    ring
}
