//! Contour tracing: extract outer region boundaries from a binary mask.
//!
//! This module defines the [`ContourTracer`] trait for pluggable contour
//! tracing algorithms and the [`ContourTracerKind`] enum for selecting
//! which algorithm to use from configuration.
//!
//! Only external boundaries are kept. Holes, and regions nested inside
//! holes, produce no contours.

use image::GrayImage;
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};

use crate::types::Contour;

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`,
    /// keeping top-level outer borders only.
    #[default]
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (non-zero pixels = foreground).
/// Output: one contour per disjoint foreground region, in discovery
/// (raster scan) order.
pub trait ContourTracer {
    /// Trace external contours in the given binary mask.
    fn trace(&self, binary: &GrayImage) -> Vec<Contour>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, binary: &GrayImage) -> Vec<Contour> {
        match *self {
            Self::BorderFollowing => trace_external_borders(binary),
        }
    }
}

/// Suzuki-Abe border following, filtered to borders whose parent is the
/// image frame.
fn trace_external_borders(binary: &GrayImage) -> Vec<Contour> {
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(binary);

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(c.points.into_iter().map(|p| (p.x, p.y)).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(img: &mut GrayImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>, v: u8) {
        for y in ys {
            for x in xs.clone() {
                img.put_pixel(x, y, image::Luma([v]));
            }
        }
    }

    #[test]
    fn default_is_border_following() {
        assert_eq!(
            ContourTracerKind::default(),
            ContourTracerKind::BorderFollowing
        );
    }

    #[test]
    fn empty_image_produces_no_contours() {
        let img = GrayImage::new(10, 10);
        let result = ContourTracerKind::BorderFollowing.trace(&img);
        assert!(result.is_empty());
    }

    #[test]
    fn rectangle_produces_one_contour_on_its_border() {
        let mut img = GrayImage::new(20, 20);
        fill(&mut img, 5..15, 5..15, 255);
        let result = ContourTracerKind::BorderFollowing.trace(&img);
        assert_eq!(result.len(), 1);
        let contour = &result[0];
        assert!(contour.len() >= 4);
        for &(x, y) in contour.pixels() {
            assert!(x == 5 || x == 14 || y == 5 || y == 14, "({x}, {y}) not on border");
        }
    }

    #[test]
    fn hole_is_ignored() {
        // A ring: the inner boundary must not be reported.
        let mut img = GrayImage::new(20, 20);
        fill(&mut img, 2..18, 2..18, 255);
        fill(&mut img, 6..14, 6..14, 0);
        let result = ContourTracerKind::BorderFollowing.trace(&img);
        assert_eq!(result.len(), 1);
        assert!(result[0].pixels().contains(&(2, 2)));
    }

    #[test]
    fn island_inside_hole_is_ignored() {
        let mut img = GrayImage::new(30, 30);
        fill(&mut img, 2..28, 2..28, 255);
        fill(&mut img, 6..24, 6..24, 0);
        fill(&mut img, 12..18, 12..18, 255);
        let result = ContourTracerKind::BorderFollowing.trace(&img);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn disjoint_regions_produce_separate_contours() {
        let mut img = GrayImage::new(30, 10);
        fill(&mut img, 1..6, 1..6, 255);
        fill(&mut img, 20..25, 2..8, 255);
        let result = ContourTracerKind::BorderFollowing.trace(&img);
        assert_eq!(result.len(), 2);
        // Raster-scan discovery: the region whose top row is higher comes first.
        assert!(result[0].pixels().contains(&(1, 1)));
        assert!(result[1].pixels().contains(&(20, 2)));
    }
}
