//! Raster masks: canvases where pixel value encodes class membership.
//!
//! A mask is either 3-channel color or single-channel gray. Background is
//! always zero. Pixels hold exactly one class value each; there is no
//! blending at region boundaries.

use std::collections::BTreeSet;

use image::{GrayImage, Luma, RgbImage};

use crate::labels::MaskValue;
use crate::types::{Dimensions, MaskKind};

/// Value written to foreground pixels of a binary mask.
pub const FOREGROUND: u8 = 255;

/// A class-valued raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mask {
    /// RGB mask; each class has a color.
    Color(RgbImage),
    /// Single-channel mask; each class has a gray value.
    Gray(GrayImage),
}

impl Mask {
    /// Allocate an all-background canvas.
    #[must_use]
    pub fn blank(kind: MaskKind, dimensions: Dimensions) -> Self {
        match kind {
            MaskKind::Color => Self::Color(RgbImage::new(dimensions.width, dimensions.height)),
            MaskKind::Gray => Self::Gray(GrayImage::new(dimensions.width, dimensions.height)),
        }
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            Self::Color(img) => img.dimensions(),
            Self::Gray(img) => img.dimensions(),
        };
        Dimensions { width, height }
    }

    /// Channel depth of this mask.
    #[must_use]
    pub const fn kind(&self) -> MaskKind {
        match self {
            Self::Color(_) => MaskKind::Color,
            Self::Gray(_) => MaskKind::Gray,
        }
    }

    /// Value of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds, like [`image::ImageBuffer::get_pixel`].
    #[must_use]
    pub fn value_at(&self, x: u32, y: u32) -> MaskValue {
        match self {
            Self::Color(img) => MaskValue::Rgb(img.get_pixel(x, y).0),
            Self::Gray(img) => MaskValue::Gray(img.get_pixel(x, y).0[0]),
        }
    }

    /// Every distinct non-background value, in ascending order.
    #[must_use]
    pub fn distinct_values(&self) -> Vec<MaskValue> {
        let values: BTreeSet<MaskValue> = match self {
            Self::Color(img) => img.pixels().map(|p| MaskValue::Rgb(p.0)).collect(),
            Self::Gray(img) => img.pixels().map(|p| MaskValue::Gray(p.0[0])).collect(),
        };
        values.into_iter().filter(|v| !v.is_background()).collect()
    }

    /// Binary mask: [`FOREGROUND`] where the pixel equals `value` exactly
    /// (per channel for color masks), 0 elsewhere.
    ///
    /// A value of the other channel depth matches nothing.
    #[must_use]
    pub fn binary(&self, value: MaskValue) -> GrayImage {
        let hit = |matches: bool| Luma([if matches { FOREGROUND } else { 0 }]);
        match (self, value) {
            (Self::Color(img), MaskValue::Rgb(color)) => {
                GrayImage::from_fn(img.width(), img.height(), |x, y| {
                    hit(img.get_pixel(x, y).0 == color)
                })
            }
            (Self::Gray(img), MaskValue::Gray(v)) => {
                GrayImage::from_fn(img.width(), img.height(), |x, y| {
                    hit(img.get_pixel(x, y).0[0] == v)
                })
            }
            (Self::Color(img), MaskValue::Gray(_)) => GrayImage::new(img.width(), img.height()),
            (Self::Gray(img), MaskValue::Rgb(_)) => GrayImage::new(img.width(), img.height()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn blank_mask_has_requested_size_and_kind() {
        let mask = Mask::blank(MaskKind::Gray, Dimensions::new(7, 3));
        assert_eq!(mask.dimensions(), Dimensions::new(7, 3));
        assert_eq!(mask.kind(), MaskKind::Gray);
        assert!(mask.distinct_values().is_empty());
    }

    #[test]
    fn distinct_values_skip_background_and_sort() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        img.put_pixel(2, 0, Rgb([255, 0, 0]));
        let mask = Mask::Color(img);
        assert_eq!(
            mask.distinct_values(),
            vec![MaskValue::Rgb([0, 0, 255]), MaskValue::Rgb([255, 0, 0])]
        );
    }

    #[test]
    fn binary_is_exact_match_not_nearest() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([254, 0, 0]));
        let binary = Mask::Color(img).binary(MaskValue::Rgb([255, 0, 0]));
        assert_eq!(binary.as_raw(), &vec![255, 0, 0]);
    }

    #[test]
    fn gray_binary_selects_one_value() {
        let img = GrayImage::from_raw(4, 1, vec![0, 1, 2, 1]).unwrap();
        let binary = Mask::Gray(img).binary(MaskValue::Gray(1));
        assert_eq!(binary.as_raw(), &vec![0, 255, 0, 255]);
    }

    #[test]
    fn mismatched_depth_matches_nothing() {
        let img = GrayImage::from_pixel(2, 2, Luma([5]));
        let binary = Mask::Gray(img).binary(MaskValue::Rgb([5, 5, 5]));
        assert!(binary.pixels().all(|p| p.0[0] == 0));
    }
}
