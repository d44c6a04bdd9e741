//! Image decode/encode for source images and masks.

use std::collections::BTreeSet;
use std::path::Path;

use image::{ColorType, DynamicImage, GrayImage};
use segconv_pipeline::{Dimensions, Mask};

use crate::error::IoError;

/// Read an image's pixel dimensions.
///
/// The whole image is decoded, so a file with a valid header but a
/// truncated or corrupt body is rejected here rather than producing a
/// mask for a broken source.
///
/// # Errors
///
/// Returns [`IoError::ImageDecode`] if the file cannot be opened or
/// decoded.
pub fn read_dimensions(path: &Path) -> Result<Dimensions, IoError> {
    let img = decode(path)?;
    Ok(Dimensions::new(img.width(), img.height()))
}

/// Load a mask image.
///
/// Images with color channels become 8-bit RGB masks (alpha is dropped).
/// Single-channel images become gray masks holding their raw values:
/// 16-bit gray is narrowed by value, not rescaled, and any value above
/// 255 is logged and left as background since it cannot be represented.
///
/// # Errors
///
/// Returns [`IoError::ImageDecode`] if the file cannot be decoded.
pub fn load_mask(path: &Path) -> Result<Mask, IoError> {
    let img = decode(path)?;
    Ok(match img.color() {
        ColorType::L16 | ColorType::La16 => Mask::Gray(narrow_gray16(&img, path)),
        color if color.has_color() => Mask::Color(img.to_rgb8()),
        _ => Mask::Gray(img.to_luma8()),
    })
}

fn decode(path: &Path) -> Result<DynamicImage, IoError> {
    image::open(path).map_err(|source| IoError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Keep 16-bit gray labels by value.
fn narrow_gray16(img: &DynamicImage, path: &Path) -> GrayImage {
    let wide = img.to_luma16();
    let mut dropped = BTreeSet::new();
    let narrow = GrayImage::from_fn(wide.width(), wide.height(), |x, y| {
        let value = wide.get_pixel(x, y).0[0];
        image::Luma([u8::try_from(value).unwrap_or_else(|_| {
            dropped.insert(value);
            0
        })])
    });
    if !dropped.is_empty() {
        log::warn!(
            "{}: gray values above 255 cannot be mask labels and were left as background: {dropped:?}",
            path.display()
        );
    }
    narrow
}

/// Write a mask; the format follows the file extension.
///
/// # Errors
///
/// Returns [`IoError::ImageEncode`] if encoding or writing fails.
pub fn save_mask(mask: &Mask, path: &Path) -> Result<(), IoError> {
    let result = match mask {
        Mask::Color(img) => img.save(path),
        Mask::Gray(img) => img.save(path),
    };
    result.map_err(|source| IoError::ImageEncode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use segconv_pipeline::MaskValue;

    #[test]
    fn rgba_masks_load_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(1, 1, Rgba([255, 0, 0, 128]));
        img.save(&path).unwrap();

        let mask = load_mask(&path).unwrap();
        assert_eq!(mask.dimensions(), Dimensions::new(4, 3));
        assert_eq!(mask.value_at(1, 1), MaskValue::Rgb([255, 0, 0]));
    }

    #[test]
    fn gray_masks_load_as_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([4]));
        img.save(&path).unwrap();

        let mask = load_mask(&path).unwrap();
        assert_eq!(mask.value_at(2, 2), MaskValue::Gray(4));
    }

    #[test]
    fn saved_mask_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask_x.png");
        let mut img = RgbImage::new(6, 2);
        img.put_pixel(5, 1, Rgb([0, 255, 0]));
        let mask = Mask::Color(img);
        save_mask(&mask, &path).unwrap();

        assert_eq!(load_mask(&path).unwrap(), mask);
        assert_eq!(read_dimensions(&path).unwrap(), Dimensions::new(6, 2));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            load_mask(&path),
            Err(IoError::ImageDecode { .. })
        ));
        assert!(matches!(
            read_dimensions(&path),
            Err(IoError::ImageDecode { .. })
        ));
    }

    fn save_gray16(path: &Path, value: u16) {
        let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(8, 8);
        for y in 2..6 {
            for x in 2..6 {
                img.put_pixel(x, y, Luma([value]));
            }
        }
        img.save(path).unwrap();
    }

    #[test]
    fn gray16_masks_keep_raw_label_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels16.png");
        save_gray16(&path, 2);

        let mask = load_mask(&path).unwrap();
        assert_eq!(mask.value_at(3, 3), MaskValue::Gray(2));
        assert!(mask.value_at(0, 0).is_background());
        assert_eq!(mask.distinct_values(), vec![MaskValue::Gray(2)]);
    }

    #[test]
    fn gray16_values_beyond_a_byte_are_not_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels16.png");
        // 300 would read as 44 if narrowed modulo 256.
        save_gray16(&path, 300);

        let mask = load_mask(&path).unwrap();
        assert!(mask.distinct_values().is_empty());
    }

    #[test]
    fn truncated_image_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.png");
        let img = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([u8::try_from(x * 4).unwrap(), u8::try_from(y * 4).unwrap(), 7])
        });
        img.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(
            read_dimensions(&path),
            Err(IoError::ImageDecode { .. })
        ));
    }
}
