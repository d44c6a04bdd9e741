//! Batch pipelines over dataset directories.
//!
//! Items are processed sequentially in sorted listing order. A fault
//! confined to one item (unreadable file, corrupt image, malformed
//! annotation, invalid text line) is logged and the item skipped;
//! directory-level faults and failed writes abort the batch.

use std::path::Path;

use segconv_format::{parse_boxes, parse_polygons, to_polygon_text};
use segconv_pipeline::{
    Annotation, ConversionConfig, annotation_to_mask, box_to_pixels, rasterize_boxes,
    rasterize_records, scale_annotation, vectorize,
};

use crate::error::IoError;
use crate::image_io::{load_mask, read_dimensions, save_mask};
use crate::listing::{
    ANNOTATION_EXTENSIONS, IMAGE_EXTENSIONS, MASK_EXTENSIONS, display_name, list_files,
};
use crate::pairing::{Pair, SCALED_PREFIX, pair_files};

/// Per-batch item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items converted and written.
    pub processed: usize,
    /// Items skipped because of a per-item fault.
    pub skipped: usize,
}

impl BatchReport {
    /// Fold one item's outcome into the report.
    ///
    /// Per-item faults are logged and counted; other errors are returned.
    fn record(&mut self, item: &Path, outcome: Result<(), IoError>) -> Result<(), IoError> {
        match outcome {
            Ok(()) => {
                self.processed += 1;
                Ok(())
            }
            Err(e) if e.is_per_item() => {
                log::warn!("skipping {}: {e}", display_name(item));
                self.skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn log_summary(self, batch: &str) {
        log::info!(
            "{batch}: {} processed, {} skipped",
            self.processed,
            self.skipped
        );
    }
}

/// Scale every annotation in `labels_dir` by `factor`, writing
/// `scaled_<name>` into `out_dir`.
///
/// # Errors
///
/// Returns an error if `labels_dir` cannot be listed, `out_dir` cannot be
/// created, or an output file cannot be written.
pub fn scale_annotations(
    labels_dir: &Path,
    out_dir: &Path,
    factor: f64,
) -> Result<BatchReport, IoError> {
    let annotations = list_files(labels_dir, ANNOTATION_EXTENSIONS)?;
    create_dir(out_dir)?;

    let mut report = BatchReport::default();
    for path in &annotations {
        let outcome = scale_one(path, out_dir, factor);
        report.record(path, outcome)?;
    }
    report.log_summary("scale");
    Ok(report)
}

fn scale_one(path: &Path, out_dir: &Path, factor: f64) -> Result<(), IoError> {
    let annotation = Annotation::from_json(&read_text(path)?)?;
    let scaled = scale_annotation(&annotation, factor);
    let out = out_dir.join(scaled_name(path));
    write_text(&out, &scaled.to_json_pretty()?)?;
    log::info!("scaled {} by {factor} -> {}", display_name(path), out.display());
    Ok(())
}

/// Rasterize every annotation in `annotations_dir` onto a mask sized to
/// its paired image in `images_dir`, writing `mask_<stem>.png` into
/// `masks_dir`.
///
/// Points are scaled by `config.scale_factor` and the canvas is the
/// image's dimensions times the same factor. When `scaled_dir` is given,
/// the scaled annotation is also written there as `scaled_<name>`.
///
/// Masks are always named after the annotation file as found in
/// `annotations_dir`: `cell.json` yields `mask_cell.png` even when a
/// `scaled_cell.json` copy is written alongside.
///
/// # Errors
///
/// Returns an error if an input directory cannot be listed, an output
/// directory cannot be created, or an output file cannot be written.
pub fn annotations_to_masks(
    images_dir: &Path,
    annotations_dir: &Path,
    masks_dir: &Path,
    scaled_dir: Option<&Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, IoError> {
    let images = list_files(images_dir, IMAGE_EXTENSIONS)?;
    let annotations = list_files(annotations_dir, ANNOTATION_EXTENSIONS)?;
    log::info!(
        "found {} images and {} annotations",
        images.len(),
        annotations.len()
    );
    create_dir(masks_dir)?;
    if let Some(dir) = scaled_dir {
        create_dir(dir)?;
    }

    let mut report = BatchReport::default();
    for (idx, pair) in pair_files(images, annotations, config.pairing)
        .iter()
        .enumerate()
    {
        log::info!(
            "processing [{idx}]: {} with {}",
            display_name(&pair.image),
            display_name(&pair.annotation)
        );
        let outcome = mask_one(pair, masks_dir, scaled_dir, config);
        report.record(&pair.annotation, outcome)?;
    }
    report.log_summary("json2mask");
    Ok(report)
}

fn mask_one(
    pair: &Pair,
    masks_dir: &Path,
    scaled_dir: Option<&Path>,
    config: &ConversionConfig,
) -> Result<(), IoError> {
    let dimensions = read_dimensions(&pair.image)?;
    let result = annotation_to_mask(&read_text(&pair.annotation)?, dimensions, config)?;
    if let Some(dir) = scaled_dir {
        write_text(
            &dir.join(scaled_name(&pair.annotation)),
            &result.annotation.to_json_pretty()?,
        )?;
    }
    let out = masks_dir.join(mask_name(&pair.annotation));
    save_mask(&result.mask, &out)?;
    log::debug!("mask written to {}", out.display());
    Ok(())
}

/// Vectorize every mask in `masks_dir`, writing `<stem>.txt` into
/// `labels_dir`. Existing label files are replaced, never appended to.
///
/// # Errors
///
/// Returns an error if `masks_dir` cannot be listed, `labels_dir` cannot
/// be created, or a label file cannot be written.
pub fn masks_to_polygons(
    masks_dir: &Path,
    labels_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchReport, IoError> {
    let masks = list_files(masks_dir, MASK_EXTENSIONS)?;
    create_dir(labels_dir)?;

    let mut report = BatchReport::default();
    for path in &masks {
        let outcome = polygons_one(path, labels_dir, config);
        report.record(path, outcome)?;
    }
    report.log_summary("mask2txt");
    Ok(report)
}

fn polygons_one(path: &Path, labels_dir: &Path, config: &ConversionConfig) -> Result<(), IoError> {
    let mask = load_mask(path)?;
    let result = vectorize(&mask, config);
    let out = labels_dir.join(label_name(path));
    write_text(&out, &to_polygon_text(&result.records))?;
    log::info!(
        "{}: {} polygons, {} unknown colors",
        display_name(path),
        result.records.len(),
        result.unknown.len()
    );
    Ok(())
}

/// Rasterize a normalized polygon text file onto a mask the size of
/// `reference_image`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the mask
/// cannot be written.
pub fn polygons_to_mask(
    text_path: &Path,
    reference_image: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<(), IoError> {
    let dimensions = read_dimensions(reference_image)?;
    let records = parse_polygons(&read_text(text_path)?)?;
    let mask = rasterize_records(&records, dimensions, config);
    create_parent(output)?;
    save_mask(&mask, output)?;
    log::info!("{} polygons -> {}", records.len(), output.display());
    Ok(())
}

/// Draw the boxes of a normalized bounding-box text file as outlines on
/// a mask the size of `reference_image`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the mask
/// cannot be written.
pub fn boxes_to_mask(
    text_path: &Path,
    reference_image: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<(), IoError> {
    let dimensions = read_dimensions(reference_image)?;
    let boxes: Vec<_> = parse_boxes(&read_text(text_path)?)?
        .into_iter()
        .map(|b| box_to_pixels(b, dimensions))
        .collect();
    let mask = rasterize_boxes(&boxes, dimensions, config.box_stroke);
    create_parent(output)?;
    save_mask(&mask, output)?;
    log::info!("{} boxes -> {}", boxes.len(), output.display());
    Ok(())
}

/// `mask_<file name up to its first '.'>.png`.
fn mask_name(annotation: &Path) -> String {
    let name = display_name(annotation);
    let stem = name.split('.').next().unwrap_or_default();
    format!("mask_{stem}.png")
}

/// `<mask stem>.txt`.
fn label_name(mask: &Path) -> String {
    let stem = mask.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}.txt")
}

fn scaled_name(annotation: &Path) -> String {
    format!("{SCALED_PREFIX}{}", display_name(annotation))
}

fn read_text(path: &Path) -> Result<String, IoError> {
    std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), IoError> {
    std::fs::write(path, text).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn create_parent(path: &Path) -> Result<(), IoError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir(parent),
        _ => Ok(()),
    }
}
