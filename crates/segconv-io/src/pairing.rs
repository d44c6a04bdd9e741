//! Pairing source images with annotation documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use segconv_pipeline::PairingPolicy;

/// Prefix written by the scaling batch; ignored when matching by name.
pub const SCALED_PREFIX: &str = "scaled_";

/// One source image and the annotation drawn on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub image: PathBuf,
    pub annotation: PathBuf,
}

/// Pair two sorted listings according to `policy`.
///
/// [`PairingPolicy::ListingOrder`] zips the listings. When their lengths
/// differ a warning is logged and both are truncated to the shorter one.
///
/// [`PairingPolicy::Basename`] pairs each annotation with the image of
/// the same stem, after stripping [`SCALED_PREFIX`] from the annotation
/// stem. Files left without a partner are logged and skipped.
#[must_use]
pub fn pair_files(
    images: Vec<PathBuf>,
    annotations: Vec<PathBuf>,
    policy: PairingPolicy,
) -> Vec<Pair> {
    match policy {
        PairingPolicy::ListingOrder => pair_by_order(images, annotations),
        PairingPolicy::Basename => pair_by_name(images, annotations),
    }
}

fn pair_by_order(images: Vec<PathBuf>, annotations: Vec<PathBuf>) -> Vec<Pair> {
    if images.len() != annotations.len() {
        log::warn!(
            "annotation/image count mismatch: {} annotations, {} images; pairing the first {}",
            annotations.len(),
            images.len(),
            images.len().min(annotations.len())
        );
    }
    images
        .into_iter()
        .zip(annotations)
        .map(|(image, annotation)| Pair { image, annotation })
        .collect()
}

fn pair_by_name(images: Vec<PathBuf>, annotations: Vec<PathBuf>) -> Vec<Pair> {
    let mut by_stem: BTreeMap<String, PathBuf> = images
        .into_iter()
        .filter_map(|path| Some((stem(&path)?.to_owned(), path)))
        .collect();

    let mut pairs = Vec::new();
    for annotation in annotations {
        let Some(name) = stem(&annotation) else {
            continue;
        };
        let key = name.strip_prefix(SCALED_PREFIX).unwrap_or(name);
        match by_stem.remove(key) {
            Some(image) => pairs.push(Pair { image, annotation }),
            None => log::warn!("no image named {key:?} for {}", annotation.display()),
        }
    }
    for image in by_stem.values() {
        log::warn!("no annotation for image {}", image.display());
    }
    pairs
}

fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
