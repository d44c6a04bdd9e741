//! Sorted, extension-filtered directory listings.

use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Source image extensions accepted by the rasterizing batch.
pub const IMAGE_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg"];

/// Mask extensions accepted by the vectorizing batch.
pub const MASK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Annotation document extensions.
pub const ANNOTATION_EXTENSIONS: &[&str] = &["json"];

/// List the regular files in `dir` whose extension matches one of
/// `extensions` (case-insensitive), sorted by file name.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the directory cannot be listed.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, IoError> {
    let read_err = |source| IoError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// File name as UTF-8 text, lossy.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
}
