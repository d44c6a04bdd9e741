//! segconv-io: Filesystem side of segconv.
//!
//! Lists dataset directories, decodes and encodes images, loads config
//! files, and drives the `segconv-pipeline` conversions over whole
//! directories with per-item fault isolation.

pub mod batch;
pub mod config;
pub mod error;
pub mod image_io;
pub mod listing;
pub mod pairing;

pub use batch::{
    BatchReport, annotations_to_masks, boxes_to_mask, masks_to_polygons, polygons_to_mask,
    scale_annotations,
};
pub use config::load_config;
pub use error::IoError;
pub use image_io::{load_mask, read_dimensions, save_mask};
pub use pairing::{Pair, pair_files};
