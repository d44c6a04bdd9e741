use std::path::PathBuf;

use segconv_format::FormatError;
use segconv_pipeline::PipelineError;

/// Errors raised while reading inputs or writing outputs.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image could not be decoded (unreadable, corrupt, or an
    /// unsupported format).
    #[error("failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A mask could not be encoded to disk.
    #[error("failed to encode image {}: {source}", path.display())]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A configuration file is not valid JSON for `ConversionConfig`.
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl IoError {
    /// Whether this fault concerns a single input item.
    ///
    /// Batch pipelines log and skip per-item faults; every other error
    /// aborts the run.
    #[must_use]
    pub const fn is_per_item(&self) -> bool {
        matches!(
            self,
            Self::Read { .. }
                | Self::ImageDecode { .. }
                | Self::Format(_)
                | Self::Pipeline(PipelineError::MalformedAnnotation(_))
        )
    }
}
