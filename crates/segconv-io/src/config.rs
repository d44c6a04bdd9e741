use std::path::Path;

use segconv_pipeline::ConversionConfig;

use crate::error::IoError;

/// Load and validate a [`ConversionConfig`] from a JSON file.
///
/// Fields missing from the file take their default values.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the file cannot be read,
/// [`IoError::Config`] if it is not a valid config document, or
/// [`IoError::Pipeline`] if the config fails validation.
pub fn load_config(path: &Path) -> Result<ConversionConfig, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ConversionConfig =
        serde_json::from_str(&text).map_err(|source| IoError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use segconv_pipeline::{MaskKind, MaskValue, PairingPolicy};

    fn write_config(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let (_dir, path) = write_config(r#"{"scale_factor": 10.0, "pairing": "basename"}"#);
        let config = load_config(&path).unwrap();
        assert!((config.scale_factor - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.pairing, PairingPolicy::Basename);
        assert_eq!(config.mask_kind, MaskKind::Color);
        assert_eq!(config.classes.get("mito"), Some(&1));
    }

    #[test]
    fn color_table_is_read() {
        let (_dir, path) = write_config(
            r#"{"colors": {"colors": [
                {"color": [255, 0, 0], "label": 1},
                {"color": [0, 255, 247], "label": 2}
            ]}}"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.colors.label_of(MaskValue::Rgb([0, 255, 247])), Some(2));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let (_dir, path) = write_config(r#"{"scale_factor": 0.0}"#);
        assert!(matches!(load_config(&path), Err(IoError::Pipeline(_))));
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let (_dir, path) = write_config("{ nope");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, IoError::Config { .. }));
        assert!(err.to_string().contains("config.json"));
    }
}
