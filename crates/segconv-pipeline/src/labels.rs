//! Color/label map: the fixed table tying raster colors to class labels.
//!
//! The same table drives both directions. Rasterization asks
//! [`ColorLabelMap::color_of`] which color to paint a class with, and
//! vectorization asks [`ColorLabelMap::label_of`] which class a mask
//! color belongs to. Colors absent from the table are *unknown*: callers
//! report and skip them instead of folding them into any real class.
//!
//! Background (all-zero) is never a class and can never be inserted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// One distinct non-background value found in a mask.
///
/// Ordering is ascending by raw value for gray masks and lexicographic by
/// channel tuple for color masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaskValue {
    /// A single-channel gray value.
    Gray(u8),
    /// An RGB color.
    Rgb([u8; 3]),
}

impl MaskValue {
    /// Returns `true` for the background value (zero / black).
    #[must_use]
    pub const fn is_background(self) -> bool {
        matches!(self, Self::Gray(0) | Self::Rgb([0, 0, 0]))
    }
}

impl fmt::Display for MaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray(v) => write!(f, "gray {v}"),
            Self::Rgb([r, g, b]) => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

/// Partial, injective mapping between mask values and class labels.
///
/// Stored as two small ordered maps per channel depth, built once at
/// configuration time. Gray masks use an optional explicit table; without
/// one, a gray value *is* its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorLabelTable", into = "ColorLabelTable")]
pub struct ColorLabelMap {
    label_by_color: BTreeMap<[u8; 3], u32>,
    color_by_label: BTreeMap<u32, [u8; 3]>,
    gray: Option<GrayTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GrayTable {
    label_by_value: BTreeMap<u8, u32>,
    value_by_label: BTreeMap<u32, u8>,
}

impl ColorLabelMap {
    /// An empty map: every color is unknown and gray values are identity
    /// mapped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            label_by_color: BTreeMap::new(),
            color_by_label: BTreeMap::new(),
            gray: None,
        }
    }

    /// Build a map from `(color, label)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if any pair would break
    /// injectivity or involves the background.
    pub fn from_colors<I>(entries: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = ([u8; 3], u32)>,
    {
        let mut map = Self::new();
        for (color, label) in entries {
            map.insert_color(color, label)?;
        }
        Ok(map)
    }

    /// Add a color ↔ label pair.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the color is black, the
    /// label is 0, or either side is already mapped.
    pub fn insert_color(&mut self, color: [u8; 3], label: u32) -> Result<(), PipelineError> {
        check_not_background(MaskValue::Rgb(color), label)?;
        if let Some(existing) = self.label_by_color.get(&color) {
            return Err(PipelineError::InvalidConfig(format!(
                "{} is already mapped to label {existing}",
                MaskValue::Rgb(color)
            )));
        }
        if let Some(existing) = self.color_by_label.get(&label) {
            return Err(PipelineError::InvalidConfig(format!(
                "label {label} is already mapped to {}",
                MaskValue::Rgb(*existing)
            )));
        }
        self.label_by_color.insert(color, label);
        self.color_by_label.insert(label, color);
        Ok(())
    }

    /// Add a gray value ↔ label pair, switching gray lookups from
    /// identity to the explicit table.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the value or label is 0,
    /// or either side is already mapped.
    pub fn insert_gray(&mut self, value: u8, label: u32) -> Result<(), PipelineError> {
        check_not_background(MaskValue::Gray(value), label)?;
        let table = self.gray.get_or_insert_with(GrayTable::default);
        if table.label_by_value.contains_key(&value) || table.value_by_label.contains_key(&label) {
            return Err(PipelineError::InvalidConfig(format!(
                "gray value {value} or label {label} is already mapped"
            )));
        }
        table.label_by_value.insert(value, label);
        table.value_by_label.insert(label, value);
        Ok(())
    }

    /// Class label for a mask value, or `None` if the value is unknown.
    ///
    /// Background is never a class and always yields `None`; callers
    /// are expected to exclude it before looking anything up.
    #[must_use]
    pub fn label_of(&self, value: MaskValue) -> Option<u32> {
        if value.is_background() {
            return None;
        }
        match value {
            MaskValue::Rgb(color) => self.label_by_color.get(&color).copied(),
            MaskValue::Gray(v) => match &self.gray {
                Some(table) => table.label_by_value.get(&v).copied(),
                None => Some(u32::from(v)),
            },
        }
    }

    /// RGB color assigned to `label`, if any.
    #[must_use]
    pub fn color_of(&self, label: u32) -> Option<[u8; 3]> {
        self.color_by_label.get(&label).copied()
    }

    /// Gray value assigned to `label`, if any.
    ///
    /// Without an explicit gray table, labels `1..=255` map to themselves.
    #[must_use]
    pub fn gray_of(&self, label: u32) -> Option<u8> {
        match &self.gray {
            Some(table) => table.value_by_label.get(&label).copied(),
            None => u8::try_from(label).ok().filter(|&v| v != 0),
        }
    }

    /// Iterate over `(color, label)` pairs in ascending color order.
    pub fn colors(&self) -> impl Iterator<Item = ([u8; 3], u32)> + '_ {
        self.label_by_color.iter().map(|(&c, &l)| (c, l))
    }
}

impl Default for ColorLabelMap {
    /// Red marks class 1.
    fn default() -> Self {
        let mut label_by_color = BTreeMap::new();
        let mut color_by_label = BTreeMap::new();
        label_by_color.insert([255, 0, 0], 1);
        color_by_label.insert(1, [255, 0, 0]);
        Self {
            label_by_color,
            color_by_label,
            gray: None,
        }
    }
}

fn check_not_background(value: MaskValue, label: u32) -> Result<(), PipelineError> {
    if value.is_background() {
        return Err(PipelineError::InvalidConfig(format!(
            "{value} is the background and cannot be mapped to a class"
        )));
    }
    if label == 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "{value} cannot map to label 0, which is reserved for background"
        )));
    }
    Ok(())
}

/// Serde form of [`ColorLabelMap`]: JSON object keys must be strings, so
/// the table is written as entry lists and re-validated on load.
#[derive(Serialize, Deserialize)]
struct ColorLabelTable {
    colors: Vec<ColorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gray: Option<Vec<GrayEntry>>,
}

#[derive(Serialize, Deserialize)]
struct ColorEntry {
    color: [u8; 3],
    label: u32,
}

#[derive(Serialize, Deserialize)]
struct GrayEntry {
    value: u8,
    label: u32,
}

impl TryFrom<ColorLabelTable> for ColorLabelMap {
    type Error = PipelineError;

    fn try_from(table: ColorLabelTable) -> Result<Self, Self::Error> {
        let mut map = Self::from_colors(table.colors.into_iter().map(|e| (e.color, e.label)))?;
        if let Some(gray) = table.gray {
            map.gray = Some(GrayTable::default());
            for entry in gray {
                map.insert_gray(entry.value, entry.label)?;
            }
        }
        Ok(map)
    }
}

impl From<ColorLabelMap> for ColorLabelTable {
    fn from(map: ColorLabelMap) -> Self {
        Self {
            colors: map
                .colors()
                .map(|(color, label)| ColorEntry { color, label })
                .collect(),
            gray: map.gray.map(|table| {
                table
                    .label_by_value
                    .into_iter()
                    .map(|(value, label)| GrayEntry { value, label })
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_maps_red_to_class_one() {
        let map = ColorLabelMap::default();
        assert_eq!(map.label_of(MaskValue::Rgb([255, 0, 0])), Some(1));
        assert_eq!(map.color_of(1), Some([255, 0, 0]));
    }

    #[test]
    fn unknown_color_is_not_background() {
        let map = ColorLabelMap::default();
        assert_eq!(map.label_of(MaskValue::Rgb([0, 255, 247])), None);
        assert_eq!(map.color_of(2), None);
    }

    #[test]
    fn background_is_never_a_class() {
        let map = ColorLabelMap::default();
        assert_eq!(map.label_of(MaskValue::Rgb([0, 0, 0])), None);
        assert_eq!(map.label_of(MaskValue::Gray(0)), None);
    }

    #[test]
    fn gray_values_are_identity_without_table() {
        let map = ColorLabelMap::default();
        assert_eq!(map.label_of(MaskValue::Gray(3)), Some(3));
        assert_eq!(map.gray_of(3), Some(3));
        assert_eq!(map.gray_of(0), None);
        assert_eq!(map.gray_of(256), None);
    }

    #[test]
    fn explicit_gray_table_replaces_identity() {
        let mut map = ColorLabelMap::new();
        map.insert_gray(255, 1).unwrap();
        assert_eq!(map.label_of(MaskValue::Gray(255)), Some(1));
        assert_eq!(map.label_of(MaskValue::Gray(1)), None);
        assert_eq!(map.gray_of(1), Some(255));
    }

    #[test]
    fn duplicate_color_is_rejected() {
        let result = ColorLabelMap::from_colors([([255, 0, 0], 1), ([255, 0, 0], 2)]);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let result = ColorLabelMap::from_colors([([255, 0, 0], 1), ([0, 255, 0], 1)]);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn black_or_label_zero_is_rejected() {
        assert!(ColorLabelMap::from_colors([([0, 0, 0], 1)]).is_err());
        assert!(ColorLabelMap::from_colors([([1, 2, 3], 0)]).is_err());
    }

    #[test]
    fn json_round_trip_keeps_both_tables() {
        let mut map = ColorLabelMap::from_colors([([255, 0, 0], 1), ([0, 0, 255], 2)]).unwrap();
        map.insert_gray(128, 2).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        let back: ColorLabelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn json_with_duplicate_entries_fails_to_load() {
        let json = r#"{"colors": [{"color": [1, 2, 3], "label": 1}, {"color": [1, 2, 3], "label": 2}]}"#;
        assert!(serde_json::from_str::<ColorLabelMap>(json).is_err());
    }

    #[test]
    fn mask_values_order_by_channel_tuple() {
        let mut values = vec![
            MaskValue::Rgb([0, 255, 0]),
            MaskValue::Rgb([255, 0, 0]),
            MaskValue::Rgb([0, 0, 255]),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                MaskValue::Rgb([0, 0, 255]),
                MaskValue::Rgb([0, 255, 0]),
                MaskValue::Rgb([255, 0, 0]),
            ]
        );
    }
}
