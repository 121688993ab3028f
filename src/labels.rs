//! Mapping between data field names and the labels shown on the map

use crate::error::{LayoutError, Result};
use crate::options::LayoutOptions;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// UI label of the area column in hectares
pub const HECTARE_LABEL: &str = "Area (ha)";

/// UI label of the area column after conversion to acres
pub const ACRE_LABEL: &str = "Area (ac)";

/// Fields that always lead the attribute table
pub const DEFAULT_TABLE_FIELDS: [&str; 2] = ["name", "referenceArea_ha"];

/// Immutable two-way mapping between field names and UI labels.
///
/// Loaded once and passed to whatever needs a translation.
#[derive(Debug, Clone, Default)]
pub struct FieldLabels {
    to_ui: HashMap<String, String>,
    to_field: HashMap<String, String>,
}

impl FieldLabels {
    /// Parse `field_name,UI label` lines. Blank lines are ignored.
    pub fn parse(source: &str) -> Result<Self> {
        let mut to_ui = HashMap::new();
        let mut to_field = HashMap::new();

        for (idx, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (field, label) = line.split_once(',').ok_or_else(|| {
                LayoutError::InvalidLabels(format!("line {} has no comma: {:?}", idx + 1, line))
            })?;
            let (field, label) = (field.trim(), label.trim());
            if field.is_empty() || label.is_empty() {
                return Err(LayoutError::InvalidLabels(format!(
                    "line {} has an empty entry",
                    idx + 1
                )));
            }
            to_ui.insert(field.to_string(), label.to_string());
            to_field.insert(label.to_string(), field.to_string());
        }

        debug!("Parsed {} field labels", to_ui.len());
        Ok(Self { to_ui, to_field })
    }

    /// Load a label file from disk
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// UI label for a field name
    pub fn to_ui(&self, field: &str) -> Option<&str> {
        self.to_ui.get(field).map(String::as_str)
    }

    /// Field name for a UI label
    pub fn to_field(&self, label: &str) -> Option<&str> {
        self.to_field.get(label).map(String::as_str)
    }

    /// UI label for a field name, failing on unknown fields
    pub fn ui_or_err(&self, field: &str) -> Result<&str> {
        self.to_ui(field)
            .ok_or_else(|| LayoutError::UnknownField(field.to_string()))
    }

    pub fn len(&self) -> usize {
        self.to_ui.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_ui.is_empty()
    }

    /// UI labels of the attribute table columns, in display order.
    ///
    /// The default fields come first, then the requested extras. With
    /// `area_acres` set the hectare column is relabelled in place.
    pub fn table_columns(&self, options: &LayoutOptions) -> Result<Vec<String>> {
        let mut columns = DEFAULT_TABLE_FIELDS
            .iter()
            .copied()
            .chain(options.table_fields.iter().map(String::as_str))
            .map(|field| self.ui_or_err(field).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        if options.area_acres {
            if let Some(area) = columns.iter_mut().find(|c| c.as_str() == HECTARE_LABEL) {
                *area = ACRE_LABEL.to_string();
            }
        }

        Ok(columns)
    }
}
