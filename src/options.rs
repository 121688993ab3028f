//! Typed layout options and project path resolution

use crate::constants::*;
use crate::error::{LayoutError, Result};
use crate::fit::RenderBudget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Project file extension understood by the GIS application
pub const PROJECT_EXTENSION: &str = "qgs";

/// Fixed attribution lines printed in the page footer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterText {
    pub website: String,
    /// Name printed in the "Map prepared by" line
    pub preparer: String,
    pub basemap_credit: String,
}

impl Default for FooterText {
    fn default() -> Self {
        Self {
            website: "farmeye.ie".to_string(),
            preparer: "Farmeye".to_string(),
            basemap_credit: "Base layer copyright ESRI".to_string(),
        }
    }
}

/// Everything needed to plan one field map layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// GeoJSON file holding the field polygons
    pub file: PathBuf,
    /// Project file, directory or bare project name
    pub project_path: String,
    pub farm_name: Option<String>,
    pub layout_name: String,
    /// Main map plus `map_count - 1` inset maps
    pub map_count: usize,
    /// Extra fields shown after the default table columns
    pub table_fields: Vec<String>,
    /// Field used to colour the polygons
    pub color_code: Option<String>,
    /// Field used to label the polygons
    pub label_data: Option<String>,
    pub area_acres: bool,
    /// Export target for the finished layout
    pub pdf: Option<PathBuf>,
    pub starting_content_size: u32,
    pub budget: RenderBudget,
    pub footer: FooterText,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            project_path: String::new(),
            farm_name: None,
            layout_name: "field layout".to_string(),
            map_count: 1,
            table_fields: Vec::new(),
            color_code: None,
            label_data: None,
            area_acres: false,
            pdf: None,
            starting_content_size: DEFAULT_CONTENT_SIZE,
            budget: RenderBudget::default(),
            footer: FooterText::default(),
        }
    }
}

impl LayoutOptions {
    /// Create options for a data file and project
    pub fn new(file: impl Into<PathBuf>, project_path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            project_path: project_path.into(),
            ..Default::default()
        }
    }

    /// Load options from a JSON file; missing keys take their defaults
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let options = serde_json::from_slice(&bytes)?;
        Ok(options)
    }

    /// Save options as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn with_farm_name(mut self, name: impl Into<String>) -> Self {
        self.farm_name = Some(name.into());
        self
    }

    pub fn with_layout_name(mut self, name: impl Into<String>) -> Self {
        self.layout_name = name.into();
        self
    }

    pub fn with_map_count(mut self, count: usize) -> Self {
        self.map_count = count;
        self
    }

    pub fn with_table_fields(mut self, fields: Vec<String>) -> Self {
        self.table_fields = fields;
        self
    }

    pub fn with_color_code(mut self, field: impl Into<String>) -> Self {
        self.color_code = Some(field.into());
        self
    }

    pub fn with_label_data(mut self, field: impl Into<String>) -> Self {
        self.label_data = Some(field.into());
        self
    }

    pub fn with_area_acres(mut self, acres: bool) -> Self {
        self.area_acres = acres;
        self
    }

    pub fn with_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdf = Some(path.into());
        self
    }

    pub fn with_budget(mut self, budget: RenderBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Colour field, treating an empty string as unset
    pub fn color_field(&self) -> Option<&str> {
        self.color_code.as_deref().filter(|c| !c.is_empty())
    }

    /// Label field, treating an empty string as unset
    pub fn label_field(&self) -> Option<&str> {
        self.label_data.as_deref().filter(|c| !c.is_empty())
    }

    /// Check the options are consistent
    pub fn validate(&self) -> Result<()> {
        if self.file.as_os_str().is_empty() {
            return Err(LayoutError::InvalidOptions(
                "No input file given".to_string(),
            ));
        }
        if self.map_count == 0 {
            return Err(LayoutError::InvalidOptions(
                "Map count must be at least 1".to_string(),
            ));
        }
        if self.starting_content_size == 0 {
            return Err(LayoutError::InvalidOptions(
                "Starting content size must be positive".to_string(),
            ));
        }
        if self.starting_content_size > MAX_CONTENT_SIZE {
            return Err(LayoutError::InvalidOptions(format!(
                "Starting content size {} is above the limit of {}",
                self.starting_content_size, MAX_CONTENT_SIZE
            )));
        }
        let height = self.budget.max_table_height;
        if !(height > 0.0 && height.is_finite()) {
            return Err(LayoutError::InvalidOptions(format!(
                "Table height budget must be positive, got {}",
                height
            )));
        }
        for (name, value) in [
            ("margin", self.budget.margin),
            ("line width", self.budget.line_width),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(LayoutError::InvalidOptions(format!(
                    "Table {} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Resolve a user supplied project location to a project file path.
///
/// * a path ending in `.qgs` is used as given
/// * an existing directory gets `project.qgs` inside it
/// * a bare name becomes `<default_dir>/<name>.qgs`
pub fn resolve_project_path(input: &str, default_dir: &Path) -> Result<PathBuf> {
    let path = Path::new(input);
    let extension = path.extension().and_then(|e| e.to_str());

    let resolved = if extension == Some(PROJECT_EXTENSION) {
        path.to_path_buf()
    } else if path.is_dir() {
        path.join("project").with_extension(PROJECT_EXTENSION)
    } else if extension.is_none() && !input.is_empty() {
        default_dir.join(path).with_extension(PROJECT_EXTENSION)
    } else {
        return Err(LayoutError::InvalidProjectPath(input.to_string()));
    };

    debug!("Resolved project path {:?} to {:?}", input, resolved);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_no_input_file() {
        let options = LayoutOptions::default();
        match options.validate() {
            Err(LayoutError::InvalidOptions(msg)) => assert!(msg.contains("No input file")),
            other => panic!("Expected InvalidOptions, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_map_count() {
        let options = LayoutOptions::new("fields.json", "farm");
        assert!(options.validate().is_ok());
        assert!(options.clone().with_map_count(0).validate().is_err());
        assert!(options.with_map_count(3).validate().is_ok());
    }

    #[test]
    fn test_validation_content_size_limit() {
        let options: LayoutOptions = serde_json::from_str(
            r#"{"file": "a.json", "starting_content_size": 4294967295}"#,
        )
        .unwrap();
        match options.validate() {
            Err(LayoutError::InvalidOptions(msg)) => assert!(msg.contains("above the limit")),
            other => panic!("Expected InvalidOptions, got {other:?}"),
        }

        let mut options = LayoutOptions::new("fields.json", "farm");
        options.starting_content_size = MAX_CONTENT_SIZE;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validation_budget_values() {
        let options = LayoutOptions::new("fields.json", "farm");
        for height in [f32::NAN, f32::INFINITY, 0.0, -10.0] {
            let budget = RenderBudget::default().with_max_height(height);
            assert!(options.clone().with_budget(budget).validate().is_err());
        }

        let negative_margin = RenderBudget::default().with_margin(-0.5);
        assert!(options.clone().with_budget(negative_margin).validate().is_err());

        let mut nan_line = RenderBudget::default();
        nan_line.line_width = f32::NAN;
        assert!(options.clone().with_budget(nan_line).validate().is_err());

        let no_margin = RenderBudget::default().with_margin(0.0);
        assert!(options.with_budget(no_margin).validate().is_ok());
    }

    #[test]
    fn test_empty_fields_are_unset() {
        let options = LayoutOptions::new("fields.json", "farm")
            .with_color_code("")
            .with_label_data("name");
        assert_eq!(options.color_field(), None);
        assert_eq!(options.label_field(), Some("name"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"file": "a.json", "map_count": 2, "budget": {"margin": 1.0}}"#)
                .unwrap();
        assert_eq!(options.map_count, 2);
        assert_eq!(options.layout_name, "field layout");
        assert_eq!(options.budget.margin, 1.0);
        assert_eq!(options.budget.max_table_height, MAX_TABLE_HEIGHT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let options = LayoutOptions::new("fields.json", "farm")
            .with_farm_name("Hill Farm")
            .with_area_acres(true);
        options.save(&path).unwrap();
        assert_eq!(LayoutOptions::load(&path).unwrap(), options);
    }

    #[test]
    fn test_project_file_used_as_given() {
        let resolved = resolve_project_path("out/farm.qgs", Path::new("projects")).unwrap();
        assert_eq!(resolved, PathBuf::from("out/farm.qgs"));
    }

    #[test]
    fn test_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().to_str().unwrap();
        let resolved = resolve_project_path(input, Path::new("projects")).unwrap();
        assert_eq!(resolved, dir.path().join("project.qgs"));
    }

    #[test]
    fn test_bare_project_name() {
        let resolved = resolve_project_path("hill_farm", Path::new("projects")).unwrap();
        assert_eq!(resolved, PathBuf::from("projects/hill_farm.qgs"));
    }

    #[test]
    fn test_other_extension_rejected() {
        assert!(matches!(
            resolve_project_path("farm.json", Path::new("projects")),
            Err(LayoutError::InvalidProjectPath(_))
        ));
    }
}
