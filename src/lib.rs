//! Print-layout planning for field polygon maps
//!
//! This library turns a GeoJSON file of field polygons and a set of layout
//! options into a complete plan for an A1 print layout: an attribute table
//! whose font size is fitted to the page, a colour scheme and legend, footer
//! text, maps, scale bar and north arrow. The plan is plain data meant to be
//! applied by a desktop GIS application.

use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, instrument};

pub mod constants;
pub mod error;
pub mod features;
pub mod fit;
pub mod labels;
pub mod options;
pub mod plan;
pub mod symbology;
pub mod table;

pub use error::{LayoutError, Result};
pub use features::{FieldCollection, FieldRecord};
pub use fit::{FitRequest, FitResult, RenderBudget, fit_table, select_content_size, table_height};
pub use labels::FieldLabels;
pub use options::{FooterText, LayoutOptions, resolve_project_path};
pub use plan::{LayoutPlan, plan_layout};
pub use symbology::{Color, ColorScheme};
pub use table::AttributeTable;

/// Clean-up steps applied to the raw records before planning
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cleanup {
    /// Remove P/K index annotations from field names
    pub strip_index: bool,
    /// Drop fields without a soil sample
    pub drop_unsampled: bool,
}

/// Read the options' data file, clean it and plan the layout
#[instrument(skip(options, labels), fields(file = %options.file.display()))]
pub fn plan_from_file(
    options: &LayoutOptions,
    labels: &FieldLabels,
    cleanup: Cleanup,
    date: NaiveDate,
    project_dir: &Path,
) -> Result<LayoutPlan> {
    let source = std::fs::read_to_string(&options.file)?;
    let mut fields = FieldCollection::from_geojson(&source)?;

    if cleanup.strip_index {
        fields.strip_index_suffixes();
    }
    if cleanup.drop_unsampled {
        let removed = fields.drop_unsampled();
        debug!("Removed {} unsampled fields", removed);
    }

    plan_layout(options, labels, fields, date, project_dir)
}
