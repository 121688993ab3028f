//! Attribute table listing the fields beside the map

use crate::constants::*;
use crate::error::{LayoutError, Result};
use crate::features::FieldCollection;
use crate::fit::{FitRequest, FitResult, RenderBudget, fit_table};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};

/// Horizontal text alignment inside a column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// A table column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// UI label shown in the header row
    pub header: String,
    pub width: f32,
    pub alignment: Alignment,
}

impl Column {
    /// Create a centred column of the default width
    pub fn new<S: Into<String>>(header: S) -> Self {
        Self {
            header: header.into(),
            width: DEFAULT_COLUMN_WIDTH,
            alignment: Alignment::Center,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

/// One rendered row of cell text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }
}

/// The attribute table with fitted fonts and frame size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub fit: FitResult,
    pub vertical_grid: bool,
    pub frame_stroke: f32,
}

impl AttributeTable {
    /// Build the table from prepared records.
    ///
    /// At most [`MAX_TABLE_ROWS`] rows are listed, and the font sizes are
    /// fitted to the rows actually listed.
    #[instrument(skip_all, fields(columns = headers.len(), records = fields.len()))]
    pub fn from_records(
        headers: &[String],
        fields: &FieldCollection,
        starting_content_size: u32,
        budget: &RenderBudget,
    ) -> Result<Self> {
        let columns: Vec<Column> = headers.iter().map(Column::new).collect();

        let rows: Vec<Row> = fields
            .records
            .iter()
            .take(MAX_TABLE_ROWS)
            .map(|record| {
                Row::new(
                    headers
                        .iter()
                        .map(|h| cell_text(record.get(h)))
                        .collect(),
                )
            })
            .collect();

        if fields.len() > rows.len() {
            debug!(
                "Listing {} of {} fields in the attribute table",
                rows.len(),
                fields.len()
            );
        }

        let request = FitRequest::new(rows.len()).with_starting_size(starting_content_size);
        let fit = fit_table(request, budget);

        let table = Self {
            columns,
            rows,
            fit,
            vertical_grid: false,
            frame_stroke: TABLE_FRAME_STROKE,
        };
        table.validate()?;
        Ok(table)
    }

    /// Sum of the column widths
    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Fitted table height
    pub fn total_height(&self) -> f32 {
        self.fit.table_height
    }

    /// Size of the frame holding the table
    pub fn frame_size(&self) -> (f32, f32) {
        (self.total_width(), self.total_height())
    }

    /// Validate table structure
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(LayoutError::InvalidOptions(
                "Attribute table has no columns".to_string(),
            ));
        }

        let expected = self.columns.len();
        for (i, row) in self.rows.iter().enumerate() {
            if row.cells.len() != expected {
                return Err(LayoutError::InvalidOptions(format!(
                    "Row {} has {} cells, expected {}",
                    i,
                    row.cells.len(),
                    expected
                )));
            }
        }

        trace!("Table {}x{} is valid", expected, self.rows.len());
        Ok(())
    }
}

/// Text shown for an attribute value
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_f64() => {
            n.as_f64().map(|f| format!("{:.2}", f)).unwrap_or_default()
        }
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FieldRecord;
    use serde_json::json;

    fn fields(count: usize) -> FieldCollection {
        FieldCollection::new(
            (0..count)
                .map(|i| {
                    FieldRecord::new(
                        json!({"Name": format!("{}", i + 1), "Area (ha)": 1.5})
                            .as_object()
                            .cloned()
                            .unwrap(),
                    )
                })
                .collect(),
        )
    }

    fn headers() -> Vec<String> {
        vec!["Name".to_string(), "Area (ha)".to_string()]
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(Some(&json!("North"))), "North");
        assert_eq!(cell_text(Some(&json!(3))), "3");
        assert_eq!(cell_text(Some(&json!(2.5))), "2.50");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_small_table_keeps_default_size() {
        let table =
            AttributeTable::from_records(&headers(), &fields(5), 9, &RenderBudget::default())
                .unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0].cells, vec!["1", "1.50"]);
        assert_eq!(table.fit.content_size, 9);
        assert_eq!(table.fit.header_size, 10);
        assert_eq!(table.frame_size(), (90.0, 12.5 + 5.0 * 11.0));
    }

    #[test]
    fn test_rows_are_capped() {
        let table =
            AttributeTable::from_records(&headers(), &fields(150), 9, &RenderBudget::default())
                .unwrap();
        assert_eq!(table.rows.len(), MAX_TABLE_ROWS);
        assert_eq!(table.fit.content_size, 2);
        assert_eq!(table.total_height(), 405.5);
    }

    #[test]
    fn test_no_columns_is_invalid() {
        let result = AttributeTable::from_records(&[], &fields(1), 9, &RenderBudget::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_column_builder() {
        let column = Column::new("pH").with_width(30.0);
        assert_eq!(column.width, 30.0);
        assert_eq!(column.alignment, Alignment::Center);
    }
}
