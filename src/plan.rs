//! Page placement of every layout item
//!
//! Positions follow the GIS layout model: an item is placed by one of its
//! corners (the reference point) at a page position, in millimetres from the
//! top-left of the page.

use crate::constants::*;
use crate::error::Result;
use crate::features::FieldCollection;
use crate::labels::FieldLabels;
use crate::options::{LayoutOptions, resolve_project_path};
use crate::symbology::{Color, ColorScheme};
use crate::table::AttributeTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, trace};

/// Corner of an item that its position refers to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Axis-aligned rectangle given by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Where an item sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub reference: ReferencePoint,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    pub fn new(reference: ReferencePoint, position: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            reference,
            x: position.0,
            y: position.1,
            width: size.0,
            height: size.1,
        }
    }

    /// The occupied rectangle, whatever the reference point
    pub fn bounds(&self) -> Rect {
        let (x, y) = match self.reference {
            ReferencePoint::UpperLeft => (self.x, self.y),
            ReferencePoint::UpperRight => (self.x - self.width, self.y),
            ReferencePoint::LowerLeft => (self.x, self.y - self.height),
            ReferencePoint::LowerRight => (self.x - self.width, self.y - self.height),
        };
        Rect {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Page size and orientation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSetup {
    pub size_name: String,
    pub landscape: bool,
    pub width: f32,
    pub height: f32,
}

impl PageSetup {
    pub fn a1_landscape() -> Self {
        Self {
            size_name: "A1".to_string(),
            landscape: true,
            width: A1_LANDSCAPE_WIDTH,
            height: A1_LANDSCAPE_HEIGHT,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Tiled imagery under the field polygons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basemap {
    pub name: String,
    pub url: String,
}

impl Default for Basemap {
    fn default() -> Self {
        Self {
            name: "ESRI".to_string(),
            url: BASEMAP_URL.to_string(),
        }
    }
}

/// Text format shared by polygon and scale bar labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFormat {
    pub font: String,
    pub size: f32,
    pub bold: bool,
    /// Width of the halo around the text, if any
    pub buffer: Option<f32>,
    pub shadow: bool,
}

impl TextFormat {
    /// Bold Arial with a halo and drop shadow, readable over imagery
    pub fn haloed(size: f32) -> Self {
        Self {
            font: "Arial".to_string(),
            size,
            bold: true,
            buffer: Some(1.5),
            shadow: true,
        }
    }
}

/// Labels drawn on each field polygon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonLabels {
    /// UI label of the labelled column
    pub field: String,
    pub format: TextFormat,
}

/// The attribute table and its frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableItem {
    pub table: AttributeTable,
    pub placement: Placement,
}

/// Legend for the colour scheme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub placement: Placement,
    /// Font size of the layer title
    pub header_size: u32,
    /// Font size of the class labels
    pub content_size: u32,
    pub symbol_width: f32,
    pub symbol_height: f32,
    pub line_spacing: f32,
    /// Layers left out of the legend
    pub excluded_layers: Vec<String>,
}

/// A line of footer text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterLabel {
    pub text: String,
    pub font_size: f32,
    pub reference: ReferencePoint,
    pub x: f32,
    pub y: f32,
}

/// Stroke drawn around a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFrame {
    pub stroke_width: f32,
    pub color: Color,
}

/// A map of the field polygons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapItem {
    pub placement: Placement,
    pub frame: Option<MapFrame>,
}

/// Scale bar linked to one of the maps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleBarItem {
    pub reference: ReferencePoint,
    pub x: f32,
    pub y: f32,
    pub style: String,
    pub segments: u32,
    pub segments_left: u32,
    pub units_per_segment: f32,
    pub unit_label: String,
    pub max_bar_width: f32,
    pub height: f32,
    /// Index into [`LayoutPlan::maps`]
    pub linked_map: usize,
    pub format: TextFormat,
}

/// North arrow picture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NorthArrowItem {
    pub placement: Placement,
    /// SVG path relative to the application's SVG directory
    pub svg: String,
}

/// Everything the GIS application needs to build and export the layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub layout_name: String,
    pub project_path: PathBuf,
    pub data_file: PathBuf,
    pub crs: String,
    pub page: PageSetup,
    pub basemap: Basemap,
    pub feature_count: usize,
    pub color_scheme: ColorScheme,
    pub polygon_labels: Option<PolygonLabels>,
    pub table: TableItem,
    pub legend: Option<LegendItem>,
    pub footer: Vec<FooterLabel>,
    /// Main map first, then insets
    pub maps: Vec<MapItem>,
    pub scale_bar: ScaleBarItem,
    pub north_arrow: NorthArrowItem,
    pub pdf: Option<PathBuf>,
}

impl LayoutPlan {
    /// Pretty-printed JSON for the GIS application
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Width reserved on the left for the table column
    pub fn data_column_width(&self) -> f32 {
        data_column_width(&self.table.table)
    }
}

fn data_column_width(table: &AttributeTable) -> f32 {
    table.total_width() + PAGE_PADDING
}

/// Plan the complete layout for a set of field records.
///
/// The records are prepared for the table (relabelled, converted, rounded and
/// sorted) before the table is fitted and the page items are placed.
#[instrument(skip_all, fields(layout = %options.layout_name, records = fields.len()))]
pub fn plan_layout(
    options: &LayoutOptions,
    labels: &FieldLabels,
    mut fields: FieldCollection,
    date: NaiveDate,
    project_dir: &Path,
) -> Result<LayoutPlan> {
    options.validate()?;
    let project_path = resolve_project_path(&options.project_path, project_dir)?;

    let columns = labels.table_columns(options)?;
    let feature_count = fields.prepare(options, labels, &columns);

    let color_label = options
        .color_field()
        .map(|f| labels.ui_or_err(f))
        .transpose()?;
    let color_values = color_label
        .map(|label| fields.numeric_values(label))
        .unwrap_or_default();
    let color_scheme = ColorScheme::for_field(color_label, &color_values);

    let label_field = options
        .label_field()
        .map(|f| labels.ui_or_err(f))
        .transpose()?;
    let polygon_labels = label_field.map(|field| PolygonLabels {
        field: field.to_string(),
        format: TextFormat::haloed(50.0),
    });

    let page = PageSetup::a1_landscape();

    let table = AttributeTable::from_records(
        &columns,
        &fields,
        options.starting_content_size,
        &options.budget,
    )?;
    let data_width = data_column_width(&table);
    let table_item = TableItem {
        placement: Placement::new(
            ReferencePoint::UpperLeft,
            (PAGE_PADDING, PAGE_PADDING),
            table.frame_size(),
        ),
        table,
    };

    let legend = color_scheme
        .has_classes()
        .then(|| place_legend(&table_item.table));
    let footer = footer_labels(options, &page, color_label, label_field, date);
    let maps = place_maps(options.map_count, &page, data_width);
    let scale_bar = place_scale_bar(&page, data_width);
    let north_arrow = place_north_arrow(&page);

    info!(
        "Planned layout {:?}: {} fields, {} maps, content size {}",
        options.layout_name,
        feature_count,
        maps.len(),
        table_item.table.fit.content_size
    );

    Ok(LayoutPlan {
        layout_name: options.layout_name.clone(),
        project_path,
        data_file: options.file.clone(),
        crs: PROJECT_CRS.to_string(),
        page,
        basemap: Basemap::default(),
        feature_count,
        color_scheme,
        polygon_labels,
        table: table_item,
        legend,
        footer,
        maps,
        scale_bar,
        north_arrow,
        pdf: options.pdf.clone(),
    })
}

/// Legend stacked under the table, or moved aside when the table is tall
fn place_legend(table: &AttributeTable) -> LegendItem {
    let height = table.total_height();
    let position = if height > LEGEND_RELOCATE_THRESHOLD {
        debug!("Table height {} leaves no room below, moving legend", height);
        LEGEND_FALLBACK_POSITION
    } else {
        (PAGE_PADDING, PAGE_PADDING + height + MAP_PADDING)
    };

    LegendItem {
        placement: Placement::new(
            ReferencePoint::UpperLeft,
            position,
            (LEGEND_WIDTH, LEGEND_HEIGHT),
        ),
        header_size: table.fit.header_size,
        content_size: table.fit.content_size,
        symbol_width: 16.0,
        symbol_height: 10.0,
        line_spacing: 5.0,
        excluded_layers: vec![Basemap::default().name],
    }
}

/// Footer lines stacked upwards from the bottom-left corner
fn footer_labels(
    options: &LayoutOptions,
    page: &PageSetup,
    color_label: Option<&str>,
    label_field: Option<&str>,
    date: NaiveDate,
) -> Vec<FooterLabel> {
    let mut lines = vec![
        options.footer.website.clone(),
        format!(
            "Map prepared by {} {}",
            options.footer.preparer,
            date.format("%d/%m/%Y")
        ),
        options.footer.basemap_credit.clone(),
    ];
    if let Some(field) = label_field {
        lines.push(format!("Label variable: {}", field));
    }
    if color_label == Some("P index") {
        lines.push("P index: grass".to_string());
    }
    if let Some(farm) = options.farm_name.as_deref().filter(|f| !f.is_empty()) {
        lines.push(format!("Farm: {}", farm));
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| FooterLabel {
            text,
            font_size: FOOTER_FONT_SIZE,
            reference: ReferencePoint::LowerLeft,
            x: PAGE_PADDING,
            y: page.height - PAGE_PADDING - i as f32 * FOOTER_SPACING,
        })
        .collect()
}

/// Main map filling the page right of the table, then framed insets
fn place_maps(map_count: usize, page: &PageSetup, data_width: f32) -> Vec<MapItem> {
    let mut maps = Vec::with_capacity(map_count);

    maps.push(MapItem {
        placement: Placement::new(
            ReferencePoint::LowerRight,
            (page.width - PAGE_PADDING, page.height - PAGE_PADDING),
            (
                page.width - data_width - 2.0 * PAGE_PADDING,
                page.height - 2.0 * PAGE_PADDING,
            ),
        ),
        frame: None,
    });

    for c in 0..map_count.saturating_sub(1) {
        let offset = INSET_STEP * c as f32;
        trace!("Placing inset map {} at offset {}", c + 1, offset);
        maps.push(MapItem {
            placement: Placement::new(
                ReferencePoint::LowerRight,
                (page.width - offset, page.height - offset),
                ((page.width - data_width) / 2.0, page.width / 2.0),
            ),
            frame: Some(MapFrame {
                stroke_width: INSET_FRAME_STROKE,
                color: Color::from_bytes(18, 101, 135, 255),
            }),
        });
    }

    maps
}

fn place_scale_bar(page: &PageSetup, data_width: f32) -> ScaleBarItem {
    ScaleBarItem {
        reference: ReferencePoint::LowerLeft,
        x: data_width + PAGE_PADDING + MAP_PADDING,
        y: page.height - PAGE_PADDING - MAP_PADDING,
        style: "Single Box".to_string(),
        segments: 4,
        segments_left: 0,
        units_per_segment: 100.0,
        unit_label: "m".to_string(),
        max_bar_width: 250.0,
        height: 8.0,
        linked_map: 0,
        format: TextFormat::haloed(40.0),
    }
}

fn place_north_arrow(page: &PageSetup) -> NorthArrowItem {
    NorthArrowItem {
        placement: Placement::new(
            ReferencePoint::UpperRight,
            (
                page.width - PAGE_PADDING - MAP_PADDING,
                PAGE_PADDING + MAP_PADDING,
            ),
            NORTH_ARROW_SIZE,
        ),
        svg: "arrows/NorthArrow_11.svg".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FieldRecord;
    use serde_json::json;

    const LABELS: &str = "name,Name\nreferenceArea_ha,Area (ha)\nsoilTest_pIndex,P index\nsoilTest_pH,pH";

    fn fields(count: usize) -> FieldCollection {
        FieldCollection::new(
            (0..count)
                .map(|i| {
                    FieldRecord::new(
                        json!({
                            "name": format!("{}", count - i),
                            "referenceArea_ha": 2.346,
                            "soilTest_pIndex": (i % 4) + 1,
                            "soilTest_pH": 6.4,
                        })
                        .as_object()
                        .cloned()
                        .unwrap(),
                    )
                })
                .collect(),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 9).unwrap()
    }

    fn plan(options: &LayoutOptions, count: usize) -> LayoutPlan {
        let labels = FieldLabels::parse(LABELS).unwrap();
        plan_layout(options, &labels, fields(count), date(), Path::new("projects")).unwrap()
    }

    #[test]
    fn test_reference_point_bounds() {
        let size = (10.0, 20.0);
        let at = (100.0, 100.0);
        let ul = Placement::new(ReferencePoint::UpperLeft, at, size).bounds();
        let lr = Placement::new(ReferencePoint::LowerRight, at, size).bounds();
        let ur = Placement::new(ReferencePoint::UpperRight, at, size).bounds();
        let ll = Placement::new(ReferencePoint::LowerLeft, at, size).bounds();
        assert_eq!((ul.x, ul.y), (100.0, 100.0));
        assert_eq!((lr.x, lr.y), (90.0, 80.0));
        assert_eq!((ur.x, ur.y), (90.0, 100.0));
        assert_eq!((ll.x, ll.y), (100.0, 80.0));
    }

    #[test]
    fn test_basic_plan_geometry() {
        let plan = plan(&LayoutOptions::new("fields.json", "hill"), 5);

        assert_eq!(plan.project_path, PathBuf::from("projects/hill.qgs"));
        assert_eq!(plan.feature_count, 5);
        assert_eq!(plan.data_column_width(), 105.0);
        assert!(plan.legend.is_none());
        assert_eq!(plan.color_scheme.kind(), "outline");
        assert!(!plan.color_scheme.has_classes());

        let table = plan.table.placement.bounds();
        assert_eq!((table.x, table.y), (15.0, 15.0));
        assert_eq!((table.width, table.height), (90.0, 67.5));

        assert_eq!(plan.maps.len(), 1);
        let map = plan.maps[0].placement.bounds();
        assert_eq!((map.x, map.y, map.width, map.height), (120.0, 15.0, 706.0, 564.0));
        assert!(plan.page.bounds().contains(&map));
        assert!(!map.contains(&table));

        assert_eq!((plan.scale_bar.x, plan.scale_bar.y), (130.0, 569.0));
        let arrow = plan.north_arrow.placement.bounds();
        assert_eq!((arrow.x, arrow.y), (776.0, 25.0));
    }

    #[test]
    fn test_footer_lines() {
        let options = LayoutOptions::new("fields.json", "hill")
            .with_farm_name("Hill Farm")
            .with_color_code("soilTest_pIndex")
            .with_label_data("name");
        let plan = plan(&options, 3);
        let texts: Vec<_> = plan.footer.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "farmeye.ie",
                "Map prepared by Farmeye 09/03/2021",
                "Base layer copyright ESRI",
                "Label variable: Name",
                "P index: grass",
                "Farm: Hill Farm",
            ]
        );
        assert_eq!(plan.footer[0].y, 579.0);
        assert_eq!(plan.footer[5].y, 529.0);
        assert_eq!(plan.polygon_labels.as_ref().unwrap().field, "Name");
    }

    #[test]
    fn test_legend_below_table() {
        let options = LayoutOptions::new("fields.json", "hill").with_color_code("soilTest_pH");
        let plan = plan(&options, 10);
        let legend = plan.legend.unwrap();
        // 12.5 + 10 * 11 = 122.5
        assert_eq!(legend.placement.y, 15.0 + 122.5 + 10.0);
        assert_eq!(legend.placement.x, 15.0);
        assert_eq!(legend.header_size, 10);
        assert_eq!(plan.color_scheme.kind(), "ranged");
        assert!(plan.color_scheme.has_classes());
    }

    #[test]
    fn test_legend_moves_for_tall_table() {
        let options = LayoutOptions::new("fields.json", "hill").with_color_code("soilTest_pH");
        // 40 rows: 12.5 + 40 * 11 = 452.5, still fits at size 9
        let plan = plan(&options, 40);
        assert_eq!(plan.table.table.fit.content_size, 9);
        let legend = plan.legend.unwrap();
        assert_eq!((legend.placement.x, legend.placement.y), LEGEND_FALLBACK_POSITION);
    }

    #[test]
    fn test_inset_maps() {
        let options = LayoutOptions::new("fields.json", "hill").with_map_count(3);
        let plan = plan(&options, 2);
        assert_eq!(plan.maps.len(), 3);
        assert!(plan.maps[0].frame.is_none());
        let second = plan.maps[2].placement;
        assert_eq!((second.x, second.y), (791.0, 544.0));
        assert_eq!(second.width, (841.0 - 105.0) / 2.0);
        assert!(plan.maps[1].frame.is_some());
        assert_eq!(plan.scale_bar.linked_map, 0);
    }

    #[test]
    fn test_fields_sorted_in_table() {
        let plan = plan(&LayoutOptions::new("fields.json", "hill"), 3);
        let names: Vec<_> = plan
            .table
            .table
            .rows
            .iter()
            .map(|r| r.cells[0].as_str())
            .collect();
        assert_eq!(names, vec!["1", "2", "3"]);
        assert_eq!(plan.table.table.rows[0].cells[1], "2.35");
    }

    #[test]
    fn test_unknown_color_field() {
        let labels = FieldLabels::parse(LABELS).unwrap();
        let options = LayoutOptions::new("fields.json", "hill").with_color_code("missing");
        let result = plan_layout(&options, &labels, fields(1), date(), Path::new("projects"));
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_serializes() {
        let plan = plan(&LayoutOptions::new("fields.json", "hill"), 2);
        let json = plan.to_json().unwrap();
        assert!(json.contains("\"layout_name\": \"field layout\""));
        assert!(json.contains("\"kind\": \"outline\""));
    }
}
