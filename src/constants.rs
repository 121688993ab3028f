//! Constants for page dimensions, table sizing and map furniture
//!
//! All lengths are in millimetres on the layout page.

/// A1 landscape page width in millimetres
pub const A1_LANDSCAPE_WIDTH: f32 = 841.0;

/// A1 landscape page height in millimetres
pub const A1_LANDSCAPE_HEIGHT: f32 = 594.0;

/// Space kept clear around the page edge
pub const PAGE_PADDING: f32 = 15.0;

/// Extra inset for items placed over or beside the map
pub const MAP_PADDING: f32 = 10.0;

/// Width of each attribute table column
pub const DEFAULT_COLUMN_WIDTH: f32 = 45.0;

/// Starting content font size for the table fit search
pub const DEFAULT_CONTENT_SIZE: u32 = 9;

/// Maximum vertical extent of the attribute table
pub const MAX_TABLE_HEIGHT: f32 = 480.0;

/// Cell margin used by the table height model
pub const DEFAULT_CELL_MARGIN: f32 = 0.75;

/// Grid stroke width used by the table height model
pub const DEFAULT_LINE_WIDTH: f32 = 0.5;

/// Smallest content font size the fit search will descend to
pub const MIN_CONTENT_SIZE: u32 = 1;

/// Largest starting content font size accepted in layout options
pub const MAX_CONTENT_SIZE: u32 = 200;

/// Most rows the attribute table renders
pub const MAX_TABLE_ROWS: usize = 100;

/// Stroke width of the frame drawn around the attribute table
pub const TABLE_FRAME_STROKE: f32 = 0.5;

/// Legend box width
pub const LEGEND_WIDTH: f32 = 50.0;

/// Legend box height
pub const LEGEND_HEIGHT: f32 = 85.0;

/// Table heights above this push the legend to its fallback position
pub const LEGEND_RELOCATE_THRESHOLD: f32 = 400.0;

/// Legend position used when the table is too tall to stack above it
pub const LEGEND_FALLBACK_POSITION: (f32, f32) = (115.0, 500.0);

/// Vertical distance between footer labels
pub const FOOTER_SPACING: f32 = 10.0;

/// Footer label font size in points
pub const FOOTER_FONT_SIZE: f32 = 16.0;

/// Hectares to acres
pub const HECTARES_TO_ACRES: f64 = 2.47105;

/// North arrow picture size
pub const NORTH_ARROW_SIZE: (f32, f32) = (40.0, 60.0);

/// Frame stroke around inset maps
pub const INSET_FRAME_STROKE: f32 = 5.0;

/// Offset between successive inset maps
pub const INSET_STEP: f32 = 50.0;

/// Coordinate reference system of the generated project
pub const PROJECT_CRS: &str = "EPSG:32629";

/// Satellite imagery basemap
pub const BASEMAP_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";

/// Default directory for project files given by bare name
pub const DEFAULT_PROJECT_DIR: &str = "projects";

/// Default field-name to UI-label file
pub const DEFAULT_LABELS_FILE: &str = "attribute_names.txt";
