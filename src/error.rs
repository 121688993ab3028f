//! Error types for the fieldmap-layout library

use thiserror::Error;

/// Result type alias using LayoutError
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while preparing a field map layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Reading an input file failed
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a data or options file
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed field label file
    #[error("Invalid label file: {0}")]
    InvalidLabels(String),

    /// A field name has no UI label
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Input is not a usable GeoJSON FeatureCollection
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Inconsistent layout options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Project path is neither a project file, a directory nor a bare name
    #[error("Invalid project path: {0}")]
    InvalidProjectPath(String),
}
