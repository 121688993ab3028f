//! Polygon colour schemes
//!
//! Only the choice of scheme and its class table are decided here; drawing
//! the symbols is left to the GIS application.

use serde::Serialize;
use tracing::debug;

/// RGBA colour with components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create an opaque RGB colour (values should be 0.0-1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Create a colour with transparency
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create a colour from 0-255 channel values
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_bytes(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Linear blend towards `other`; `t` of 0 is `self`, 1 is `other`
    pub fn lerp(&self, other: &Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r * (1.0 - t) + other.r * t,
            self.g * (1.0 - t) + other.g * t,
            self.b * (1.0 - t) + other.b * t,
            self.a * (1.0 - t) + other.a * t,
        )
    }
}

/// P and K soil index classes: red, yellow, green, blue for 1 to 4
pub const P_K_INDEX_COLORS: [(i64, &str); 4] = [
    (1, "#FF0000"),
    (2, "#FCFC0C"),
    (3, "#00FF00"),
    (4, "#0011FF"),
];

/// Fixed soil pH classes
pub const PH_CLASSES: [(f64, f64, &str); 9] = [
    (0.0, 5.5, "#f00000"),
    (5.6, 5.9, "#f08000"),
    (6.0, 6.2, "#e0f000"),
    (6.3, 6.5, "#80ff00"),
    (6.6, 6.8, "#00ff80"),
    (6.9, 7.1, "#40a0ff"),
    (7.2, 7.4, "#a060ff"),
    (7.5, 7.6, "#8000ff"),
    (7.7, 14.0, "#ff00ff"),
];

/// Number of classes in a graduated scheme
pub const GRADUATED_CLASSES: usize = 10;

/// Ends of the graduated colour ramp
pub const RAMP_START: &str = "#f7fcf5";
pub const RAMP_END: &str = "#00441b";

/// Border width of the plain outline style
pub const OUTLINE_WIDTH: f32 = 2.0;

/// One value of a categorised scheme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryClass {
    pub value: i64,
    pub color: Color,
    pub label: String,
}

/// One value range of a ranged or graduated scheme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClass {
    pub lower: f64,
    pub upper: f64,
    pub color: Color,
    pub label: String,
}

/// How the field polygons are coloured
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorScheme {
    /// Tinted fill with a white border, used when nothing is colour coded
    Outline {
        fill: Color,
        border: Color,
        border_width: f32,
    },
    /// Discrete P/K index values
    Categorized {
        field: String,
        classes: Vec<CategoryClass>,
    },
    /// Fixed pH bands
    Ranged {
        field: String,
        classes: Vec<RangeClass>,
    },
    /// Equal-interval classes over the field's values
    Graduated {
        field: String,
        classes: Vec<RangeClass>,
    },
}

impl ColorScheme {
    /// Plain outline style
    pub fn outline() -> Self {
        Self::Outline {
            fill: Color::from_bytes(3, 190, 0, 80),
            border: Color::white(),
            border_width: OUTLINE_WIDTH,
        }
    }

    /// Choose a scheme for the colour-coded column `field` (a UI label).
    ///
    /// `values` are the column's numeric values, used for graduated classes.
    pub fn for_field(field: Option<&str>, values: &[f64]) -> Self {
        let scheme = match field {
            None | Some("") => Self::outline(),
            Some(f) if f.contains("index") => Self::Categorized {
                field: f.to_string(),
                classes: index_classes(),
            },
            Some(f) if f.starts_with("pH") => Self::Ranged {
                field: f.to_string(),
                classes: ph_classes(),
            },
            Some(f) => Self::Graduated {
                field: f.to_string(),
                classes: graduated_classes(values, GRADUATED_CLASSES),
            },
        };
        debug!("Selected colour scheme {:?}", scheme.kind());
        scheme
    }

    /// Short name of the scheme kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Outline { .. } => "outline",
            Self::Categorized { .. } => "categorized",
            Self::Ranged { .. } => "ranged",
            Self::Graduated { .. } => "graduated",
        }
    }

    /// Whether the scheme has classes worth a legend
    pub fn has_classes(&self) -> bool {
        !matches!(self, Self::Outline { .. })
    }
}

fn index_classes() -> Vec<CategoryClass> {
    P_K_INDEX_COLORS
        .iter()
        .filter_map(|&(value, hex)| {
            Some(CategoryClass {
                value,
                color: Color::from_hex(hex)?,
                label: value.to_string(),
            })
        })
        .collect()
}

fn ph_classes() -> Vec<RangeClass> {
    PH_CLASSES
        .iter()
        .filter_map(|&(lower, upper, hex)| {
            Some(RangeClass {
                lower,
                upper,
                color: Color::from_hex(hex)?,
                label: format!("{:.1}-{:.1}", lower, upper),
            })
        })
        .collect()
}

/// Split the range of `values` into `classes` equal intervals.
///
/// Empty input gives no breaks; constant input gives a single interval.
pub fn equal_interval_breaks(values: &[f64], classes: usize) -> Vec<(f64, f64)> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if classes == 0 || min > max {
        return Vec::new();
    }
    if min == max {
        return vec![(min, max)];
    }

    let step = (max - min) / classes as f64;
    (0..classes)
        .map(|i| {
            let lower = min + step * i as f64;
            // Pin the last upper bound so rounding cannot drop the maximum
            let upper = if i + 1 == classes {
                max
            } else {
                min + step * (i + 1) as f64
            };
            (lower, upper)
        })
        .collect()
}

fn graduated_classes(values: &[f64], classes: usize) -> Vec<RangeClass> {
    let breaks = equal_interval_breaks(values, classes);
    let (Some(start), Some(end)) = (Color::from_hex(RAMP_START), Color::from_hex(RAMP_END)) else {
        return Vec::new();
    };
    let last = breaks.len().saturating_sub(1).max(1) as f32;

    breaks
        .into_iter()
        .enumerate()
        .map(|(i, (lower, upper))| RangeClass {
            lower,
            upper,
            color: start.lerp(&end, i as f32 / last),
            label: format!("{:.2} - {:.2}", lower, upper),
        })
        .collect()
}
