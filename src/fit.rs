//! Attribute table font fitting
//!
//! The table is modelled as one header row followed by one row per feature.
//! Its height is linear in the row count and in both font sizes, so the
//! largest content size that keeps the table inside the page budget can be
//! found by stepping down from a starting size.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Fixed limits the fitted table must respect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderBudget {
    /// Maximum total table height
    pub max_table_height: f32,
    /// Margin above and below the text of every cell
    pub margin: f32,
    /// Grid stroke width
    pub line_width: f32,
    /// Lowest content size the search may return
    pub min_content_size: u32,
}

impl Default for RenderBudget {
    fn default() -> Self {
        Self {
            max_table_height: MAX_TABLE_HEIGHT,
            margin: DEFAULT_CELL_MARGIN,
            line_width: DEFAULT_LINE_WIDTH,
            min_content_size: MIN_CONTENT_SIZE,
        }
    }
}

impl RenderBudget {
    /// Set the maximum table height
    pub fn with_max_height(mut self, height: f32) -> Self {
        self.max_table_height = height;
        self
    }

    /// Set the cell margin
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the content size floor
    pub fn with_min_content_size(mut self, size: u32) -> Self {
        self.min_content_size = size;
        self
    }

    /// Table height for this budget's margin and line width
    pub fn table_height(&self, feature_count: usize, header_size: f32, content_size: f32) -> f32 {
        table_height(
            feature_count,
            header_size,
            content_size,
            self.margin,
            self.line_width,
        )
    }

    /// Whether a table with `content_size` text (and a header one size larger) fits
    pub fn fits(&self, feature_count: usize, content_size: u32) -> bool {
        let header_size = content_size.saturating_add(1);
        let height = self.table_height(feature_count, header_size as f32, content_size as f32);
        height <= self.max_table_height
    }

    /// One above the largest size the height formula allows, so the linear
    /// search skips sizes that cannot fit.
    fn search_ceiling(&self, feature_count: usize) -> u32 {
        let fixed = self.table_height(feature_count, 1.0, 0.0);
        let per_size = 1.0 + feature_count as f32;
        let bound = ((self.max_table_height - fixed) / per_size).floor();
        if bound >= 0.0 {
            (bound as u32).saturating_add(1)
        } else {
            0
        }
    }

    /// Largest content size not above `starting_size` whose table fits.
    ///
    /// Returns the floor size when nothing fits; the caller can tell by
    /// checking [`RenderBudget::fits`] or by using [`fit_table`].
    pub fn select_content_size(&self, feature_count: usize, starting_size: u32) -> u32 {
        // A zero start searches from the smallest usable size
        let start = starting_size.max(1);
        // The floor never raises a size above where the search started
        let floor = self.min_content_size.max(1).min(start);
        let mut size = start.min(self.search_ceiling(feature_count).max(floor));

        loop {
            if self.fits(feature_count, size) {
                trace!("Content size {} fits {} rows", size, feature_count);
                return size;
            }
            if size <= floor {
                debug!(
                    "No content size fits {} rows, stopping at floor {}",
                    feature_count, size
                );
                return size;
            }
            size -= 1;
        }
    }
}

/// Input to a table fit: row count and where to start searching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRequest {
    pub feature_count: usize,
    pub starting_content_size: u32,
}

impl FitRequest {
    /// Create a request starting from the default content size
    pub fn new(feature_count: usize) -> Self {
        Self {
            feature_count,
            starting_content_size: DEFAULT_CONTENT_SIZE,
        }
    }

    /// Override the starting content size
    pub fn with_starting_size(mut self, size: u32) -> Self {
        self.starting_content_size = size;
        self
    }
}

/// Chosen font sizes and the resulting table height
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub content_size: u32,
    pub header_size: u32,
    pub table_height: f32,
    /// False when the floor was reached and the table overflows the budget
    pub within_budget: bool,
}

/// Height of a table with one header row and `feature_count` content rows.
///
/// The header row carries its text, a margin on each side and two strokes;
/// each content row carries its text, a margin on each side and one stroke.
pub fn table_height(
    feature_count: usize,
    header_size: f32,
    content_size: f32,
    margin: f32,
    line_width: f32,
) -> f32 {
    let header = header_size + 2.0 * margin + 2.0 * line_width;
    let row = content_size + 2.0 * margin + line_width;
    header + feature_count as f32 * row
}

/// Largest content size not above `starting_size` that fits `max_height`,
/// using the default margin, line width and floor.
pub fn select_content_size(feature_count: usize, starting_size: u32, max_height: f32) -> u32 {
    RenderBudget::default()
        .with_max_height(max_height)
        .select_content_size(feature_count, starting_size)
}

/// Fit the table described by `request` into `budget`
#[instrument(skip(budget), fields(max_height = budget.max_table_height))]
pub fn fit_table(request: FitRequest, budget: &RenderBudget) -> FitResult {
    let content_size =
        budget.select_content_size(request.feature_count, request.starting_content_size);
    let header_size = content_size.saturating_add(1);
    let table_height = budget.table_height(
        request.feature_count,
        header_size as f32,
        content_size as f32,
    );
    let within_budget = table_height <= budget.max_table_height;

    debug!(
        "Fitted {} rows at content size {} (height {})",
        request.feature_count, content_size, table_height
    );

    FitResult {
        content_size,
        header_size,
        table_height,
        within_budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_height() {
        assert_eq!(table_height(0, 10.0, 9.0, 0.75, 0.5), 12.5);
    }

    #[test]
    fn test_table_height_with_rows() {
        assert_eq!(table_height(100, 10.0, 9.0, 0.75, 0.5), 1112.5);
        assert_eq!(table_height(100, 4.0, 3.0, 0.75, 0.5), 506.5);
        assert_eq!(table_height(100, 3.0, 2.0, 0.75, 0.5), 405.5);
    }

    #[test]
    fn test_unit_margin_variant() {
        // 10 + 2 + 1 + 10 * (9 + 2 + 0.5)
        assert_eq!(table_height(10, 10.0, 9.0, 1.0, 0.5), 128.0);
    }

    #[test]
    fn test_height_is_monotonic() {
        for n in 0..200 {
            for size in 1..20 {
                let s = size as f32;
                let base = table_height(n, s + 1.0, s, 0.75, 0.5);
                assert!(table_height(n + 1, s + 1.0, s, 0.75, 0.5) >= base);
                assert!(table_height(n, s + 2.0, s, 0.75, 0.5) >= base);
                assert!(table_height(n, s + 1.0, s + 1.0, 0.75, 0.5) >= base);
            }
        }
    }

    #[test]
    fn test_no_rows_keeps_starting_size() {
        assert_eq!(select_content_size(0, 9, 480.0), 9);
    }

    #[test]
    fn test_hundred_rows_steps_down() {
        assert_eq!(select_content_size(100, 9, 480.0), 2);
    }

    #[test]
    fn test_floor_stops_search() {
        let budget = RenderBudget::default();
        let result = fit_table(FitRequest::new(500), &budget);
        assert_eq!(result.content_size, 1);
        assert_eq!(result.header_size, 2);
        assert!(!result.within_budget);
        assert!(result.table_height > budget.max_table_height);
    }

    #[test]
    fn test_custom_floor() {
        let budget = RenderBudget::default().with_min_content_size(4);
        let result = fit_table(FitRequest::new(100), &budget);
        assert_eq!(result.content_size, 4);
        assert!(!result.within_budget);
    }

    #[test]
    fn test_floor_never_raises_size() {
        let budget = RenderBudget::default().with_min_content_size(6);
        let size = budget.select_content_size(1000, 3);
        assert_eq!(size, 3);
    }

    #[test]
    fn test_selected_size_properties() {
        let budget = RenderBudget::default();
        for n in 0..300 {
            for start in 1..16 {
                let size = budget.select_content_size(n, start);
                assert!(size <= start);
                assert!(size >= 1);
                if budget.fits(n, size) {
                    // Largest fitting size: the next size up must not fit
                    if size < start {
                        assert!(!budget.fits(n, size + 1));
                    }
                } else {
                    assert_eq!(size, 1);
                }
            }
        }
    }

    #[test]
    fn test_zero_start_uses_smallest_size() {
        let result = fit_table(
            FitRequest::new(10).with_starting_size(0),
            &RenderBudget::default(),
        );
        assert_eq!(result.content_size, 1);
        assert_eq!(result.header_size, 2);
        assert!(result.within_budget);
        assert_eq!(select_content_size(0, 0, 480.0), 1);
    }

    #[test]
    fn test_huge_start_does_not_overflow() {
        let budget = RenderBudget::default();
        let result = fit_table(FitRequest::new(0).with_starting_size(u32::MAX), &budget);
        // 0 rows: size s gives s + 1 + 2.5, so 476 is the largest that fits 480
        assert_eq!(result.content_size, 476);
        assert_eq!(result.header_size, 477);
        assert!(result.within_budget);
        assert!(!budget.fits(0, u32::MAX));
    }

    #[test]
    fn test_large_start_matches_step_search() {
        let budget = RenderBudget::default();
        for n in [0, 1, 7, 50, 100] {
            let mut expected = 600;
            while expected > 1 && !budget.fits(n, expected) {
                expected -= 1;
            }
            assert_eq!(budget.select_content_size(n, 600), expected);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let budget = RenderBudget::default().with_margin(1.0);
        let request = FitRequest::new(42).with_starting_size(12);
        assert_eq!(fit_table(request, &budget), fit_table(request, &budget));
    }

    #[test]
    fn test_fit_result_header_is_one_larger() {
        let result = fit_table(FitRequest::new(30), &RenderBudget::default());
        assert_eq!(result.header_size, result.content_size + 1);
        assert!(result.within_budget);
    }
}
