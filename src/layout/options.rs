//! Segmentation options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options controlling the segmentation pipeline.
///
/// The defaults are tuned for Letter/A4 pages measured in points; all
/// distances are in page units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOptions {
    /// Height of one horizontal band in the band-scan cover variant.
    pub scan_window_height: f64,

    /// Minimum width a gap must have to be considered a column separator.
    pub min_gap_width: f64,

    /// How far to look left and right of a gap when testing whether it
    /// separates real text.
    pub search_width: f64,

    /// Maximum fractional overlap allowed between two accepted gaps.
    pub max_overlap_fraction: f64,

    /// Perimeter cap on pivot candidates. `None` derives the cap from the
    /// page bound.
    pub max_perimeter: Option<f64>,

    /// Pivot proximity threshold as a fraction of the bound diagonal.
    pub pivot_proximity_fraction: f64,

    /// Maximum number of gaps accepted into one cover.
    pub max_cover_boxes: usize,

    /// Pop budget for the cover solver's priority queue. Exhausting it
    /// returns the cover accumulated so far.
    pub max_pop_budget: usize,

    /// Minimum height/width for a tall candidate region.
    pub min_accept_height: f64,
    /// Minimum width paired with `min_accept_height`.
    pub min_accept_width: f64,
    /// Minimum height for a wide candidate region.
    pub alt_accept_height: f64,
    /// Minimum width paired with `alt_accept_height`.
    pub alt_accept_width: f64,

    /// How gaps are discovered.
    pub gap_discovery: GapDiscovery,

    /// Obstacle count above which `GapDiscovery::Auto` switches to the
    /// band-scan variant.
    pub scan_band_threshold: usize,

    /// Recursion ceiling for the neighbor-connectivity step.
    pub max_connect_depth: usize,

    /// Whether `segment_pages` processes pages in parallel.
    pub parallel: bool,
}

impl SegmentOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the band height of the band-scan variant.
    pub fn with_scan_window_height(mut self, height: f64) -> Self {
        self.scan_window_height = height;
        self
    }

    /// Set the minimum separator gap width.
    pub fn with_min_gap_width(mut self, width: f64) -> Self {
        self.min_gap_width = width;
        self
    }

    /// Set the separation-test search width.
    pub fn with_search_width(mut self, width: f64) -> Self {
        self.search_width = width;
        self
    }

    /// Set the maximum fractional overlap between accepted gaps.
    pub fn with_max_overlap_fraction(mut self, fraction: f64) -> Self {
        self.max_overlap_fraction = fraction;
        self
    }

    /// Set an explicit pivot perimeter cap.
    pub fn with_max_perimeter(mut self, perimeter: f64) -> Self {
        self.max_perimeter = Some(perimeter);
        self
    }

    /// Set the maximum number of gaps per cover.
    pub fn with_max_cover_boxes(mut self, boxes: usize) -> Self {
        self.max_cover_boxes = boxes;
        self
    }

    /// Set the solver pop budget.
    pub fn with_max_pop_budget(mut self, budget: usize) -> Self {
        self.max_pop_budget = budget;
        self
    }

    /// Select how gaps are discovered.
    pub fn with_gap_discovery(mut self, discovery: GapDiscovery) -> Self {
        self.gap_discovery = discovery;
        self
    }

    /// Disable parallel processing in `segment_pages`.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that every option is in its valid range.
    ///
    /// Called by the pipeline before any geometry work; a violation is a
    /// precondition error, never silently coerced.
    pub fn validate(&self) -> Result<()> {
        if self.scan_window_height <= 0.0 {
            return Err(Error::InvalidOption {
                name: "scan_window_height",
                value: self.scan_window_height,
            });
        }
        if self.min_gap_width <= 0.0 {
            return Err(Error::InvalidOption {
                name: "min_gap_width",
                value: self.min_gap_width,
            });
        }
        if self.search_width <= 0.0 {
            return Err(Error::InvalidOption {
                name: "search_width",
                value: self.search_width,
            });
        }
        if !(0.0..=1.0).contains(&self.max_overlap_fraction) {
            return Err(Error::InvalidOption {
                name: "max_overlap_fraction",
                value: self.max_overlap_fraction,
            });
        }
        if !(0.0..=1.0).contains(&self.pivot_proximity_fraction) {
            return Err(Error::InvalidOption {
                name: "pivot_proximity_fraction",
                value: self.pivot_proximity_fraction,
            });
        }
        if let Some(p) = self.max_perimeter {
            if p <= 0.0 {
                return Err(Error::InvalidOption {
                    name: "max_perimeter",
                    value: p,
                });
            }
        }
        if self.max_connect_depth == 0 {
            return Err(Error::InvalidOption {
                name: "max_connect_depth",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            scan_window_height: 20.0,
            min_gap_width: 10.0,
            search_width: 60.0,
            max_overlap_fraction: 0.01,
            max_perimeter: None,
            pivot_proximity_fraction: 0.01,
            max_cover_boxes: 20,
            max_pop_budget: 20_000,
            min_accept_height: 30.0,
            min_accept_width: 10.0,
            alt_accept_height: 5.0,
            alt_accept_width: 50.0,
            gap_discovery: GapDiscovery::Auto,
            scan_band_threshold: 400,
            max_connect_depth: 64,
            parallel: true,
        }
    }
}

/// Strategy for discovering whitespace gaps between words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GapDiscovery {
    /// Recursive subdivision for sparse pages, band scanning above
    /// `scan_band_threshold` obstacles.
    #[default]
    Auto,
    /// Always use the recursive-subdivision solver.
    Subdivision,
    /// Always use the band-scan solver.
    ScanBands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = SegmentOptions::new()
            .with_search_width(30.0)
            .with_min_gap_width(8.0)
            .with_max_cover_boxes(12)
            .with_gap_discovery(GapDiscovery::Subdivision)
            .sequential();

        assert_eq!(options.search_width, 30.0);
        assert_eq!(options.min_gap_width, 8.0);
        assert_eq!(options.max_cover_boxes, 12);
        assert_eq!(options.gap_discovery, GapDiscovery::Subdivision);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = SegmentOptions::default();
        assert_eq!(options.scan_window_height, 20.0);
        assert_eq!(options.max_pop_budget, 20_000);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let options = SegmentOptions::new().with_search_width(-1.0);
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidOption {
                name: "search_width",
                ..
            })
        ));

        let options = SegmentOptions::new().with_max_overlap_fraction(1.5);
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidOption {
                name: "max_overlap_fraction",
                ..
            })
        ));

        let options = SegmentOptions::new().with_scan_window_height(0.0);
        assert!(options.validate().is_err());
    }
}
