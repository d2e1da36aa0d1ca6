//! Error types for the colseg library.

use thiserror::Error;

use crate::geometry::Rect;

/// Result type alias for colseg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during page segmentation.
///
/// Precondition violations (`DegenerateRect` on inputs, `NoObstacles`,
/// `InvalidOption`) mean the caller handed the engine something it refuses
/// to coerce. The remaining variants report internal invariant failures:
/// they abort the current page and indicate a defect in the algorithm or
/// inconsistent inputs, never a recoverable condition.
///
/// Budget exhaustion in the cover solver and empty word lists are expected
/// outcomes, not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A rectangle fails the `left < right, bottom < top` invariant.
    #[error("degenerate rectangle in {context}: {rect}")]
    DegenerateRect {
        /// Where the rectangle was encountered.
        context: &'static str,
        /// The offending rectangle.
        rect: Rect,
    },

    /// An operation that requires a non-empty obstacle set received none.
    #[error("no obstacles available for {0}")]
    NoObstacles(&'static str),

    /// A configuration value is outside its valid range.
    #[error("invalid option {name}: {value}")]
    InvalidOption {
        /// Name of the option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An internal invariant was violated while processing a page.
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// The reading-order relation holds in both directions for a column pair.
    #[error("reading order relation is cyclic between columns {0} and {1}")]
    CyclicOrder(usize, usize),

    /// A column compares as coming before itself.
    #[error("reading order relation is reflexive for column {0}")]
    ReflexiveOrder(usize),

    /// Neighbor connectivity recursion exceeded its depth ceiling.
    #[error("neighbor search exceeded maximum depth {0}")]
    DepthExceeded(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoObstacles("pivot selection");
        assert_eq!(err.to_string(), "no obstacles available for pivot selection");

        let err = Error::CyclicOrder(2, 5);
        assert_eq!(
            err.to_string(),
            "reading order relation is cyclic between columns 2 and 5"
        );

        let err = Error::DepthExceeded(64);
        assert_eq!(err.to_string(), "neighbor search exceeded maximum depth 64");
    }

    #[test]
    fn test_degenerate_rect_display() {
        let err = Error::DegenerateRect {
            context: "word box",
            rect: Rect::new(10.0, 5.0, 10.0, 20.0),
        };
        assert!(err.to_string().contains("word box"));
    }
}
