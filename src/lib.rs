//! # colseg
//!
//! Column segmentation and reading-order reconstruction for document page
//! layouts.
//!
//! Given a page's bounding box and the bounding boxes of the words on it,
//! colseg finds the column regions of the page and returns them, with their
//! text, in the order a human would read them. It implements Breuel's
//! whitespace-cover algorithm over the word boxes, filters the discovered
//! gaps down to genuine column separators, converts them into columns with
//! a scan-line sweep, and topologically sorts the columns into reading
//! order.
//!
//! The library is geometry-in, geometry-out: producing word boxes from a
//! document format (and rendering the ordered columns back out) is the
//! caller's business.
//!
//! ## Quick Start
//!
//! ```
//! use colseg::{segment_page, Rect, Word};
//!
//! fn main() -> colseg::Result<()> {
//!     let bound = Rect::new(0.0, 0.0, 200.0, 50.0);
//!     let words = vec![
//!         Word::new("left", Rect::new(0.0, 40.0, 60.0, 48.0)),
//!         Word::new("right", Rect::new(120.0, 40.0, 200.0, 48.0)),
//!     ];
//!
//!     let page = segment_page(bound, &words)?;
//!     for column in &page.columns {
//!         println!("{}: {}", column.bbox, column.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Whitespace cover solver**: recursive subdivision for sparse pages,
//!   a band-scan variant for dense ones
//! - **Gap filtering**: separation and absorption passes keep only gaps
//!   that really divide text
//! - **Reading order**: topological sort over an above/left-of relation
//! - **Parallel pages**: [`segment_pages`] fans independent pages out with
//!   Rayon

pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::Rect;
pub use layout::{GapDiscovery, PageSegmenter, SegmentOptions};
pub use model::{Column, PageSegmentation, Word};

use rayon::prelude::*;

/// Segment one page with default options.
///
/// # Arguments
///
/// * `bound` - The page rectangle
/// * `words` - The page's word records in extraction order
///
/// # Example
///
/// ```
/// use colseg::{segment_page, Rect, Word};
///
/// let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let page = segment_page(bound, &[]).unwrap();
/// assert_eq!(page.columns.len(), 1);
/// ```
pub fn segment_page(bound: Rect, words: &[Word]) -> Result<PageSegmentation> {
    PageSegmenter::new().segment(&bound, words)
}

/// Segment one page with custom options.
///
/// # Example
///
/// ```
/// use colseg::{segment_page_with_options, Rect, SegmentOptions, Word};
///
/// let options = SegmentOptions::new().with_search_width(20.0);
/// let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let page = segment_page_with_options(bound, &[], options).unwrap();
/// assert_eq!(page.columns.len(), 1);
/// ```
pub fn segment_page_with_options(
    bound: Rect,
    words: &[Word],
    options: SegmentOptions,
) -> Result<PageSegmentation> {
    PageSegmenter::with_options(options).segment(&bound, words)
}

/// Segment many pages, in parallel unless the options say otherwise.
///
/// Pages are independent: each returns its own `Result`, and one failed
/// page never blocks the others.
pub fn segment_pages(
    pages: &[(Rect, Vec<Word>)],
    options: &SegmentOptions,
) -> Vec<Result<PageSegmentation>> {
    let segmenter = PageSegmenter::with_options(options.clone());
    let segment = |(bound, words): &(Rect, Vec<Word>)| {
        let result = segmenter.segment(bound, words);
        if let Err(e) = &result {
            log::warn!("failed to segment page {bound}: {e}");
        }
        result
    };
    if options.parallel {
        pages.par_iter().map(segment).collect()
    } else {
        pages.iter().map(segment).collect()
    }
}
