//! Page segmentation pipeline.
//!
//! Word boxes become obstacles; a whitespace cover solver finds the gaps
//! between them; the gap filter keeps the gaps that separate real text;
//! a scan-line sweep turns the survivors into columns; the columns are
//! topologically sorted into reading order; finally each word's text lands
//! in its best-matching column.

mod assign;
mod cover;
mod filter;
mod index;
mod options;
mod order;
mod scan;

pub use assign::{column_text, group_lines};
pub use cover::{band_cover, whitespace_cover};
pub use filter::{absorb_cover, filter_gaps};
pub use index::{IndexedRect, RectIndex};
pub use options::{GapDiscovery, SegmentOptions};
pub use order::{before, sort_reading_order};
pub use scan::{scan_columns, ScannedColumn};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::{Column, PageSegmentation, Word};

/// The segmentation engine for one or more pages.
///
/// A segmenter holds only configuration; every [`segment`](Self::segment)
/// call builds and discards its own index, solver queue and scan state, so
/// one segmenter can serve any number of pages, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct PageSegmenter {
    options: SegmentOptions,
}

impl PageSegmenter {
    /// Create a segmenter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a segmenter with custom options.
    pub fn with_options(options: SegmentOptions) -> Self {
        Self { options }
    }

    /// The segmenter's options.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Segment one page into columns in reading order.
    ///
    /// `bound` is the page rectangle (or a sub-region of it); `words` are
    /// the page's word records in extraction order. A page without words
    /// yields a single empty column equal to the bound.
    ///
    /// # Errors
    ///
    /// Precondition violations (invalid options, degenerate bound or word
    /// boxes) and internal invariant failures abort this page only; the
    /// segmenter stays usable.
    pub fn segment(&self, bound: &Rect, words: &[Word]) -> Result<PageSegmentation> {
        self.options.validate()?;
        if !bound.is_valid() {
            return Err(Error::DegenerateRect {
                context: "page bound",
                rect: *bound,
            });
        }
        if words.is_empty() {
            return Ok(PageSegmentation {
                bound: *bound,
                columns: vec![Column {
                    id: 1,
                    bbox: *bound,
                    text: String::new(),
                }],
            });
        }
        for w in words {
            if !w.bbox.is_valid() {
                return Err(Error::DegenerateRect {
                    context: "word box",
                    rect: w.bbox,
                });
            }
        }

        // Obstacles are the word boxes clipped to the bound; words outside
        // it still take part in text assignment.
        let obstacles: Vec<Rect> = words
            .iter()
            .filter_map(|w| w.bbox.intersection(bound))
            .collect();

        let cover = match self.discovery_for(obstacles.len()) {
            GapDiscovery::ScanBands => band_cover(bound, &obstacles, &self.options)?,
            _ => whitespace_cover(bound, &obstacles, &self.options)?,
        };
        let gaps = filter_gaps(cover, &obstacles, &self.options);
        let scanned = scan_columns(bound, &gaps)?;

        let rects: Vec<Rect> = scanned.iter().map(|c| c.rect).collect();
        let order = sort_reading_order(&rects)?;
        let ordered: Vec<ScannedColumn> = order.iter().map(|&i| scanned[i]).collect();

        let lines = group_lines(words);
        let texts = column_text(words, &lines, &ordered.iter().map(|c| c.rect).collect::<Vec<_>>());

        let columns = ordered
            .into_iter()
            .zip(texts)
            .map(|(c, text)| Column {
                id: c.id,
                bbox: c.rect,
                text,
            })
            .collect();
        log::debug!(
            "segmented page {bound}: words={} gaps={} columns={}",
            words.len(),
            gaps.len(),
            order.len()
        );
        Ok(PageSegmentation {
            bound: *bound,
            columns,
        })
    }

    fn discovery_for(&self, obstacle_count: usize) -> GapDiscovery {
        match self.options.gap_discovery {
            GapDiscovery::Auto if obstacle_count > self.options.scan_band_threshold => {
                GapDiscovery::ScanBands
            }
            GapDiscovery::Auto => GapDiscovery::Subdivision,
            fixed => fixed,
        }
    }
}
