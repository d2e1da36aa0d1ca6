//! Gap filtering: keep only whitespace rectangles that genuinely separate
//! text.
//!
//! Two passes over the cover, always in this order: the separation test
//! drops gaps without enough flanking text, then absorption drops gaps made
//! redundant by a wider compatible gap.

use crate::geometry::{intersecting, y_span, Rect};
use crate::layout::options::SegmentOptions;

// Margin trimmed off the top and bottom of the between-gaps region so
// rounding slivers do not block absorption.
const ABSORB_TRIM: f64 = 2.0;

/// Reduce a raw cover to the gaps worth perforating the page with.
pub fn filter_gaps(cover: Vec<Rect>, obstacles: &[Rect], opts: &SegmentOptions) -> Vec<Rect> {
    let total = cover.len();
    let wide: Vec<Rect> = cover
        .into_iter()
        .filter(|g| g.width() >= opts.min_gap_width)
        .collect();
    let separating = remove_non_separating(wide, obstacles, opts.search_width);
    let reduced = absorb_cover(separating, obstacles);
    log::debug!("filter gaps: {total} -> {}", reduced.len());
    reduced
}

// Keep the gaps that separate obstacles: flanking text on both sides.
fn remove_non_separating(cover: Vec<Rect>, obstacles: &[Rect], search_width: f64) -> Vec<Rect> {
    let before = cover.len();
    let kept: Vec<Rect> = cover
        .into_iter()
        .filter(|r| separates(r, search_width, obstacles))
        .collect();
    log::debug!("separation test: {before} -> {}", kept.len());
    kept
}

// A gap separates text when the obstacles within `width` of each of its
// sides span a vertical extent greater than `width` — one stray word next
// to a sliver does not make a column boundary.
fn separates(r: &Rect, width: f64, obstacles: &[Rect]) -> bool {
    let left_band = Rect::new(r.x0 - width, r.y0, r.x1, r.y1);
    let right_band = Rect::new(r.x0, r.y0, r.x1 + width, r.y1);
    let dy_left = y_span(&intersecting(obstacles, &left_band));
    let dy_right = y_span(&intersecting(obstacles, &right_band));
    matches!((dy_left, dy_right), (Some(l), Some(rr)) if l > width && rr > width)
}

/// Remove gaps that another surviving gap makes redundant.
///
/// A gap is absorbed when some not-yet-absorbed gap covers its vertical
/// extent and the region between the two contains no obstacle: the pair
/// could be one wider gap, so the smaller is noise. Survivors come back in
/// ascending (height, width) order. Applying this pass to its own output
/// changes nothing.
pub fn absorb_cover(mut cover: Vec<Rect>, obstacles: &[Rect]) -> Vec<Rect> {
    // Scan order is left to right, top to bottom.
    cover.sort_by(|a, b| a.x0.total_cmp(&b.x0).then(b.y0.total_cmp(&a.y0)));
    let mut by_size: Vec<usize> = (0..cover.len()).collect();
    by_size.sort_by(|&i, &j| {
        cover[i]
            .height()
            .total_cmp(&cover[j].height())
            .then(cover[i].width().total_cmp(&cover[j].width()))
            .then(i.cmp(&j))
    });

    let mut absorbed = vec![false; cover.len()];
    for i in 0..cover.len() {
        if absorbed_by(&cover, obstacles, i, &absorbed) {
            absorbed[i] = true;
            log::debug!("absorbed gap {}", cover[i]);
        }
    }

    by_size
        .into_iter()
        .filter(|&i| !absorbed[i])
        .map(|i| cover[i])
        .collect()
}

// True if some other non-absorbed gap covers `cover[i0]`'s vertical extent
// with nothing but whitespace between them. Scans right then left.
fn absorbed_by(cover: &[Rect], obstacles: &[Rect], i0: usize, absorbed: &[bool]) -> bool {
    let r0 = cover[i0];

    for (i, r) in cover.iter().enumerate().skip(i0 + 1) {
        if absorbed[i] {
            continue;
        }
        if r.y0 <= r0.y0 && r.y1 >= r0.y1 {
            let between = Rect::new(r0.x0, r0.y0 + ABSORB_TRIM, r.x0, r0.y1 - ABSORB_TRIM);
            if intersecting(obstacles, &between).is_empty() {
                return true;
            }
        }
    }
    for (i, r) in cover.iter().enumerate().take(i0).rev() {
        if absorbed[i] {
            continue;
        }
        if r.y0 <= r0.y0 && r.y1 >= r0.y1 {
            let between = Rect::new(r.x1, r0.y0 + ABSORB_TRIM, r0.x1, r0.y1 - ABSORB_TRIM);
            if intersecting(obstacles, &between).is_empty() {
                return true;
            }
        }
    }
    false
}
