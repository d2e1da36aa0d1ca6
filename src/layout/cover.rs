//! Whitespace cover discovery.
//!
//! Two ways of finding the maximal empty rectangles ("gaps") between word
//! boxes:
//!
//! - [`whitespace_cover`] is the recursive-subdivision solver after Breuel's
//!   whitespace cover algorithm ("Two Geometric Algorithms for Layout
//!   Analysis"): a max-priority queue of candidate regions, split at a pivot
//!   obstacle near the centroid, until empty regions surface.
//! - [`band_cover`] slices the page into horizontal bands, perforates each
//!   band with a left-to-right sweep over the words the spatial index
//!   reports for it, and merges vertically adjacent band gaps into tall
//!   gaps through the index's neighbor connectivity. It trades exactness
//!   for speed on dense pages.

use std::collections::{BinaryHeap, HashSet};

use crate::error::{Error, Result};
use crate::geometry::{directed_union, intersecting, union_all, Axis, Rect};
use crate::layout::index::RectIndex;
use crate::layout::options::SegmentOptions;

/// A candidate region in the cover search: its bound, the obstacles still
/// intersecting it, and the quality that orders the priority queue.
#[derive(Debug, Clone)]
struct PartitionElement {
    quality: f64,
    bound: Rect,
    obstacles: Vec<Rect>,
}

impl PartitionElement {
    fn new(bound: Rect, obstacles: Vec<Rect>) -> Self {
        Self {
            quality: elongation_quality(&bound),
            bound,
            obstacles,
        }
    }
}

impl PartialEq for PartitionElement {
    fn eq(&self, other: &Self) -> bool {
        self.quality == other.quality
    }
}

impl Eq for PartitionElement {}

impl PartialOrd for PartitionElement {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartitionElement {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.quality.total_cmp(&other.quality)
    }
}

// Quality favors elongated regions so column-like gaps are explored first:
// the dominant dimension weighs full, the other at a tenth.
fn elongation_quality(r: &Rect) -> f64 {
    let x = 0.1 * r.height() + r.width();
    let y = r.height() + 0.1 * r.width();
    (0.5 * x).max(y)
}

// Exact-coordinate key for duplicate suppression of queued bounds.
fn coord_key(r: &Rect) -> [u64; 4] {
    [
        r.x0.to_bits(),
        r.y0.to_bits(),
        r.x1.to_bits(),
        r.y1.to_bits(),
    ]
}

/// Best-effort maximal rectangle cover of the part of `bound` not occupied
/// by `obstacles`.
///
/// Returns at most `max_cover_boxes` gaps whose pairwise fractional overlap
/// stays under `max_overlap_fraction`; each gap has zero geometric
/// intersection with every obstacle. An empty obstacle set yields an empty
/// cover. Exhausting `max_pop_budget` is not an error: the cover
/// accumulated so far is returned.
pub fn whitespace_cover(
    bound: &Rect,
    obstacles: &[Rect],
    opts: &SegmentOptions,
) -> Result<Vec<Rect>> {
    if obstacles.is_empty() {
        return Ok(Vec::new());
    }
    if !bound.is_valid() {
        return Err(Error::DegenerateRect {
            context: "cover bound",
            rect: *bound,
        });
    }
    let max_perimeter = opts
        .max_perimeter
        .unwrap_or(bound.width() + bound.height() * 0.05);

    let mut queue = BinaryHeap::new();
    let mut queued: HashSet<[u64; 4]> = HashSet::new();
    let seed = PartitionElement::new(*bound, obstacles.to_vec());
    queued.insert(coord_key(&seed.bound));
    queue.push(seed);

    let mut cover: Vec<Rect> = Vec::new();
    let mut pops = 0usize;

    while let Some(element) = queue.pop() {
        queued.remove(&coord_key(&element.bound));
        pops += 1;
        if pops > opts.max_pop_budget {
            log::debug!(
                "cover pop budget exhausted: pops={} cover={}",
                pops,
                cover.len()
            );
            break;
        }

        if element.obstacles.is_empty() {
            // An empty region: recover the extent lost to the recursive
            // split, then accept unless it mostly repeats an accepted gap.
            let gap = grow_gap(&element.bound, bound, obstacles);
            if !gap.is_valid() {
                return Err(Error::DegenerateRect {
                    context: "grown gap",
                    rect: gap,
                });
            }
            debug_assert!(
                obstacles.iter().all(|o| !gap.intersects(o)),
                "grown gap {gap} intersects an obstacle"
            );
            if !crate::geometry::overlap_significant(&gap, &cover, opts.max_overlap_fraction) {
                log::debug!("cover[{}] = {gap}", cover.len());
                cover.push(gap);
                if cover.len() >= opts.max_cover_boxes {
                    break;
                }
            }
            continue;
        }

        // Accepted gaps act as obstacles from here on, steering later
        // subdivisions away from already covered whitespace.
        let mut blocking = element.obstacles.clone();
        blocking.extend_from_slice(&cover);
        let quadrants = subdivide(
            &element.bound,
            &blocking,
            max_perimeter,
            opts.pivot_proximity_fraction,
        )?;
        for quadrant in quadrants {
            if !accepts(opts, &quadrant) {
                continue;
            }
            let key = coord_key(&quadrant);
            if queued.contains(&key) {
                continue;
            }
            let sub_obstacles = intersecting(&element.obstacles, &quadrant);
            queued.insert(key);
            queue.push(PartitionElement::new(quadrant, sub_obstacles));
        }
    }

    log::debug!(
        "whitespace cover: obstacles={} pops={pops} gaps={}",
        obstacles.len(),
        cover.len()
    );
    Ok(cover)
}

// Minimum-size acceptance for candidate regions: tall-and-narrow or
// short-and-wide, nothing sliver-shaped.
fn accepts(opts: &SegmentOptions, r: &Rect) -> bool {
    (r.height() > opts.min_accept_height && r.width() > opts.min_accept_width)
        || (r.height() > opts.alt_accept_height && r.width() > opts.alt_accept_width)
}

// Grow an obstacle-free rectangle outward inside `bound`, one edge at a
// time, pulling each edge back to the envelope of the obstacles the
// extension runs into. Vertical growth first so column gaps recover their
// height before claiming width.
fn grow_gap(gap: &Rect, bound: &Rect, obstacles: &[Rect]) -> Rect {
    let mut r = *gap;

    r.y1 = bound.y1;
    if let Some(u) = union_all(&intersecting(obstacles, &r)) {
        r.y1 = u.y0;
    }
    r.y0 = bound.y0;
    if let Some(u) = union_all(&intersecting(obstacles, &r)) {
        r.y0 = u.y1;
    }
    r.x0 = bound.x0;
    if let Some(u) = union_all(&intersecting(obstacles, &r)) {
        r.x0 = u.x1;
    }
    r.x1 = bound.x1;
    if let Some(u) = union_all(&intersecting(obstacles, &r)) {
        r.x1 = u.x0;
    }
    r
}

// Two coordinates within a split tolerance; guards against quadrants that
// differ from their parent by a rounding sliver.
fn same(x0: f64, x1: f64) -> bool {
    (x0 - x1).abs() < 0.1
}

// Split `bound` into up to four sub-regions around a pivot obstacle: left
// and right of the pivot at full height, above and below it at full width.
// A side the pivot touches falls back to the margin outside the obstacle
// envelope, if any.
fn subdivide(bound: &Rect, obstacles: &[Rect], max_perimeter: f64, frac: f64) -> Result<Vec<Rect>> {
    let pivot = select_pivot(bound, obstacles, max_perimeter, frac)?;
    let pivot = match bound.intersection(&pivot) {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };
    let envelope = union_all(obstacles);

    let mut quadrants = Vec::with_capacity(4);
    if pivot.x0 > bound.x0 && !same(bound.x1, pivot.x0) {
        quadrants.push(Rect::new(bound.x0, bound.y0, pivot.x0, bound.y1));
    } else if let Some(u) = envelope {
        if bound.x0 < u.x0 {
            quadrants.push(Rect::new(bound.x0, bound.y0, u.x0, bound.y1));
        }
    }
    if pivot.x1 < bound.x1 && !same(bound.x0, pivot.x1) {
        quadrants.push(Rect::new(pivot.x1, bound.y0, bound.x1, bound.y1));
    } else if let Some(u) = envelope {
        if bound.x1 > u.x1 {
            quadrants.push(Rect::new(u.x1, bound.y0, bound.x1, bound.y1));
        }
    }
    if pivot.y1 < bound.y1 && !same(bound.y0, pivot.y1) {
        quadrants.push(Rect::new(bound.x0, pivot.y1, bound.x1, bound.y1));
    }
    if pivot.y0 > bound.y0 && !same(bound.y1, pivot.y0) {
        quadrants.push(Rect::new(bound.x0, bound.y0, bound.x1, pivot.y0));
    }

    for q in &quadrants {
        if !q.is_valid() {
            return Err(Error::Invariant(format!(
                "degenerate quadrant {q} from pivot {pivot} in {bound}"
            )));
        }
    }
    Ok(quadrants)
}

// Pick the pivot obstacle: the closest one within `frac` of the bound
// diagonal from the centroid, preferring obstacles under the perimeter
// cap; the nearest capped obstacle otherwise; the smallest obstacle when
// everything exceeds the cap.
fn select_pivot(bound: &Rect, obstacles: &[Rect], max_perimeter: f64, frac: f64) -> Result<Rect> {
    if !bound.is_valid() {
        return Err(Error::DegenerateRect {
            context: "pivot bound",
            rect: *bound,
        });
    }
    if obstacles.is_empty() {
        return Err(Error::NoObstacles("pivot selection"));
    }

    let (cx, cy) = bound.center();
    let diagonal = (bound.width().powi(2) + bound.height().powi(2)).sqrt();
    let threshold = frac * diagonal;

    let mut nearest: Option<(usize, f64)> = None;
    for (i, r) in obstacles.iter().enumerate() {
        if r.half_perimeter() > max_perimeter {
            continue;
        }
        let (ox, oy) = r.center();
        let dist = ((ox - cx).powi(2) + (oy - cy).powi(2)).sqrt();
        if dist <= threshold {
            return Ok(*r);
        }
        if nearest.map_or(true, |(_, best)| dist < best) {
            nearest = Some((i, dist));
        }
    }
    if let Some((i, _)) = nearest {
        return Ok(obstacles[i]);
    }

    // Everything is over the cap: fall back to the smallest obstacle.
    let smallest = obstacles
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.half_perimeter().total_cmp(&b.1.half_perimeter()))
        .map(|(i, _)| i)
        .unwrap_or(0);
    Ok(obstacles[smallest])
}

/// Gap discovery for dense pages: perforate horizontal bands of
/// `scan_window_height` and merge vertically adjacent band gaps into tall
/// gaps via the spatial index's neighbor connectivity.
pub fn band_cover(bound: &Rect, obstacles: &[Rect], opts: &SegmentOptions) -> Result<Vec<Rect>> {
    if obstacles.is_empty() {
        return Ok(Vec::new());
    }
    if !bound.is_valid() {
        return Err(Error::DegenerateRect {
            context: "cover bound",
            rect: *bound,
        });
    }
    let index = RectIndex::build(obstacles)?;
    let window = opts.scan_window_height;
    let bands = (bound.height() / window).ceil() as usize;

    let mut band_gaps: Vec<Rect> = Vec::new();
    for i in 0..bands {
        let y1 = bound.y1 - i as f64 * window;
        let y0 = (y1 - window).max(bound.y0);
        if y0 >= y1 {
            break;
        }
        let ids = index.intersect_y(y0, y1)?;
        let words = index.rects_of(&ids);
        let band = Rect::new(bound.x0, y0, bound.x1, y1);
        let holes = poke_holes(&band, &words)?;
        band_gaps.extend(holes.into_iter().filter(|g| g.width() >= opts.min_gap_width));
    }
    log::debug!(
        "band cover: bands={bands} band_gaps={} obstacles={}",
        band_gaps.len(),
        obstacles.len()
    );
    merge_band_gaps(&band_gaps, opts)
}

// The obstacle-free x-runs of `bound`: sweep word enter/leave events left
// to right with a depth counter, emitting one full-band-height hole per
// maximal zero-depth run.
fn poke_holes(bound: &Rect, words: &[Rect]) -> Result<Vec<Rect>> {
    if words.is_empty() {
        return Ok(vec![*bound]);
    }

    struct XEvent {
        x: f64,
        enter: bool,
        seq: usize,
    }
    let mut events = Vec::with_capacity(words.len() * 2);
    for (seq, r) in words.iter().enumerate() {
        if r.x0 < bound.x0 || r.x1 > bound.x1 {
            return Err(Error::Invariant(format!(
                "word {r} extends beyond sweep bound {bound}"
            )));
        }
        events.push(XEvent {
            x: r.x0,
            enter: true,
            seq,
        });
        events.push(XEvent {
            x: r.x1,
            enter: false,
            seq,
        });
    }
    events.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.seq.cmp(&b.seq)));

    let mut holes = Vec::new();
    let mut run_start = bound.x0;
    let mut depth = 0i64;
    for e in &events {
        if e.enter {
            if depth == 0 && e.x > run_start {
                holes.push(Rect::new(run_start, bound.y0, e.x, bound.y1));
            }
            depth += 1;
        } else {
            depth -= 1;
            if depth < 0 {
                return Err(Error::Invariant("x-sweep depth underflow".to_string()));
            }
            if depth == 0 {
                run_start = e.x;
            }
        }
    }
    if depth != 0 {
        return Err(Error::Invariant("x-sweep depth not balanced".to_string()));
    }
    if bound.x1 > run_start {
        holes.push(Rect::new(run_start, bound.y0, bound.x1, bound.y1));
    }
    Ok(holes)
}

// Merge band gaps into tall gaps: connect the gap arena's neighbor lists,
// then walk each gap's `below` chain taking directed vertical unions while
// the merged width holds `min_gap_width`. Results contained in a larger
// result are dropped.
fn merge_band_gaps(gaps: &[Rect], opts: &SegmentOptions) -> Result<Vec<Rect>> {
    if gaps.is_empty() {
        return Ok(Vec::new());
    }
    let mut index = RectIndex::build(gaps)?;
    index.connect_neighbors(opts.scan_window_height, opts.max_connect_depth)?;

    let mut merged: Vec<Rect> = Vec::new();
    for start in 0..index.len() {
        let mut r = index.get(start).map(|e| e.rect).unwrap();
        let mut cur = start;
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > index.len() {
                return Err(Error::Invariant(
                    "band gap chain did not terminate".to_string(),
                ));
            }
            let entry = index.get(cur).unwrap();
            let next = entry
                .below
                .iter()
                .filter_map(|&b| {
                    let u = directed_union(Axis::Vertical, &r, &index.get(b).unwrap().rect);
                    (u.is_valid() && u.width() >= opts.min_gap_width && u.y0 < r.y0)
                        .then_some((b, u))
                })
                .min_by(|a, b| a.1.y0.total_cmp(&b.1.y0));
            match next {
                Some((below, union)) => {
                    r = union;
                    cur = below;
                }
                None => break,
            }
        }
        if r.height() >= opts.min_accept_height && r.width() >= opts.min_gap_width {
            merged.push(r);
        }
    }

    // Keep only maximal gaps.
    merged.sort_by(|a, b| b.area().total_cmp(&a.area()));
    let mut kept: Vec<Rect> = Vec::new();
    for r in merged {
        let contained = kept
            .iter()
            .any(|s| s.x0 <= r.x0 && s.x1 >= r.x1 && s.y0 <= r.y0 && s.y1 >= r.y1);
        if !contained {
            kept.push(r);
        }
    }
    log::debug!("band cover merged gaps={}", kept.len());
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::options::SegmentOptions;

    fn options() -> SegmentOptions {
        SegmentOptions::default()
    }

    // Two word clusters with a clean 40-unit channel between them.
    fn clustered_words(bound: &Rect) -> Vec<Rect> {
        let mut words = Vec::new();
        let rows = [1.0, 11.0, 21.0, 31.0, 41.0];
        for &y0 in &rows {
            for (x0, x1) in [(0.0, 25.0), (28.0, 52.0), (55.0, 80.0)] {
                words.push(Rect::new(x0, y0, x1, y0 + 7.0));
            }
            for (x0, x1) in [(120.0, 145.0), (148.0, 172.0), (175.0, 200.0)] {
                words.push(Rect::new(x0, y0, x1, y0 + 7.0));
            }
        }
        words.retain(|w| bound.intersects(w));
        words
    }

    #[test]
    fn test_empty_obstacles_empty_cover() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(whitespace_cover(&bound, &[], &options()).unwrap().is_empty());
        assert!(band_cover(&bound, &[], &options()).unwrap().is_empty());
    }

    #[test]
    fn test_single_word_cover_avoids_obstacle() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let word = Rect::new(40.0, 40.0, 60.0, 60.0);
        let cover = whitespace_cover(&bound, &[word], &options()).unwrap();
        assert!(!cover.is_empty());
        for gap in &cover {
            assert!(gap.is_valid());
            assert!(!gap.intersects(&word), "gap {gap} intersects the word");
        }
        // The flanking strips are recovered at full height.
        assert!(cover.contains(&Rect::new(0.0, 0.0, 40.0, 100.0)));
        assert!(cover.contains(&Rect::new(60.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn test_cluster_channel_grows_to_exact_edges() {
        let bound = Rect::new(0.0, 0.0, 200.0, 50.0);
        let words = clustered_words(&bound);
        let cover = whitespace_cover(&bound, &words, &options()).unwrap();
        assert!(
            cover.contains(&Rect::new(80.0, 0.0, 120.0, 50.0)),
            "expected the inter-cluster channel, got {cover:?}"
        );
        for gap in &cover {
            for w in &words {
                assert!(!gap.intersects(w));
            }
        }
    }

    #[test]
    fn test_pop_budget_is_not_an_error() {
        let bound = Rect::new(0.0, 0.0, 200.0, 50.0);
        let words = clustered_words(&bound);
        let opts = options().with_max_pop_budget(1);
        let cover = whitespace_cover(&bound, &words, &opts).unwrap();
        assert!(cover.len() <= 1);
    }

    #[test]
    fn test_select_pivot_preconditions() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            select_pivot(&bound, &[], 100.0, 0.01),
            Err(Error::NoObstacles(_))
        ));
    }

    #[test]
    fn test_select_pivot_prefers_central_small_obstacle() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let central = Rect::new(48.0, 48.0, 52.0, 52.0);
        let corner = Rect::new(0.0, 0.0, 4.0, 4.0);
        let pivot = select_pivot(&bound, &[corner, central], 50.0, 0.1).unwrap();
        assert_eq!(pivot, central);

        // With every obstacle over the cap, the smallest one wins.
        let big = Rect::new(10.0, 10.0, 90.0, 90.0);
        let huge = Rect::new(0.0, 0.0, 100.0, 100.0);
        let pivot = select_pivot(&bound, &[huge, big], 10.0, 0.01).unwrap();
        assert_eq!(pivot, big);
    }

    #[test]
    fn test_poke_holes_no_words() {
        let bound = Rect::new(0.0, 0.0, 100.0, 20.0);
        assert_eq!(poke_holes(&bound, &[]).unwrap(), vec![bound]);
    }

    #[test]
    fn test_poke_holes_splits_runs() {
        let bound = Rect::new(0.0, 0.0, 100.0, 20.0);
        let words = vec![
            Rect::new(10.0, 0.0, 30.0, 20.0),
            Rect::new(20.0, 0.0, 40.0, 20.0),
            Rect::new(60.0, 0.0, 80.0, 20.0),
        ];
        let holes = poke_holes(&bound, &words).unwrap();
        assert_eq!(
            holes,
            vec![
                Rect::new(0.0, 0.0, 10.0, 20.0),
                Rect::new(40.0, 0.0, 60.0, 20.0),
                Rect::new(80.0, 0.0, 100.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_poke_holes_rejects_out_of_bound_word() {
        let bound = Rect::new(0.0, 0.0, 100.0, 20.0);
        let words = vec![Rect::new(-5.0, 0.0, 30.0, 20.0)];
        assert!(matches!(
            poke_holes(&bound, &words),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn test_band_cover_finds_tall_channel() {
        let bound = Rect::new(0.0, 0.0, 200.0, 50.0);
        let words = clustered_words(&bound);
        let opts = options().with_gap_discovery(crate::layout::GapDiscovery::ScanBands);
        let cover = band_cover(&bound, &words, &opts).unwrap();
        let channel = cover
            .iter()
            .find(|g| g.x0 >= 80.0 - 1e-9 && g.x1 <= 120.0 + 1e-9 && g.height() >= 50.0 - 1e-9);
        assert!(
            channel.is_some(),
            "expected a full-height channel gap, got {cover:?}"
        );
    }

    #[test]
    fn test_merge_band_gaps_stacks_bands() {
        let gaps = vec![
            Rect::new(80.0, 20.0, 120.0, 40.0),
            Rect::new(80.0, 0.0, 120.0, 20.0),
        ];
        let opts = options();
        let merged = merge_band_gaps(&gaps, &opts).unwrap();
        assert_eq!(merged, vec![Rect::new(80.0, 0.0, 120.0, 40.0)]);
    }
}
