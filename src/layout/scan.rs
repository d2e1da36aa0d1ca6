//! Scan-line conversion of gaps into columns.
//!
//! The page is swept top to bottom. Every gap contributes an enter event at
//! its top and a leave event at its bottom; at each event line the bound is
//! perforated by the currently active gaps, and the resulting x-runs are
//! matched against the open columns: matches continue, unmatched open
//! columns close, unmatched runs open new columns. Whatever is still open
//! at the page bottom closes there.

use crate::error::{Error, Result};
use crate::geometry::Rect;

// Events within this much of a line's y are processed together.
const LINE_EPSILON: f64 = 1.0;
// Segments and open columns match when both x edges agree this closely.
const MATCH_TOLERANCE: f64 = 1.0;

/// A column produced by the scanner, tagged with its creation-order id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedColumn {
    /// Creation-order identifier; 1 is the initial full-width column.
    pub id: usize,
    /// The column rectangle.
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy)]
struct GapEvent {
    gap: usize,
    y: f64,
    x0: f64,
    enter: bool,
}

#[derive(Debug)]
struct ScanLine {
    y: f64,
    events: Vec<GapEvent>,
}

// An open column: bottom not yet fixed.
#[derive(Debug, Clone, Copy)]
struct OpenColumn {
    id: usize,
    x0: f64,
    x1: f64,
    top: f64,
}

#[derive(Debug)]
struct ScanState {
    running: Vec<OpenColumn>,
    completed: Vec<ScannedColumn>,
    next_id: usize,
}

impl ScanState {
    fn new(bound: &Rect) -> Self {
        let mut state = Self {
            running: Vec::new(),
            completed: Vec::new(),
            next_id: 1,
        };
        let id = state.fresh_id();
        state.running.push(OpenColumn {
            id,
            x0: bound.x0,
            x1: bound.x1,
            top: bound.y1,
        });
        state
    }

    fn fresh_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // Continue, close and open columns against the x-runs perforated at
    // height `y`.
    fn extend_columns(&mut self, segments: &[(f64, f64)], y: f64) {
        let mut cont_run = vec![false; self.running.len()];
        let mut cont_seg = vec![false; segments.len()];
        for (i, &(sx0, sx1)) in segments.iter().enumerate() {
            for (j, r) in self.running.iter().enumerate() {
                if (sx0 - r.x0).abs() < MATCH_TOLERANCE && (sx1 - r.x1).abs() < MATCH_TOLERANCE {
                    cont_seg[i] = true;
                    cont_run[j] = true;
                }
            }
        }

        let mut still: Vec<OpenColumn> = Vec::new();
        for (j, r) in std::mem::take(&mut self.running).into_iter().enumerate() {
            if cont_run[j] {
                still.push(r);
            } else if y < r.top {
                self.completed.push(ScannedColumn {
                    id: r.id,
                    rect: Rect::new(r.x0, y, r.x1, r.top),
                });
            }
            // A zero-height unmatched column vanishes without closing.
        }
        for (i, &(sx0, sx1)) in segments.iter().enumerate() {
            if !cont_seg[i] {
                let id = self.fresh_id();
                still.push(OpenColumn {
                    id,
                    x0: sx0,
                    x1: sx1,
                    top: y,
                });
            }
        }
        still.sort_by(|a, b| a.x0.total_cmp(&b.x0).then(a.x1.total_cmp(&b.x1)));
        self.running = still;
    }

    fn finish(mut self, bottom: f64) -> Result<Vec<ScannedColumn>> {
        for r in std::mem::take(&mut self.running) {
            if r.top > bottom {
                self.completed.push(ScannedColumn {
                    id: r.id,
                    rect: Rect::new(r.x0, bottom, r.x1, r.top),
                });
            }
        }
        self.completed.sort_by_key(|c| c.id);
        for c in &self.completed {
            if !c.rect.is_valid() {
                return Err(Error::DegenerateRect {
                    context: "scanned column",
                    rect: c.rect,
                });
            }
        }
        // Interiors must stay disjoint up to the x-match tolerance.
        #[cfg(debug_assertions)]
        for (i, a) in self.completed.iter().enumerate() {
            for b in &self.completed[i + 1..] {
                let sliver = a
                    .rect
                    .intersection(&b.rect)
                    .map_or(0.0, |r| r.width().min(r.height()));
                debug_assert!(
                    sliver < MATCH_TOLERANCE,
                    "columns overlap: {} / {}",
                    a.rect,
                    b.rect
                );
            }
        }
        Ok(self.completed)
    }
}

/// Convert surviving gaps into the columns they separate.
///
/// With no gaps the whole bound is one column. Otherwise the output columns
/// have pairwise disjoint interiors and tile the bound minus the gap
/// strips, in creation order.
pub fn scan_columns(bound: &Rect, gaps: &[Rect]) -> Result<Vec<ScannedColumn>> {
    if !bound.is_valid() {
        return Err(Error::DegenerateRect {
            context: "scan bound",
            rect: *bound,
        });
    }
    let mut state = ScanState::new(bound);
    if gaps.is_empty() {
        return state.finish(bound.y0);
    }
    for g in gaps {
        if !g.is_valid() {
            return Err(Error::DegenerateRect {
                context: "scan gap",
                rect: *g,
            });
        }
    }

    let lines = scan_lines(gaps);
    let mut active: Vec<usize> = Vec::new();
    for line in &lines {
        if line.y <= bound.y0 {
            break;
        }
        for e in &line.events {
            if e.enter {
                active.push(e.gap);
            }
        }
        for e in &line.events {
            if !e.enter {
                active.retain(|&g| g != e.gap);
            }
        }
        let active_rects: Vec<Rect> = active.iter().map(|&g| gaps[g]).collect();
        let segments = perforate(bound, &active_rects, line.y)?;
        log::debug!(
            "scan line y={:.1}: active={} segments={}",
            line.y,
            active.len(),
            segments.len()
        );
        state.extend_columns(&segments, line.y);
    }
    state.finish(bound.y0)
}

// Build the event lines: enter at gap top, leave at gap bottom, descending
// y, enter before leave, ascending left edge; near-coincident lines merge.
fn scan_lines(gaps: &[Rect]) -> Vec<ScanLine> {
    let mut events: Vec<GapEvent> = Vec::with_capacity(gaps.len() * 2);
    for (gap, r) in gaps.iter().enumerate() {
        events.push(GapEvent {
            gap,
            y: r.y1,
            x0: r.x0,
            enter: true,
        });
        events.push(GapEvent {
            gap,
            y: r.y0,
            x0: r.x0,
            enter: false,
        });
    }
    events.sort_by(|a, b| {
        b.y.total_cmp(&a.y)
            .then(b.enter.cmp(&a.enter))
            .then(a.x0.total_cmp(&b.x0))
    });

    let mut lines: Vec<ScanLine> = Vec::new();
    for e in events {
        match lines.last_mut() {
            Some(line) if e.y > line.y - LINE_EPSILON => line.events.push(e),
            _ => lines.push(ScanLine {
                y: e.y,
                events: vec![e],
            }),
        }
    }
    lines
}

// Perforate the bound at height `y`: sweep gap enter/leave x-events with a
// depth counter and emit one x-run per maximal stretch free of active gaps.
fn perforate(bound: &Rect, gaps: &[Rect], y: f64) -> Result<Vec<(f64, f64)>> {
    if gaps.is_empty() {
        return Ok(vec![(bound.x0, bound.x1)]);
    }

    struct XEvent {
        x: f64,
        enter: bool,
        seq: usize,
    }
    let mut events = Vec::with_capacity(gaps.len() * 2);
    for (seq, r) in gaps.iter().enumerate() {
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

    let mut runs = Vec::new();
    let mut run_start = bound.x0;
    let mut depth = 0i64;
    for e in &events {
        if e.enter {
            if depth == 0 && e.x > run_start {
                runs.push((run_start, e.x));
            }
            depth += 1;
        } else {
            depth -= 1;
            if depth < 0 {
                return Err(Error::Invariant(format!(
                    "perforation depth underflow at y={y:.1}"
                )));
            }
            if depth == 0 {
                run_start = e.x;
            }
        }
    }
    if depth != 0 {
        return Err(Error::Invariant(format!(
            "perforation depth not balanced at y={y:.1}"
        )));
    }
    if bound.x1 > run_start {
        runs.push((run_start, bound.x1));
    }
    Ok(runs)
}
