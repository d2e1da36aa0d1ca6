//! Static spatial index over a fixed rectangle set.
//!
//! The index owns an arena of identified rectangles and four permutations of
//! their ids, one per edge coordinate. Interval queries run in O(log n) by
//! binary-searching a permutation for the split point and intersecting the
//! candidate id sets. Neighbor relationships (which rectangles lie above,
//! below, left and right of each rectangle) are computed on demand by a
//! bounded recursive probe and stored as id lists, never references.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::geometry::{constrict_transverse, directed_union, Direction, Rect};

/// A rectangle in the index arena: its id, geometry and neighbor id lists.
///
/// Neighbor lists are empty until [`RectIndex::connect_neighbors`] runs.
#[derive(Debug, Clone)]
pub struct IndexedRect {
    /// Arena id; equals the rectangle's position in the arena.
    pub id: usize,
    /// The rectangle.
    pub rect: Rect,
    /// Ids of rectangles reachable upward.
    pub above: Vec<usize>,
    /// Ids of rectangles reachable downward.
    pub below: Vec<usize>,
    /// Ids of rectangles reachable leftward.
    pub left: Vec<usize>,
    /// Ids of rectangles reachable rightward.
    pub right: Vec<usize>,
}

/// Spatial index over a fixed set of rectangles.
#[derive(Debug, Clone)]
pub struct RectIndex {
    rects: Vec<IndexedRect>,
    by_x0: Vec<usize>,
    by_x1: Vec<usize>,
    by_y0: Vec<usize>,
    by_y1: Vec<usize>,
}

impl RectIndex {
    /// Build an index over `rects`.
    ///
    /// Every rectangle must be valid; a degenerate rectangle is a
    /// precondition error.
    pub fn build(rects: &[Rect]) -> Result<Self> {
        for r in rects {
            if !r.is_valid() {
                return Err(Error::DegenerateRect {
                    context: "spatial index input",
                    rect: *r,
                });
            }
        }
        let rects: Vec<IndexedRect> = rects
            .iter()
            .enumerate()
            .map(|(id, &rect)| IndexedRect {
                id,
                rect,
                above: Vec::new(),
                below: Vec::new(),
                left: Vec::new(),
                right: Vec::new(),
            })
            .collect();

        let index = Self {
            by_x0: order_by(&rects, |r| r.x0),
            by_x1: order_by(&rects, |r| r.x1),
            by_y0: order_by(&rects, |r| r.y0),
            by_y1: order_by(&rects, |r| r.y1),
            rects,
        };
        debug_assert!(index.orders_sorted());
        Ok(index)
    }

    /// Number of rectangles in the index.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// True if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The indexed rectangle with arena id `id`.
    pub fn get(&self, id: usize) -> Option<&IndexedRect> {
        self.rects.get(id)
    }

    /// All entries of the arena.
    pub fn entries(&self) -> &[IndexedRect] {
        &self.rects
    }

    /// The geometry of the rectangles with the given ids.
    pub fn rects_of(&self, ids: &[usize]) -> Vec<Rect> {
        ids.iter().map(|&o| self.rects[o].rect).collect()
    }

    /// Ids of rectangles whose x-range overlaps `[a, b]`, edges included.
    ///
    /// Results come back ordered by left edge. An empty interval matches
    /// nothing; an inverted interval is an invariant failure.
    pub fn intersect_x(&self, a: f64, b: f64) -> Result<Vec<usize>> {
        let hits = self.intersect_axis(a, b, &self.by_x1, &self.by_x0, |r| r.x1, |r| r.x0)?;
        #[cfg(debug_assertions)]
        for &o in &hits {
            let r = &self.rects[o].rect;
            debug_assert!(
                r.x1 >= a && r.x0 <= b,
                "index x-query [{a}, {b}] returned non-overlapping {r}"
            );
        }
        Ok(hits)
    }

    /// Ids of rectangles whose y-range overlaps `[a, b]`, edges included.
    pub fn intersect_y(&self, a: f64, b: f64) -> Result<Vec<usize>> {
        let hits = self.intersect_axis(a, b, &self.by_y1, &self.by_y0, |r| r.y1, |r| r.y0)?;
        #[cfg(debug_assertions)]
        for &o in &hits {
            let r = &self.rects[o].rect;
            debug_assert!(
                r.y1 >= a && r.y0 <= b,
                "index y-query [{a}, {b}] returned non-overlapping {r}"
            );
        }
        Ok(hits)
    }

    /// Ids of rectangles overlapping `bound` on both axes.
    pub fn intersect_rect(&self, bound: &Rect) -> Result<Vec<usize>> {
        let xs = self.intersect_x(bound.x0, bound.x1)?;
        let ys: HashSet<usize> = self.intersect_y(bound.y0, bound.y1)?.into_iter().collect();
        Ok(xs.into_iter().filter(|o| ys.contains(o)).collect())
    }

    // One-axis interval query: rectangles whose [lo(r), hi(r)] overlaps
    // [a, b]. `by_hi`/`by_lo` are the permutations sorted by the respective
    // selector.
    fn intersect_axis(
        &self,
        a: f64,
        b: f64,
        by_hi: &[usize],
        by_lo: &[usize],
        hi: fn(&Rect) -> f64,
        lo: fn(&Rect) -> f64,
    ) -> Result<Vec<usize>> {
        if a > b {
            return Err(Error::Invariant(format!(
                "inverted index query interval [{a}, {b}]"
            )));
        }
        if a == b {
            return Ok(Vec::new());
        }
        // First permutation position with hi(r) >= a; everything before it
        // ends strictly left of the interval.
        let start = by_hi.partition_point(|&o| hi(&self.rects[o].rect) < a);
        // First permutation position with lo(r) > b; everything from it on
        // starts strictly right of the interval.
        let end = by_lo.partition_point(|&o| lo(&self.rects[o].rect) <= b);

        let candidates: HashSet<usize> = by_hi[start..].iter().copied().collect();
        Ok(by_lo[..end]
            .iter()
            .copied()
            .filter(|o| candidates.contains(o))
            .collect())
    }

    /// Populate every rectangle's neighbor lists by probing a shifted copy
    /// of it in each direction.
    ///
    /// `delta` is the probe distance; a rectangle's `below` list, for
    /// example, holds the ids of rectangles the probe reaches by sliding
    /// down `delta` and flooding through overlapping rectangles while the
    /// directed union keeps a usable cross-section. The flood carries an
    /// explicit depth and fails with [`Error::DepthExceeded`] instead of
    /// recursing without bound.
    pub fn connect_neighbors(&mut self, delta: f64, max_depth: usize) -> Result<()> {
        for id in 0..self.rects.len() {
            let rect = self.rects[id].rect;
            let above = self.reach(id, id, Direction::Above, delta, rect, 0, max_depth)?;
            let below = self.reach(id, id, Direction::Below, delta, rect, 0, max_depth)?;
            let left = self.reach(id, id, Direction::Left, delta, rect, 0, max_depth)?;
            let right = self.reach(id, id, Direction::Right, delta, rect, 0, max_depth)?;

            #[cfg(debug_assertions)]
            {
                for &o in above.iter().chain(&below) {
                    debug_assert!(
                        rect.overlaps_x(&self.rects[o].rect),
                        "vertical neighbor without x overlap: {rect} / {}",
                        self.rects[o].rect
                    );
                }
                for &o in left.iter().chain(&right) {
                    debug_assert!(
                        rect.overlaps_y(&self.rects[o].rect),
                        "horizontal neighbor without y overlap: {rect} / {}",
                        self.rects[o].rect
                    );
                }
            }

            let entry = &mut self.rects[id];
            entry.above = above;
            entry.below = below;
            entry.left = left;
            entry.right = right;
        }
        Ok(())
    }

    // Recursive directional probe. `root` is the rectangle whose neighbors
    // are being collected, `current` the rectangle the flood stands on.
    // `corridor` narrows as the probe moves: it is the directed union of
    // everything traversed so far, so a neighbor only counts while a
    // transverse cross-section survives.
    fn reach(
        &self,
        root: usize,
        current: usize,
        way: Direction,
        delta: f64,
        corridor: Rect,
        depth: usize,
        max_depth: usize,
    ) -> Result<Vec<usize>> {
        if depth >= max_depth {
            return Err(Error::DepthExceeded(max_depth));
        }

        let shifted = way.shift(&self.rects[current].rect, delta);
        let corridor = directed_union(way.axis(), &corridor, &shifted);
        let probe = constrict_transverse(way, &shifted, &self.rects[root].rect);
        let probe = constrict_transverse(way, &probe, &corridor);
        if !probe.is_valid() || !corridor.is_valid() {
            return Ok(Vec::new());
        }

        let mut hits = self.intersect_rect(&probe)?;
        hits.retain(|&o| o != root && o != current);
        let hits = self.trim_to_corridor(way, &corridor, hits);
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = hits.clone();
        for &o in &hits {
            let nested = self.reach(root, o, way, delta, corridor, depth + 1, max_depth)?;
            for id in nested {
                if id != root && !found.contains(&id) {
                    found.push(id);
                }
            }
            found = self.trim_to_corridor(way, &corridor, found);
        }
        Ok(found)
    }

    // Walk `ids` in order, folding each rectangle into the corridor's
    // directed union, and keep only the prefix that leaves the union valid.
    fn trim_to_corridor(&self, way: Direction, corridor: &Rect, ids: Vec<usize>) -> Vec<usize> {
        let mut bound = *corridor;
        let mut kept = Vec::new();
        for o in ids {
            bound = directed_union(way.axis(), &bound, &self.rects[o].rect);
            if !bound.is_valid() {
                break;
            }
            kept.push(o);
        }
        kept
    }

    #[cfg(debug_assertions)]
    fn orders_sorted(&self) -> bool {
        let sorted = |order: &[usize], key: fn(&Rect) -> f64| {
            order
                .windows(2)
                .all(|w| key(&self.rects[w[0]].rect) <= key(&self.rects[w[1]].rect))
        };
        sorted(&self.by_x0, |r| r.x0)
            && sorted(&self.by_x1, |r| r.x1)
            && sorted(&self.by_y0, |r| r.y0)
            && sorted(&self.by_y1, |r| r.y1)
    }
}

// Permutation of arena ids sorted by `key`, id as tiebreak.
fn order_by(rects: &[IndexedRect], key: fn(&Rect) -> f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&i, &j| {
        key(&rects[i].rect)
            .total_cmp(&key(&rects[j].rect))
            .then(i.cmp(&j))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Rect> {
        // Two rows of three boxes.
        vec![
            Rect::new(0.0, 20.0, 10.0, 30.0),
            Rect::new(20.0, 20.0, 30.0, 30.0),
            Rect::new(40.0, 20.0, 50.0, 30.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(20.0, 0.0, 30.0, 10.0),
            Rect::new(40.0, 0.0, 50.0, 10.0),
        ]
    }

    fn brute_force_x(rects: &[Rect], a: f64, b: f64) -> Vec<usize> {
        rects
            .iter()
            .enumerate()
            .filter(|(_, r)| r.x1 >= a && r.x0 <= b)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_build_rejects_degenerate() {
        let result = RectIndex::build(&[Rect::new(0.0, 0.0, 0.0, 10.0)]);
        assert!(matches!(result, Err(Error::DegenerateRect { .. })));
    }

    #[test]
    fn test_intersect_x_matches_brute_force() {
        let rects = grid();
        let index = RectIndex::build(&rects).unwrap();
        for (a, b) in [(0.0, 50.0), (5.0, 25.0), (11.0, 19.0), (30.0, 40.0)] {
            let mut got = index.intersect_x(a, b).unwrap();
            got.sort_unstable();
            let mut want = brute_force_x(&rects, a, b);
            want.sort_unstable();
            assert_eq!(got, want, "interval [{a}, {b}]");
        }
    }

    #[test]
    fn test_intersect_y_and_rect() {
        let index = RectIndex::build(&grid()).unwrap();
        let mut top = index.intersect_y(15.0, 35.0).unwrap();
        top.sort_unstable();
        assert_eq!(top, vec![0, 1, 2]);

        let mut hit = index
            .intersect_rect(&Rect::new(15.0, 15.0, 35.0, 35.0))
            .unwrap();
        hit.sort_unstable();
        assert_eq!(hit, vec![1]);
    }

    #[test]
    fn test_empty_and_inverted_intervals() {
        let index = RectIndex::build(&grid()).unwrap();
        assert!(index.intersect_x(5.0, 5.0).unwrap().is_empty());
        assert!(index.intersect_x(10.0, 5.0).is_err());
    }

    #[test]
    fn test_connect_neighbors_vertical() {
        let mut index = RectIndex::build(&grid()).unwrap();
        index.connect_neighbors(15.0, 16).unwrap();

        // Box 0 sits directly above box 3.
        let top_left = index.get(0).unwrap();
        assert_eq!(top_left.below, vec![3]);
        assert!(top_left.above.is_empty());

        let bottom_left = index.get(3).unwrap();
        assert_eq!(bottom_left.above, vec![0]);

        // Boxes in the same row see each other sideways.
        let top_mid = index.get(1).unwrap();
        assert!(top_mid.left.contains(&0));
        assert!(top_mid.right.contains(&2));
    }

    #[test]
    fn test_connect_depth_ceiling() {
        // A tall stack: each probe cascades to the next rectangle down.
        let stack: Vec<Rect> = (0..8)
            .map(|i| {
                let y = (8 - i) as f64 * 10.0;
                Rect::new(0.0, y, 10.0, y + 8.0)
            })
            .collect();
        let mut index = RectIndex::build(&stack).unwrap();
        let result = index.connect_neighbors(10.0, 3);
        assert_eq!(result, Err(Error::DepthExceeded(3)));

        let mut index = RectIndex::build(&stack).unwrap();
        assert!(index.connect_neighbors(10.0, 64).is_ok());
    }
}
