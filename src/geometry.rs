//! Geometric primitives for layout analysis.
//!
//! Rectangles use page units with the origin at the bottom-left corner:
//! `x0`/`y0` are the left/bottom edges, `x1`/`y1` the right/top edges.
//! A rectangle is *valid* when `x0 < x1` and `y0 < y1`; every rectangle
//! produced by the segmentation pipeline satisfies this.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x0: f64,
    /// Bottom edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
}

impl Rect {
    /// Create a new rectangle from its edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use colseg::geometry::Rect;
    ///
    /// let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(r.width(), 100.0);
    /// assert_eq!(r.height(), 50.0);
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        (self.x1 - self.x0).abs() * (self.y1 - self.y0).abs()
    }

    /// Half perimeter (width + height), the size measure used for pivot
    /// selection.
    pub fn half_perimeter(&self) -> f64 {
        self.width() + self.height()
    }

    /// Center of the rectangle as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// True if the rectangle has positive width and height.
    pub fn is_valid(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }

    /// True if the rectangle has zero (or negative) area.
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// True if the two rectangles overlap with positive area.
    ///
    /// Touching edges do not count as an intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 > other.x0 && other.x1 > self.x0 && self.y1 > other.y0 && other.y1 > self.y0
    }

    /// True if the x-ranges overlap, edges included.
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x1 >= other.x0 && other.x1 >= self.x0
    }

    /// True if the y-ranges overlap, edges included.
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.y1 >= other.y0 && other.y1 >= self.y0
    }

    /// Geometric intersection, or `None` when the rectangles do not overlap
    /// with positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        r.is_valid().then_some(r)
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.1},{:.1},{:.1},{:.1}) {:.1}x{:.1}",
            self.x0,
            self.y0,
            self.x1,
            self.y1,
            self.width(),
            self.height()
        )
    }
}

/// Sweep axis for directed unions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Union along y, intersection along x.
    Vertical,
    /// Union along x, intersection along y.
    Horizontal,
}

/// A direction in which a rectangle can be shifted when probing for
/// neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards larger y.
    Above,
    /// Towards smaller y.
    Below,
    /// Towards smaller x.
    Left,
    /// Towards larger x.
    Right,
}

impl Direction {
    /// The union axis a probe in this direction runs along.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Above | Direction::Below => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Shift `r` by `delta` in this direction.
    pub fn shift(&self, r: &Rect, delta: f64) -> Rect {
        match self {
            Direction::Above => Rect::new(r.x0, r.y0 + delta, r.x1, r.y1 + delta),
            Direction::Below => Rect::new(r.x0, r.y0 - delta, r.x1, r.y1 - delta),
            Direction::Left => Rect::new(r.x0 - delta, r.y0, r.x1 - delta, r.y1),
            Direction::Right => Rect::new(r.x0 + delta, r.y0, r.x1 + delta, r.y1),
        }
    }
}

/// Union of the rectangles along `axis`, intersection in the transverse
/// direction.
///
/// For `Axis::Vertical` the result spans both y-ranges but only the common
/// x-range; the result can be degenerate when the transverse ranges do not
/// overlap.
pub fn directed_union(axis: Axis, r0: &Rect, r1: &Rect) -> Rect {
    match axis {
        Axis::Vertical => Rect::new(
            r0.x0.max(r1.x0),
            r0.y0.min(r1.y0),
            r0.x1.min(r1.x1),
            r0.y1.max(r1.y1),
        ),
        Axis::Horizontal => Rect::new(
            r0.x0.min(r1.x0),
            r0.y0.max(r1.y0),
            r0.x1.max(r1.x1),
            r0.y1.min(r1.y1),
        ),
    }
}

/// Constrict `r` in the transverse direction of `way` to lie within `limit`.
pub fn constrict_transverse(way: Direction, r: &Rect, limit: &Rect) -> Rect {
    match way.axis() {
        Axis::Vertical => Rect::new(r.x0.max(limit.x0), r.y0, r.x1.min(limit.x1), r.y1),
        Axis::Horizontal => Rect::new(r.x0, r.y0.max(limit.y0), r.x1, r.y1.min(limit.y1)),
    }
}

/// Union of all rectangles, or `None` for an empty slice.
pub fn union_all(rects: &[Rect]) -> Option<Rect> {
    let mut it = rects.iter();
    let first = *it.next()?;
    Some(it.fold(first, |u, r| u.union(r)))
}

/// The rectangles in `rects` that intersect `bound` with positive area.
pub fn intersecting(rects: &[Rect], bound: &Rect) -> Vec<Rect> {
    rects
        .iter()
        .filter(|r| r.is_valid() && bound.intersects(r))
        .copied()
        .collect()
}

/// Ratio of the intersection area of `r0` and `r1` to the area of `r1`.
pub fn intersection_fraction(r0: &Rect, r1: &Rect) -> f64 {
    match r0.intersection(r1) {
        Some(r) => r.area() / r1.area(),
        None => 0.0,
    }
}

/// True if `bound` overlaps any rectangle in `cover` by more than
/// `max_overlap` of that rectangle's area.
pub fn overlap_significant(bound: &Rect, cover: &[Rect], max_overlap: f64) -> bool {
    if cover.is_empty() || max_overlap >= 1.0 {
        return false;
    }
    cover
        .iter()
        .any(|r| intersection_fraction(r, bound) > max_overlap)
}

/// Vertical spread of a set of rectangles: the range of their bottom edges.
///
/// `None` for an empty set.
pub fn y_span(rects: &[Rect]) -> Option<f64> {
    let first = rects.first()?;
    let mut min = first.y0;
    let mut max = first.y0;
    for r in &rects[1..] {
        min = min.min(r.y0);
        max = max.max(r.y0);
    }
    Some(max - min)
}

/// Overlap defect between two rectangles for a size metric:
/// `(metric(union) - metric(a) - metric(b)) / (metric(union) + metric(a) + metric(b))`.
///
/// - `= 0`: the rectangles touch along the metric's dimension
/// - `< 0`: they overlap
/// - `> 0`: they are separated
fn metric_overlap(r0: &Rect, r1: &Rect, metric: fn(&Rect) -> f64) -> f64 {
    let a = metric(&r0.union(r1));
    let b = metric(r0) + metric(r1);
    (a - b) / (a + b)
}

/// Area overlap defect; the smaller the value, the more the boxes overlap.
pub fn area_overlap(r0: &Rect, r1: &Rect) -> f64 {
    metric_overlap(r0, r1, Rect::area)
}

/// Vertical overlap defect. Negative means the boxes share a text line.
pub fn line_overlap(r0: &Rect, r1: &Rect) -> f64 {
    metric_overlap(r0, r1, |r| r.height())
}

/// Horizontal overlap defect. Negative means the boxes share a column.
pub fn column_overlap(r0: &Rect, r1: &Rect) -> f64 {
    metric_overlap(r0, r1, |r| r.width())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_validity() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!Rect::new(10.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!Rect::new(0.0, 10.0, 10.0, 10.0).is_valid());
        assert!(Rect::new(10.0, 0.0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_intersects_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let touching = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
        // Inclusive x-range overlap does count touching edges.
        assert!(a.overlaps_x(&touching));
    }

    #[test]
    fn test_intersection_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(5.0, 5.0, 10.0, 10.0));
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 15.0, 15.0));
        assert!(a.intersection(&Rect::new(20.0, 20.0, 30.0, 30.0)).is_none());
    }

    #[test]
    fn test_directed_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(2.0, 20.0, 8.0, 30.0);
        let v = directed_union(Axis::Vertical, &a, &b);
        assert_eq!(v, Rect::new(2.0, 0.0, 8.0, 30.0));
        let h = directed_union(Axis::Horizontal, &a, &b);
        assert_eq!(h, Rect::new(0.0, 20.0, 10.0, 10.0));
        assert!(!h.is_valid());
    }

    #[test]
    fn test_intersection_fraction() {
        let big = Rect::new(0.0, 0.0, 100.0, 100.0);
        let small = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!((intersection_fraction(&big, &small) - 1.0).abs() < 1e-12);
        assert!((intersection_fraction(&small, &big) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_significant() {
        let cover = vec![Rect::new(0.0, 0.0, 100.0, 100.0)];
        let heavy = Rect::new(0.0, 0.0, 50.0, 50.0);
        let light = Rect::new(99.5, 99.5, 200.0, 200.0);
        assert!(overlap_significant(&heavy, &cover, 0.01));
        assert!(!overlap_significant(&light, &cover, 0.01));
        assert!(!overlap_significant(&heavy, &[], 0.01));
    }

    #[test]
    fn test_y_span() {
        let rects = vec![
            Rect::new(0.0, 10.0, 5.0, 15.0),
            Rect::new(0.0, 40.0, 5.0, 45.0),
            Rect::new(0.0, 25.0, 5.0, 30.0),
        ];
        assert_eq!(y_span(&rects), Some(30.0));
        assert_eq!(y_span(&[]), None);
    }

    #[test]
    fn test_overlap_metric_signs() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(0.0, 5.0, 10.0, 15.0);
        let separated = Rect::new(0.0, 30.0, 10.0, 40.0);
        let touching = Rect::new(0.0, 10.0, 10.0, 20.0);
        assert!(line_overlap(&a, &overlapping) < 0.0);
        assert!(line_overlap(&a, &separated) > 0.0);
        assert!(line_overlap(&a, &touching).abs() < 1e-12);

        let beside = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(column_overlap(&a, &beside).abs() < 1e-12);
        assert!(area_overlap(&a, &a) < 0.0);
    }

    #[test]
    fn test_direction_shift() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(
            Direction::Above.shift(&r, 5.0),
            Rect::new(10.0, 15.0, 20.0, 25.0)
        );
        assert_eq!(
            Direction::Left.shift(&r, 5.0),
            Rect::new(5.0, 10.0, 15.0, 20.0)
        );
        assert_eq!(Direction::Above.axis(), Axis::Vertical);
        assert_eq!(Direction::Right.axis(), Axis::Horizontal);
    }
}
