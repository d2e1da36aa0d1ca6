//! Reading order over column rectangles.
//!
//! Column `a` comes before column `b` when their x-ranges overlap and `a`
//! starts higher on the page, or when `a` lies entirely to the left of `b`.
//! For a well-formed column set this relation is irreflexive and acyclic; a
//! violation is reported as an input defect rather than silently resolved.

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// True if `a` must be read before `b`.
pub fn before(a: &Rect, b: &Rect) -> bool {
    before_above(a, b) || before_left(a, b)
}

// Rule 1: the x-ranges overlap and `a`'s top edge is higher.
fn before_above(a: &Rect, b: &Rect) -> bool {
    a.overlaps_x(b) && a.y1 > b.y1
}

// Rule 2: `a` lies entirely to the left of `b`.
fn before_left(a: &Rect, b: &Rect) -> bool {
    a.x1 <= b.x0
}

/// Sort `columns` into reading order, returning the permutation of indices.
///
/// Zero and one column come back unchanged. A reflexive or cyclic `before`
/// relation is a fatal input defect.
pub fn sort_reading_order(columns: &[Rect]) -> Result<Vec<usize>> {
    let n = columns.len();
    if n <= 1 {
        return Ok((0..n).collect());
    }

    let mut adjacency = vec![vec![false; n]; n];
    for (i, a) in columns.iter().enumerate() {
        if before(a, a) {
            return Err(Error::ReflexiveOrder(i));
        }
        for (j, b) in columns.iter().enumerate() {
            adjacency[i][j] = i != j && before(a, b);
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if adjacency[i][j] && adjacency[j][i] {
                return Err(Error::CyclicOrder(i, j));
            }
        }
    }

    let mut visited = vec![false; n];
    let mut postorder = Vec::with_capacity(n);
    for v in 0..n {
        if !visited[v] {
            visit(v, &adjacency, &mut visited, &mut postorder);
        }
    }
    postorder.reverse();
    Ok(postorder)
}

// Depth-first search; pushing on return and reversing afterwards prepends
// each node ahead of its successors.
fn visit(v: usize, adjacency: &[Vec<bool>], visited: &mut [bool], postorder: &mut Vec<usize>) {
    visited[v] = true;
    for w in 0..adjacency.len() {
        if adjacency[v][w] && !visited[w] {
            visit(w, adjacency, visited, postorder);
        }
    }
    postorder.push(v);
}
