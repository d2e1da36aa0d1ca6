//! Assignment of word text to columns.
//!
//! Words are first grouped into horizontal lines, then each word joins the
//! column its box overlaps best, line by line, so column text keeps the
//! page's line structure.

use crate::geometry::{area_overlap, line_overlap, Rect};
use crate::model::Word;

/// Group words into horizontal lines.
///
/// Each word joins the first existing line whose anchor word it vertically
/// overlaps (a negative height-overlap defect), or starts a new line.
/// Lines come back top to bottom, each line's words left to right, as
/// indices into `words`.
pub fn group_lines(words: &[Word]) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = Vec::new();
    for (k, word) in words.iter().enumerate() {
        let mut placed = false;
        for line in lines.iter_mut() {
            let anchor = &words[line[0]];
            if line_overlap(&word.bbox, &anchor.bbox) < 0.0 {
                line.push(k);
                placed = true;
                break;
            }
        }
        if !placed {
            lines.push(vec![k]);
        }
    }

    lines.sort_by(|a, b| words[b[0]].bbox.y0.total_cmp(&words[a[0]].bbox.y0));
    for line in lines.iter_mut() {
        line.sort_by(|&i, &j| words[i].bbox.x0.total_cmp(&words[j].bbox.x0));
    }
    lines
}

/// Distribute line words over `columns` and build each column's text.
///
/// Every word goes to the column minimizing the area-overlap defect against
/// its box. Words of one line in one column join with spaces; lines join
/// with newlines.
pub fn column_text(words: &[Word], lines: &[Vec<usize>], columns: &[Rect]) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }
    let mut column_lines: Vec<Vec<String>> = vec![Vec::new(); columns.len()];
    for line in lines {
        let mut line_words: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
        for &wi in line {
            let wbox = &words[wi].bbox;
            let mut best = 0;
            let mut best_defect = 1.0;
            for (ci, column) in columns.iter().enumerate() {
                let defect = area_overlap(wbox, column);
                if defect < best_defect {
                    best_defect = defect;
                    best = ci;
                }
            }
            line_words[best].push(&words[wi].text);
        }
        for (ci, ws) in line_words.iter().enumerate() {
            if !ws.is_empty() {
                column_lines[ci].push(ws.join(" "));
            }
        }
    }
    column_lines.into_iter().map(|ls| ls.join("\n")).collect()
}
