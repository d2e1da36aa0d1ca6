//! Data model for segmentation inputs and outputs.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rect;

/// A word extracted from a page: its text and bounding box.
///
/// Words are immutable inputs to the segmentation pipeline; producing them
/// (from a PDF content stream, an OCR pass, ...) is the job of the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word text.
    pub text: String,
    /// Bounding box of the word in page units.
    pub bbox: Rect,
}

impl Word {
    /// Create a new word record.
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A detected column region with the text assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Creation-order identifier assigned by the column scanner.
    pub id: usize,
    /// Bounding box of the column.
    pub bbox: Rect,
    /// Text of the column: words joined by spaces, lines by newlines.
    pub text: String,
}

/// Result of segmenting one page: its bound and the detected columns in
/// reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSegmentation {
    /// The page bound the segmentation was computed against.
    pub bound: Rect,
    /// Columns in reading order.
    pub columns: Vec<Column>,
}

impl PageSegmentation {
    /// Number of detected columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The page text: column texts in reading order, separated by blank
    /// lines. Empty columns are skipped.
    pub fn plain_text(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Serialize the segmentation to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| crate::error::Error::Invariant(format!("JSON encoding failed: {e}")))
    }
}
