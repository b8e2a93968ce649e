//! Text metrics calculations
//!
//! Widths are expressed in an arbitrary unit shared by every provider method,
//! so a layout built against one provider must be rendered with the same one.

use crate::{Result, TextError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Horizontal measurement capability consumed by layout and rendering.
pub trait FontMetrics {
    /// Width of `text` as it would be drawn on a single line.
    fn width(&self, text: &str) -> f32;

    /// Width of one space glyph.
    fn space_width(&self) -> f32 {
        self.width(" ")
    }

    /// Distance between tab stops.
    fn tab_width(&self) -> f32;
}

impl<M: FontMetrics + ?Sized> FontMetrics for &M {
    fn width(&self, text: &str) -> f32 {
        (**self).width(text)
    }

    fn space_width(&self) -> f32 {
        (**self).space_width()
    }

    fn tab_width(&self) -> f32 {
        (**self).tab_width()
    }
}

impl<M: FontMetrics + ?Sized> FontMetrics for Box<M> {
    fn width(&self, text: &str) -> f32 {
        (**self).width(text)
    }

    fn space_width(&self) -> f32 {
        (**self).space_width()
    }

    fn tab_width(&self) -> f32 {
        (**self).tab_width()
    }
}

/// Fixed-pitch metrics: every grapheme cluster occupies one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonospaceMetrics {
    /// Width of a single cell
    pub cell_width: f32,
    /// Tab stop distance, in cells (0 disables tabs)
    pub tab_size: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            tab_size: 4.0,
        }
    }
}

impl MonospaceMetrics {
    pub fn new(cell_width: f32, tab_size: f32) -> Self {
        Self {
            cell_width,
            tab_size,
        }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn width(&self, text: &str) -> f32 {
        text.graphemes(true).count() as f32 * self.cell_width
    }

    fn space_width(&self) -> f32 {
        self.cell_width
    }

    fn tab_width(&self) -> f32 {
        self.tab_size * self.cell_width
    }
}

/// Proportional metrics backed by a per-grapheme width table.
///
/// Graphemes missing from the table are measured as `default_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphWidthTable {
    pub default_width: f32,
    #[serde(default = "default_tab_size")]
    pub tab_size: f32,
    #[serde(default)]
    pub widths: HashMap<String, f32>,
}

fn default_tab_size() -> f32 {
    4.0
}

impl GlyphWidthTable {
    pub fn new(default_width: f32, tab_size: f32) -> Self {
        Self {
            default_width,
            tab_size,
            widths: HashMap::new(),
        }
    }

    /// Builder-style helper to register the width of one grapheme
    pub fn with_width(mut self, grapheme: impl Into<String>, width: f32) -> Self {
        self.widths.insert(grapheme.into(), width);
        self
    }

    /// Parse a table from JSON and check it for unusable widths
    pub fn from_json(json: &str) -> Result<Self> {
        let table: GlyphWidthTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            glyphs = table.widths.len(),
            "Loaded glyph width table"
        );
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        if !(self.default_width.is_finite() && self.default_width > 0.0) {
            return Err(TextError::InvalidWidthTable(format!(
                "default width must be positive, got {}",
                self.default_width
            )));
        }
        if !(self.tab_size.is_finite() && self.tab_size >= 0.0) {
            return Err(TextError::InvalidWidthTable(format!(
                "tab size must not be negative, got {}",
                self.tab_size
            )));
        }
        for (grapheme, width) in &self.widths {
            if grapheme.graphemes(true).count() != 1 {
                return Err(TextError::InvalidWidthTable(format!(
                    "key {grapheme:?} is not a single grapheme"
                )));
            }
            if !(width.is_finite() && *width >= 0.0) {
                return Err(TextError::InvalidWidthTable(format!(
                    "width of {grapheme:?} must not be negative, got {width}"
                )));
            }
        }
        Ok(())
    }
}

impl FontMetrics for GlyphWidthTable {
    fn width(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|g| self.widths.get(g).copied().unwrap_or(self.default_width))
            .sum()
    }

    fn tab_width(&self) -> f32 {
        self.tab_size * self.space_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_counts_graphemes() {
        let metrics = MonospaceMetrics::default();
        assert_eq!(metrics.width("abc"), 3.0);
        assert_eq!(metrics.width("x₁²"), 3.0);
        // 'v' + combining right arrow above is one cell
        assert_eq!(metrics.width("v\u{20D7}"), 1.0);
        assert_eq!(metrics.width(""), 0.0);
    }

    #[test]
    fn test_monospace_tab_width() {
        let metrics = MonospaceMetrics::new(2.0, 4.0);
        assert_eq!(metrics.space_width(), 2.0);
        assert_eq!(metrics.tab_width(), 8.0);
    }

    #[test]
    fn test_glyph_table_widths() {
        let table = GlyphWidthTable::new(1.0, 4.0)
            .with_width(" ", 0.5)
            .with_width("i", 0.25);
        assert_eq!(table.width("ii"), 0.5);
        assert_eq!(table.width("a i"), 1.75);
        assert_eq!(table.space_width(), 0.5);
        assert_eq!(table.tab_width(), 2.0);
    }

    #[test]
    fn test_glyph_table_from_json() {
        let json = r#"{"default_width": 2.0, "widths": {"—": 3.0}}"#;
        let table = GlyphWidthTable::from_json(json).unwrap();
        assert_eq!(table.tab_size, 4.0);
        assert_eq!(table.width("——a"), 8.0);
    }

    #[test]
    fn test_glyph_table_rejects_bad_entries() {
        assert!(GlyphWidthTable::from_json(r#"{"default_width": 0.0}"#).is_err());
        assert!(
            GlyphWidthTable::from_json(r#"{"default_width": 1.0, "widths": {"ab": 1.0}}"#)
                .is_err()
        );
        assert!(
            GlyphWidthTable::from_json(r#"{"default_width": 1.0, "widths": {"a": -1.0}}"#)
                .is_err()
        );
        assert!(matches!(
            GlyphWidthTable::from_json("not json"),
            Err(TextError::Json(_))
        ));
    }

    #[test]
    fn test_boxed_metrics_delegate() {
        let boxed: Box<dyn FontMetrics> = Box::new(MonospaceMetrics::default());
        assert_eq!(boxed.width("abcd"), 4.0);
        assert_eq!((&boxed).tab_width(), 4.0);
    }
}
