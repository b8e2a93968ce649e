//! Math Rendering - Turn a laid out box into lines of text
//!
//! Fragment offsets become literal whitespace: tabs first, then spaces,
//! measured with the same metrics that positioned the fragments.

use crate::layout::{LayoutBox, Row};
use text_engine::FontMetrics;

/// Converts boxes into text using a metrics provider
pub struct Renderer<'a> {
    metrics: &'a dyn FontMetrics,
}

impl<'a> Renderer<'a> {
    pub fn new(metrics: &'a dyn FontMetrics) -> Self {
        Self { metrics }
    }

    /// Render a box as newline-separated lines, top row first
    pub fn render(&self, layout: &LayoutBox) -> String {
        self.render_lines(layout).join("\n")
    }

    /// Render each row, top row first
    pub fn render_lines(&self, layout: &LayoutBox) -> Vec<String> {
        layout
            .rows
            .iter()
            .rev()
            .map(|row| self.render_row(row))
            .collect()
    }

    /// Render one row with whitespace filling the gaps between fragments
    pub fn render_row(&self, row: &Row) -> String {
        let mut fragments: Vec<_> = row.fragments.iter().collect();
        fragments.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let tab_width = self.metrics.tab_width();
        let space_width = self.metrics.space_width();

        let mut line = String::new();
        let mut position = 0.0f32;
        for fragment in fragments {
            let mut gap = (fragment.offset - position).max(0.0);

            // The cursor tracks emitted whitespace, not the fragment offset
            if tab_width > 0.0 {
                let tabs = (gap / tab_width).floor();
                line.extend(std::iter::repeat('\t').take(tabs as usize));
                gap -= tabs * tab_width;
                position += tabs * tab_width;
            }
            if space_width > 0.0 {
                let spaces = (gap / space_width).floor();
                line.extend(std::iter::repeat(' ').take(spaces as usize));
                position += spaces * space_width;
            }

            line.push_str(&fragment.text);
            position += self.metrics.width(&fragment.text);
        }

        line.truncate(line.trim_end_matches(' ').len());
        line
    }
}
