//! Math Crate - Plain-text rendering of math markup
//!
//! This crate turns compact LaTeX-like markup into multi-line Unicode text:
//! - Symbol tables for escapes, scripts, spacing classes and functions
//! - A token tree built by a series of tokenizer passes
//! - Box layout with baseline-aware composition
//! - Rendering of boxes to lines of text
//!
//! [`MathFormatter`] ties the pieces together.

pub mod error;
pub mod layout;
pub mod linear;
pub mod model;
pub mod render;
pub mod settings;
pub mod tables;

pub use error::*;
pub use layout::{Alignment, BuildContext, FlexChars, Fragment, LayoutBox, LayoutEngine, Row};
pub use linear::parse_linear;
pub use model::*;
pub use render::Renderer;
pub use settings::{FontSettings, ParserSettings, Settings};
pub use tables::{Constructor, FunctionSpec, SpacingClasses, SymbolTables};

use text_engine::{CachedMetrics, FontMetrics};

/// Parses, lays out and renders markup with one set of tables and metrics
pub struct MathFormatter {
    tables: SymbolTables,
    settings: Settings,
    metrics: CachedMetrics<Box<dyn FontMetrics>>,
}

impl MathFormatter {
    /// Build a formatter, constructing metrics from `settings.fonts`
    pub fn new(tables: SymbolTables, settings: Settings) -> MathResult<Self> {
        let metrics = settings.fonts.build_metrics()?;
        Ok(Self {
            tables,
            settings,
            metrics,
        })
    }

    /// Build a formatter from settings alone, loading any extra tables they name
    pub fn from_settings(settings: Settings) -> MathResult<Self> {
        let tables = match &settings.tables {
            Some(path) => SymbolTables::load(path)?,
            None => SymbolTables::builtin(),
        };
        Self::new(tables, settings)
    }

    /// Build a formatter around an existing metrics provider
    pub fn with_metrics(
        tables: SymbolTables,
        settings: Settings,
        metrics: Box<dyn FontMetrics>,
    ) -> Self {
        Self {
            tables,
            settings,
            metrics: CachedMetrics::new(metrics),
        }
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn metrics(&self) -> &dyn FontMetrics {
        &self.metrics
    }

    /// Parse markup into a token tree
    pub fn tokenize(&self, source: &str) -> MathResult<Token> {
        parse_linear(source, &self.tables, &self.settings.parser)
    }

    /// Parse and lay out markup
    pub fn layout(&self, source: &str) -> MathResult<LayoutBox> {
        let token = self.tokenize(source)?;
        LayoutEngine::new(&self.metrics, &self.tables).layout(&token)
    }

    /// Render markup to text, dropping blank lines above and below
    pub fn render(&self, source: &str) -> MathResult<String> {
        let layout = self.layout(source)?;
        let lines = Renderer::new(&self.metrics).render_lines(&layout);

        let is_blank = |line: &String| line.trim().is_empty();
        let first = lines.iter().position(|line| !is_blank(line));
        let last = lines.iter().rposition(|line| !is_blank(line));
        Ok(match (first, last) {
            (Some(first), Some(last)) => lines[first..=last].join("\n"),
            _ => String::new(),
        })
    }

    /// Render markup, echoing the input unchanged when it cannot be rendered
    pub fn render_or_raw(&self, source: &str) -> String {
        match self.render(source) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(input = source, "Cannot render expression: {}", e);
                source.to_string()
            }
        }
    }
}

impl Default for MathFormatter {
    fn default() -> Self {
        Self::with_metrics(
            SymbolTables::builtin(),
            Settings::default(),
            Box::new(text_engine::MonospaceMetrics::default()),
        )
    }
}
