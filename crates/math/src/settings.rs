//! Formatter settings
//!
//! Settings are read from a JSON file. Every field has a default so a
//! partial file (or none at all) is always usable.

use crate::error::{MathError, MathResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use text_engine::{CachedMetrics, FontMetrics, GlyphWidthTable, MonospaceMetrics};

/// Top-level settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserSettings,
    pub fonts: FontSettings,
    /// Extra symbol tables merged over the builtin ones
    pub tables: Option<PathBuf>,
}

/// Tokenizer behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserSettings {
    /// Rewrite `a/b` into a fraction
    pub allow_fraction_shortcut: bool,
    /// Log the token tree after every pass
    pub show_steps: bool,
    /// Deepest bracket nesting accepted
    pub max_depth: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            allow_fraction_shortcut: true,
            show_steps: false,
            max_depth: 64,
        }
    }
}

/// Font metrics used by layout and rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontSettings {
    /// Width of one monospace cell
    pub cell_width: f32,
    /// Tab stop as a multiple of the space width; 0 renders gaps with spaces only
    pub tab_size: f32,
    /// Proportional glyph width table; monospace when absent
    pub glyph_widths: Option<PathBuf>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            tab_size: 4.0,
            glyph_widths: None,
        }
    }
}

impl FontSettings {
    /// Build the memoized metrics provider these settings describe
    pub fn build_metrics(&self) -> MathResult<CachedMetrics<Box<dyn FontMetrics>>> {
        if !(self.tab_size.is_finite() && self.tab_size >= 0.0) {
            return Err(MathError::Config(format!(
                "tab size must not be negative, got {}",
                self.tab_size
            )));
        }

        let metrics: Box<dyn FontMetrics> = match &self.glyph_widths {
            Some(path) => {
                let mut table = GlyphWidthTable::load(path)?;
                table.tab_size = self.tab_size;
                Box::new(table)
            }
            None => {
                if !(self.cell_width.is_finite() && self.cell_width > 0.0) {
                    return Err(MathError::Config(format!(
                        "cell width must be positive, got {}",
                        self.cell_width
                    )));
                }
                Box::new(MonospaceMetrics::new(self.cell_width, self.tab_size))
            }
        };
        Ok(CachedMetrics::new(metrics))
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> MathResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings, failing on a missing or malformed file
    pub fn load(path: impl AsRef<Path>) -> MathResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is unusable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings file, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.parser.allow_fraction_shortcut);
        assert!(!settings.parser.show_steps);
        assert_eq!(settings.parser.max_depth, 64);
        assert_eq!(settings.fonts.tab_size, 4.0);
        assert!(settings.tables.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"parser": {"show_steps": true}}"#).unwrap();
        assert!(settings.parser.show_steps);
        assert!(settings.parser.allow_fraction_shortcut);
        assert_eq!(settings.fonts, FontSettings::default());
    }

    #[test]
    fn test_load_strict_and_lenient() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        assert!(matches!(Settings::load(file.path()), Err(MathError::Json(_))));
        assert_eq!(Settings::load_or_default(file.path()), Settings::default());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("settings.json");
        assert!(matches!(Settings::load(&missing), Err(MathError::Io(_))));
        assert_eq!(Settings::load_or_default(&missing), Settings::default());
    }

    #[test]
    fn test_build_monospace_metrics() {
        let fonts = FontSettings {
            cell_width: 2.0,
            tab_size: 3.0,
            glyph_widths: None,
        };
        let metrics = fonts.build_metrics().unwrap();
        assert_eq!(metrics.width("ab"), 4.0);
        assert_eq!(metrics.tab_width(), 6.0);
    }

    #[test]
    fn test_build_table_metrics_uses_configured_tab_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_width": 2.0, "tab_size": 8.0, "widths": {{" ": 1.0}}}}"#).unwrap();

        let fonts = FontSettings {
            tab_size: 2.0,
            glyph_widths: Some(file.path().to_path_buf()),
            ..FontSettings::default()
        };
        let metrics = fonts.build_metrics().unwrap();
        assert_eq!(metrics.width("a b"), 5.0);
        assert_eq!(metrics.tab_width(), 2.0);
    }

    #[test]
    fn test_rejects_bad_font_settings() {
        let fonts = FontSettings {
            cell_width: 0.0,
            ..FontSettings::default()
        };
        assert!(matches!(fonts.build_metrics(), Err(MathError::Config(_))));

        let fonts = FontSettings {
            tab_size: -1.0,
            ..FontSettings::default()
        };
        assert!(matches!(fonts.build_metrics(), Err(MathError::Config(_))));
    }
}
