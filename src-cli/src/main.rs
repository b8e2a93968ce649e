//! Plainmath - render math markup as plain Unicode text
//!
//! Expressions are taken from the command line, or from stdin one per line
//! when none are given. Each rendered block is written to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use math::{MathFormatter, Settings};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Render LaTeX-like math markup as multi-line Unicode text
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Expressions to render; stdin is read line by line when omitted
    expressions: Vec<String>,

    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Symbol table file (JSON) merged over the builtin tables
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Glyph width table (JSON) for proportional fonts
    #[arg(long)]
    glyph_widths: Option<PathBuf>,

    /// Tab stop as a multiple of the space width; 0 disables tabs
    #[arg(long)]
    tab_size: Option<f32>,

    /// Log the token tree after every tokenizer pass
    #[arg(long)]
    show_steps: bool,

    /// Leave `a/b` as written instead of building a fraction
    #[arg(long)]
    no_fraction_shortcut: bool,

    /// Fail instead of echoing input that cannot be rendered
    #[arg(long)]
    strict: bool,
}

impl Cli {
    /// Settings file contents with command line overrides applied
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(tables) = &self.tables {
            settings.tables = Some(tables.clone());
        }
        if let Some(glyph_widths) = &self.glyph_widths {
            settings.fonts.glyph_widths = Some(glyph_widths.clone());
        }
        if let Some(tab_size) = self.tab_size {
            settings.fonts.tab_size = tab_size;
        }
        if self.show_steps {
            settings.parser.show_steps = true;
        }
        if self.no_fraction_shortcut {
            settings.parser.allow_fraction_shortcut = false;
        }
        Ok(settings)
    }

    fn expressions(&self) -> Result<Vec<String>> {
        if !self.expressions.is_empty() {
            return Ok(self.expressions.clone());
        }
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read expressions from stdin")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.show_steps { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let settings = cli.settings()?;
    let formatter = MathFormatter::from_settings(settings).context("failed to set up formatter")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for source in cli.expressions()? {
        let rendered = if cli.strict {
            formatter
                .render(&source)
                .with_context(|| format!("cannot render {source:?}"))?
        } else {
            formatter.render_or_raw(&source)
        };
        writeln!(out, "{rendered}")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "plainmath",
            "--tab-size",
            "0",
            "--show-steps",
            "--no-fraction-shortcut",
            "1/2",
        ])
        .unwrap();

        let settings = cli.settings().unwrap();
        assert_eq!(settings.fonts.tab_size, 0.0);
        assert!(settings.parser.show_steps);
        assert!(!settings.parser.allow_fraction_shortcut);
        assert_eq!(cli.expressions().unwrap(), vec!["1/2".to_string()]);
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["plainmath", "x"]).unwrap();
        assert_eq!(cli.settings().unwrap(), Settings::default());
        assert!(!cli.strict);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let cli = Cli::try_parse_from(["plainmath", "--settings", "/nonexistent/settings.json", "x"])
            .unwrap();
        assert!(cli.settings().is_err());
    }
}
