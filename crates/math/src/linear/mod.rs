//! Linear Notation Parser - turn markup text into a token tree
//!
//! The source is rewritten by a fixed series of passes, each taking and
//! returning an owned token sequence:
//!
//! 1. lex: letter runs, digit runs and single characters
//! 2. group: braces and brackets nest, escapes resolve
//! 3. functions: `\name` literals resolve against the function tables
//! 4. scripts: `_` / `^` attach to their base
//! 5. shortcuts: `a/b` becomes a fraction (optional)
//! 6. spacing: blanks between siblings
//! 7. compress: adjacent literals merge
//!
//! Functions resolve before scripts so that `\frac{a}{b}^2` and
//! `\mathbb{R}^n` script the finished function rather than its last
//! argument group.

mod compress;
mod functions;
mod grouper;
mod lexer;
mod scripts;
mod shortcuts;
mod spacing;

use crate::error::MathResult;
use crate::model::{Token, TokenList};
use crate::settings::ParserSettings;
use crate::tables::SymbolTables;

/// Parse markup into a root `Group` token
pub fn parse_linear(
    source: &str,
    tables: &SymbolTables,
    settings: &ParserSettings,
) -> MathResult<Token> {
    let steps = Steps(settings.show_steps);
    if steps.0 {
        tracing::info!(step = "source", "{:?}", source);
    }

    let tokens = lexer::lex(source);
    steps.show("lex", &tokens);
    let tokens = grouper::group(tokens, tables, settings.max_depth)?;
    steps.show("group", &tokens);
    // Must precede scripts: `\frac{a}{b}^2` scripts the whole fraction,
    // never just its last argument
    let tokens = functions::parse_functions(tokens, tables)?;
    steps.show("functions", &tokens);
    let tokens = scripts::parse_scripts(tokens)?;
    steps.show("scripts", &tokens);
    let tokens = if settings.allow_fraction_shortcut {
        let tokens = shortcuts::parse_shortcuts(tokens, &tables.fraction_constructor());
        steps.show("shortcuts", &tokens);
        tokens
    } else {
        tokens
    };
    let tokens = spacing::add_spacing(tokens, &tables.spacing);
    steps.show("spacing", &tokens);
    let tokens = compress::compress(tokens);
    steps.show("compress", &tokens);

    Ok(Token::Group(tokens))
}

#[derive(Clone, Copy)]
struct Steps(bool);

impl Steps {
    fn show(self, step: &'static str, tokens: &[Token]) {
        if self.0 {
            tracing::info!(step, "{}", TokenList(tokens));
        }
    }
}
