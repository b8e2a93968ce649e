//! Grouper - nest flat literals into groups and bracket groups
//!
//! Escapes are resolved here as well, since `\left` and `\right` decide how
//! the following bracket is read.

use crate::error::{MathError, MathResult};
use crate::model::{BracketGroup, BracketKind, Literal, Token};
use crate::tables::SymbolTables;
use std::iter::Peekable;
use std::vec::IntoIter;

/// The construct whose contents are being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Top,
    Brace,
    Bracket(BracketKind),
}

impl Scope {
    fn closer(self) -> Option<char> {
        match self {
            Scope::Top => None,
            Scope::Brace => Some('}'),
            Scope::Bracket(kind) => Some(kind.closer()),
        }
    }
}

/// Set by `\left` / `\right`, consumed by the next token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Direction::Left => "\\left",
            Direction::Right => "\\right",
        }
    }
}

enum Action {
    Keep,
    Close,
    OpenGroup,
    OpenBracket(BracketKind),
}

struct Grouper<'t> {
    tokens: Peekable<IntoIter<Token>>,
    tables: &'t SymbolTables,
    max_depth: usize,
}

impl Grouper<'_> {
    /// Collect tokens until `scope` is closed
    fn sequence(&mut self, scope: Scope, depth: usize) -> MathResult<Vec<Token>> {
        if depth > self.max_depth {
            return Err(MathError::Tokenization(format!(
                "brackets nested deeper than {} levels",
                self.max_depth
            )));
        }

        let mut out = Vec::new();
        let mut direction: Option<Direction> = None;

        while let Some(token) = self.tokens.next() {
            let pending = direction.take();
            let Token::Literal(literal) = token else {
                out.push(token);
                continue;
            };

            let literal = if literal.is_operator("\\") {
                match self.tokens.next() {
                    Some(Token::Literal(name)) => match name.text.as_str() {
                        "left" | "right" => {
                            if let Some(dropped) = pending {
                                tracing::warn!("'{}' not followed by a bracket", dropped.name());
                            }
                            direction = Some(if name.text == "left" {
                                Direction::Left
                            } else {
                                Direction::Right
                            });
                            continue;
                        }
                        "\\" => Literal::finalized("\\\\"),
                        "{" | "}" if pending.is_some() => name,
                        other => self.escape(other),
                    },
                    Some(other) => {
                        out.push(other);
                        continue;
                    }
                    None => {
                        tracing::warn!("Trailing '\\' dropped");
                        break;
                    }
                }
            } else {
                literal
            };

            match bracket_action(&literal, scope, pending)? {
                Action::Close => return Ok(out),
                Action::OpenGroup => {
                    let children = self.sequence(Scope::Brace, depth + 1)?;
                    out.push(Token::Group(children));
                }
                Action::OpenBracket(kind) => {
                    let children = self.sequence(Scope::Bracket(kind), depth + 1)?;
                    out.push(Token::Bracket(BracketGroup { kind, children }));
                }
                Action::Keep => {
                    if let Some(dropped) = pending {
                        tracing::warn!(
                            "'{}' not followed by a bracket, found {:?}",
                            dropped.name(),
                            literal.text
                        );
                    }
                    out.push(Token::Literal(literal));
                }
            }
        }

        if let Some(dropped) = direction {
            tracing::warn!("Trailing '{}' dropped", dropped.name());
        }

        match scope.closer() {
            None => Ok(out),
            Some(closer) => Err(MathError::Tokenization(format!(
                "imbalanced brackets: missing '{closer}'"
            ))),
        }
    }

    fn escape(&self, name: &str) -> Literal {
        match self.tables.escapes.get(name) {
            Some(glyph) => Literal::finalized(glyph.as_str()),
            None => Literal::new(format!("\\{name}")),
        }
    }
}

fn bracket_action(
    literal: &Literal,
    scope: Scope,
    pending: Option<Direction>,
) -> MathResult<Action> {
    if literal.skip_formatting {
        return Ok(Action::Keep);
    }
    let Some(ch) = literal.single_char() else {
        return Ok(Action::Keep);
    };
    let closes_scope = scope.closer() == Some(ch);

    Ok(match pending {
        Some(Direction::Left) => match BracketKind::from_opener(ch) {
            Some(kind) => Action::OpenBracket(kind),
            None => Action::Keep,
        },
        Some(Direction::Right) if closes_scope => Action::Close,
        Some(Direction::Right) => {
            if BracketKind::from_closer(ch).is_some() {
                return Err(MathError::Tokenization(format!(
                    "'\\right{ch}' does not match the open bracket"
                )));
            }
            Action::Keep
        }
        None if closes_scope => Action::Close,
        None if ch == '{' => Action::OpenGroup,
        None => match BracketKind::from_opener(ch) {
            Some(kind) => Action::OpenBracket(kind),
            None => Action::Keep,
        },
    })
}

/// Nest a flat literal sequence, failing on unbalanced brackets
pub(crate) fn group(
    tokens: Vec<Token>,
    tables: &SymbolTables,
    max_depth: usize,
) -> MathResult<Vec<Token>> {
    let mut grouper = Grouper {
        tokens: tokens.into_iter().peekable(),
        tables,
        max_depth,
    };
    grouper.sequence(Scope::Top, 0)
}
