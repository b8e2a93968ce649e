//! Token tree - the intermediate representation between markup and layout
//!
//! The tree is owned top-down: every container owns its children outright
//! and nothing points back up.

use crate::tables::Constructor;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

// =============================================================================
// Brackets
// =============================================================================

/// The visible bracket families understood by the grouper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BracketKind {
    Round,
    Square,
    Curly,
    Bar,
}

impl BracketKind {
    pub fn opener(self) -> char {
        match self {
            BracketKind::Round => '(',
            BracketKind::Square => '[',
            BracketKind::Curly => '{',
            BracketKind::Bar => '|',
        }
    }

    pub fn closer(self) -> char {
        match self {
            BracketKind::Round => ')',
            BracketKind::Square => ']',
            BracketKind::Curly => '}',
            BracketKind::Bar => '|',
        }
    }

    pub fn from_opener(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(BracketKind::Round),
            '[' => Some(BracketKind::Square),
            '{' => Some(BracketKind::Curly),
            '|' => Some(BracketKind::Bar),
            _ => None,
        }
    }

    pub fn from_closer(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(BracketKind::Round),
            ']' => Some(BracketKind::Square),
            '}' => Some(BracketKind::Curly),
            '|' => Some(BracketKind::Bar),
            _ => None,
        }
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// A run of literal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub text: String,
    /// Set once the text is final; later passes must not reinterpret it
    pub skip_formatting: bool,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            skip_formatting: false,
        }
    }

    /// A literal whose text later passes must leave alone
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            skip_formatting: true,
        }
    }

    /// Whether this literal is exactly `op` and still open to interpretation
    pub fn is_operator(&self, op: &str) -> bool {
        !self.skip_formatting && self.text == op
    }

    /// The text as a single character, if it is exactly one
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

/// A group drawn with flexible brackets on either side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketGroup {
    pub kind: BracketKind,
    pub children: Vec<Token>,
}

/// Which script slot an operator targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Subscript,
    Superscript,
}

impl ScriptKind {
    /// `_` and `^`, unless the literal has already been finalized
    pub fn from_literal(literal: &Literal) -> Option<Self> {
        if literal.is_operator("_") {
            Some(ScriptKind::Subscript)
        } else if literal.is_operator("^") {
            Some(ScriptKind::Superscript)
        } else {
            None
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ScriptKind::Subscript => "subscripts",
            ScriptKind::Superscript => "superscripts",
        }
    }
}

/// A base with at most one subscript and one superscript attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptGroup {
    pub base: Vec<Token>,
    pub subscript: Vec<Token>,
    pub superscript: Vec<Token>,
}

impl ScriptGroup {
    pub fn new(base: Token) -> Self {
        Self {
            base: vec![base],
            subscript: Vec::new(),
            superscript: Vec::new(),
        }
    }

    pub fn slot(&self, kind: ScriptKind) -> &Vec<Token> {
        match kind {
            ScriptKind::Subscript => &self.subscript,
            ScriptKind::Superscript => &self.superscript,
        }
    }

    pub fn slot_mut(&mut self, kind: ScriptKind) -> &mut Vec<Token> {
        match kind {
            ScriptKind::Subscript => &mut self.subscript,
            ScriptKind::Superscript => &mut self.superscript,
        }
    }
}

/// A parametrized function applied to its argument groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionGroup {
    pub name: String,
    pub constructor: Constructor,
    /// Argument tokens, each a `Group` or `Bracket`
    pub groups: Vec<Token>,
}

/// A node in the token tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Literal(Literal),
    /// Braces without a visible delimiter
    Group(Vec<Token>),
    Bracket(BracketGroup),
    Script(ScriptGroup),
    Function(FunctionGroup),
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(Literal::new(text))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Token::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Whether this token may stand as a function argument
    pub fn is_group_like(&self) -> bool {
        matches!(self, Token::Group(_) | Token::Bracket(_))
    }

    /// Rewrite every child sequence with `f`, leaving this node in place.
    ///
    /// Function arguments are groups themselves, so `f` sees their contents.
    pub fn try_map_children<E, F>(self, f: &mut F) -> Result<Token, E>
    where
        F: FnMut(Vec<Token>) -> Result<Vec<Token>, E>,
    {
        Ok(match self {
            Token::Literal(literal) => Token::Literal(literal),
            Token::Group(children) => Token::Group(f(children)?),
            Token::Bracket(group) => Token::Bracket(BracketGroup {
                kind: group.kind,
                children: f(group.children)?,
            }),
            Token::Script(group) => Token::Script(ScriptGroup {
                base: f(group.base)?,
                subscript: f(group.subscript)?,
                superscript: f(group.superscript)?,
            }),
            Token::Function(function) => Token::Function(FunctionGroup {
                name: function.name,
                constructor: function.constructor,
                groups: function
                    .groups
                    .into_iter()
                    .map(|group| group.try_map_children(f))
                    .collect::<Result<_, E>>()?,
            }),
        })
    }

    /// Infallible counterpart of [`Token::try_map_children`]
    pub fn map_children<F>(self, f: &mut F) -> Token
    where
        F: FnMut(Vec<Token>) -> Vec<Token>,
    {
        self.try_map_children(&mut |children| Ok::<_, Infallible>(f(children)))
            .unwrap_or_else(|never| match never {})
    }

    /// Text of every literal in the subtree, in order
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        let sequences: Vec<&Vec<Token>> = match self {
            Token::Literal(literal) => {
                out.push_str(&literal.text);
                return;
            }
            Token::Group(children) => vec![children],
            Token::Bracket(group) => vec![&group.children],
            Token::Script(group) => vec![&group.base, &group.subscript, &group.superscript],
            Token::Function(function) => {
                for group in &function.groups {
                    group.collect_text(out);
                }
                return;
            }
        };
        for token in sequences.into_iter().flatten() {
            token.collect_text(out);
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Compact notation used when tracing tokenizer steps
pub struct TokenList<'a>(pub &'a [Token]);

impl fmt::Display for TokenList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(literal) => write!(f, "{:?}", literal.text),
            Token::Group(children) => write!(f, "{{{}}}", TokenList(children)),
            Token::Bracket(group) => write!(
                f,
                "{}{}{}",
                group.kind.opener(),
                TokenList(&group.children),
                group.kind.closer()
            ),
            Token::Script(group) => write!(
                f,
                "<{} _[{}] ^[{}]>",
                TokenList(&group.base),
                TokenList(&group.subscript),
                TokenList(&group.superscript)
            ),
            Token::Function(function) => {
                write!(f, "\\{}", function.name)?;
                for group in &function.groups {
                    write!(f, "{group}")?;
                }
                Ok(())
            }
        }
    }
}
