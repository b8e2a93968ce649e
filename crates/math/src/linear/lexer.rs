//! Lexer - split raw markup into flat literal tokens

use crate::model::Token;
use std::iter::Peekable;
use std::str::CharIndices;

/// Splits markup into letter runs, digit runs and single characters.
/// Whitespace only separates runs and never produces a token.
struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Consume characters of one class, returning the byte offset past the run
    fn run_end(&mut self, mut end: usize, class: fn(char) -> bool) -> usize {
        while let Some((index, ch)) = self.chars.next_if(|&(_, ch)| class(ch)) {
            end = index + ch.len_utf8();
        }
        end
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let (start, ch) = self.chars.next()?;
            if ch.is_whitespace() {
                continue;
            }

            let first_end = start + ch.len_utf8();
            let end = if ch.is_ascii_alphabetic() {
                self.run_end(first_end, |c| c.is_ascii_alphabetic())
            } else if ch.is_ascii_digit() {
                self.run_end(first_end, |c| c.is_ascii_digit())
            } else {
                first_end
            };
            return Some(Token::literal(&self.source[start..end]));
        }
    }
}

/// Lex `source` into a flat sequence of literals
pub(crate) fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}
