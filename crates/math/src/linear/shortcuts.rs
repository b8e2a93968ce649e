//! Fraction shortcut - `a/b` becomes `\frac{a}{b}`

use crate::model::{FunctionGroup, Token};
use crate::tables::Constructor;

pub(crate) fn parse_shortcuts(tokens: Vec<Token>, fraction: &Constructor) -> Vec<Token> {
    let mut input = tokens.into_iter().peekable();
    let mut out: Vec<Token> = Vec::with_capacity(input.len());

    while let Some(token) = input.next() {
        let is_slash = token
            .as_literal()
            .is_some_and(|literal| literal.is_operator("/"));

        if is_slash && !out.is_empty() && input.peek().is_some() {
            if let (Some(top), Some(bottom)) = (out.pop(), input.next()) {
                let bottom = bottom.map_children(&mut |children| parse_shortcuts(children, fraction));
                out.push(Token::Function(FunctionGroup {
                    name: "frac".to_string(),
                    constructor: fraction.clone(),
                    groups: vec![operand(top), operand(bottom)],
                }));
            }
            continue;
        }

        out.push(token.map_children(&mut |children| parse_shortcuts(children, fraction)));
    }

    out
}

/// Function arguments are groups; bare literals get wrapped
fn operand(token: Token) -> Token {
    match token {
        Token::Literal(_) => Token::Group(vec![token]),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    fn frac(top: Token, bottom: Token) -> Token {
        Token::Function(FunctionGroup {
            name: "frac".to_string(),
            constructor: Constructor::fraction(),
            groups: vec![top, bottom],
        })
    }

    fn group(text: &str) -> Token {
        Token::Group(vec![Token::literal(text)])
    }

    #[test]
    fn test_slash_between_operands() {
        let tokens = vec![Token::literal("1"), Token::literal("/"), Token::literal("2")];
        let parsed = parse_shortcuts(tokens, &Constructor::fraction());
        assert_eq!(parsed, vec![frac(group("1"), group("2"))]);
    }

    #[test]
    fn test_chains_are_left_associative() {
        let tokens = vec![
            Token::literal("a"),
            Token::literal("/"),
            Token::literal("b"),
            Token::literal("/"),
            Token::literal("c"),
        ];
        let parsed = parse_shortcuts(tokens, &Constructor::fraction());
        assert_eq!(
            parsed,
            vec![frac(frac(group("a"), group("b")), group("c"))]
        );
    }

    #[test]
    fn test_slash_without_both_operands_stays() {
        let tokens = vec![Token::literal("/"), Token::literal("2")];
        assert_eq!(parse_shortcuts(tokens.clone(), &Constructor::fraction()), tokens);

        let tokens = vec![Token::literal("2"), Token::literal("/")];
        assert_eq!(parse_shortcuts(tokens.clone(), &Constructor::fraction()), tokens);
    }

    #[test]
    fn test_finalized_slash_stays() {
        let tokens = vec![
            Token::literal("1"),
            Token::Literal(Literal::finalized("/")),
            Token::literal("2"),
        ];
        assert_eq!(parse_shortcuts(tokens.clone(), &Constructor::fraction()), tokens);
    }

    #[test]
    fn test_groups_are_kept_as_operands() {
        let tokens = vec![
            Token::Group(vec![Token::literal("a"), Token::literal("/"), Token::literal("b")]),
            Token::literal("/"),
            Token::literal("c"),
        ];
        let parsed = parse_shortcuts(tokens, &Constructor::fraction());
        assert_eq!(
            parsed,
            vec![frac(Token::Group(vec![frac(group("a"), group("b"))]), group("c"))]
        );
    }
}
