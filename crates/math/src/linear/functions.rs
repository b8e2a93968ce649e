//! Function parser - resolve `\name` literals against the function tables

use crate::error::{MathError, MathResult};
use crate::model::{FunctionGroup, Literal, Token};
use crate::tables::SymbolTables;
use std::collections::HashMap;
use std::iter::Peekable;
use std::vec::IntoIter;

type Cursor = Peekable<IntoIter<Token>>;

/// Replace simple functions by their output text and gather the argument
/// groups of parametrized ones. Unknown names degrade to their bare text.
pub(crate) fn parse_functions(tokens: Vec<Token>, tables: &SymbolTables) -> MathResult<Vec<Token>> {
    let mut input = tokens.into_iter().peekable();
    let mut out = Vec::with_capacity(input.len());

    while let Some(token) = input.next() {
        let Some(name) = function_name(&token) else {
            out.push(token.try_map_children(&mut |children| parse_functions(children, tables))?);
            continue;
        };

        if let Some(mapping) = tables.simple_functions.get(name) {
            let literal = apply_simple(name, mapping, &mut input);
            out.push(Token::Literal(literal));
        } else if let Some(spec) = tables.functions.get(name) {
            let groups = fetch_arguments(name, spec.groups, &mut input, tables)?;
            out.push(Token::Function(FunctionGroup {
                name: name.to_string(),
                constructor: spec.constructor.clone(),
                groups,
            }));
        } else {
            tracing::warn!(function = name, "Unknown function, treating as text");
            out.push(Token::Literal(Literal::finalized(name)));
        }
    }

    Ok(out)
}

fn function_name(token: &Token) -> Option<&str> {
    match token {
        Token::Literal(literal) if !literal.skip_formatting => literal
            .text
            .strip_prefix('\\')
            .filter(|name| !name.is_empty()),
        _ => None,
    }
}

fn apply_simple(name: &str, mapping: &HashMap<String, String>, input: &mut Cursor) -> Literal {
    let output = match input.peek() {
        Some(Token::Group(children)) => match children.as_slice() {
            [Token::Literal(argument)] => mapping
                .get(&argument.text)
                .cloned()
                .ok_or_else(|| format!("no output for input {:?}", argument.text)),
            _ => Err("argument group is not a single literal".to_string()),
        },
        _ => Err("no argument group follows".to_string()),
    };

    match output {
        Ok(output) => {
            input.next();
            Literal::finalized(output)
        }
        Err(reason) => {
            tracing::warn!(function = name, "{}, treating as text", reason);
            Literal::finalized(name)
        }
    }
}

fn fetch_arguments(
    name: &str,
    count: usize,
    input: &mut Cursor,
    tables: &SymbolTables,
) -> MathResult<Vec<Token>> {
    (0..count)
        .map(|index| match input.next() {
            Some(token) if token.is_group_like() => {
                token.try_map_children(&mut |children| parse_functions(children, tables))
            }
            Some(token) => Err(MathError::Build(format!(
                "argument {} of '\\{name}' must be a group, found {token}",
                index + 1
            ))),
            None => Err(MathError::Build(format!(
                "'\\{name}' expects {count} argument groups, found {index}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{grouper::group, lexer::lex};
    use crate::tables::Constructor;

    fn parse(source: &str) -> MathResult<Vec<Token>> {
        let tables = SymbolTables::builtin();
        let tokens = group(lex(source), &tables, 64)?;
        parse_functions(tokens, &tables)
    }

    #[test]
    fn test_simple_function() {
        let tokens = parse(r"\mathbb{R}").unwrap();
        assert_eq!(tokens, vec![Token::Literal(Literal::finalized("ℝ"))]);
    }

    #[test]
    fn test_simple_function_degrades() {
        // unknown input keeps the group in place
        let tokens = parse(r"\mathbb{y}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal(Literal::finalized("mathbb")),
                Token::Group(vec![Token::literal("y")]),
            ]
        );

        let tokens = parse(r"\mathbb x").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Literal(Literal::finalized("mathbb")), Token::literal("x")]
        );

        let tokens = parse(r"\mathbb{RR}").unwrap();
        assert_eq!(tokens[0], Token::Literal(Literal::finalized("mathbb")));
    }

    #[test]
    fn test_parametrized_function() {
        let tokens = parse(r"\frac{a}{\frac{b}{c}}").unwrap();
        let [Token::Function(outer)] = tokens.as_slice() else {
            panic!("expected one function, got {tokens:?}");
        };
        assert_eq!(outer.name, "frac");
        assert_eq!(outer.constructor, Constructor::fraction());
        assert_eq!(outer.groups[0], Token::Group(vec![Token::literal("a")]));
        let Token::Group(bottom) = &outer.groups[1] else {
            panic!("expected a group");
        };
        assert!(matches!(bottom.as_slice(), [Token::Function(_)]));
    }

    #[test]
    fn test_bracket_is_a_valid_argument() {
        let tokens = parse(r"\abs(x)").unwrap();
        assert!(matches!(tokens.as_slice(), [Token::Function(f)] if f.name == "abs"));
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(parse(r"\frac{a}"), Err(MathError::Build(_))));
        assert!(matches!(parse(r"\frac{a}b"), Err(MathError::Build(_))));
    }

    #[test]
    fn test_unknown_function_is_text() {
        let tokens = parse(r"\unknownfn{x}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal(Literal::finalized("unknownfn")),
                Token::Group(vec![Token::literal("x")]),
            ]
        );
    }

    #[test]
    fn test_finalized_text_is_not_reparsed() {
        let tokens = parse(r"\\frac{1}{2}").unwrap();
        assert!(tokens.iter().all(|token| !matches!(token, Token::Function(_))));
    }
}
