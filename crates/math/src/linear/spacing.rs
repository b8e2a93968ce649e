//! Spacing - insert blanks between siblings by character class

use crate::model::{BracketKind, Literal, Token};
use crate::tables::SpacingClasses;

pub(crate) fn add_spacing(tokens: Vec<Token>, classes: &SpacingClasses) -> Vec<Token> {
    let tokens: Vec<Token> = tokens
        .into_iter()
        .map(|token| token.map_children(&mut |children| add_spacing(children, classes)))
        .collect();

    // a leading sign binds to what follows it
    let mut suppress = tokens
        .first()
        .and_then(Token::as_literal)
        .and_then(Literal::single_char)
        .is_some_and(|ch| classes.is_unary(ch));

    let mut out = Vec::with_capacity(tokens.len() * 2);
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        let space = tokens
            .peek()
            .is_some_and(|next| needs_space(&token, next, classes, &mut suppress));
        out.push(token);
        if space {
            out.push(Token::literal(" "));
        }
    }
    out
}

fn needs_space(left: &Token, right: &Token, classes: &SpacingClasses, suppress: &mut bool) -> bool {
    let never_spaced = |literal: &Literal| {
        literal
            .single_char()
            .is_some_and(|ch| classes.is_never_spaced(ch))
    };

    match (left, right) {
        (Token::Literal(left), Token::Literal(right)) => {
            if std::mem::take(suppress) {
                return false;
            }
            let equality = left.single_char().is_some_and(|ch| classes.is_equality(ch));
            let unary = right.single_char().is_some_and(|ch| classes.is_unary(ch));
            if equality && unary {
                *suppress = true;
                return true;
            }
            let left_tight = left.text.chars().all(|ch| classes.is_never_spaced(ch));
            !(left_tight && never_spaced(right))
        }
        (Token::Literal(left), right) => {
            if std::mem::take(suppress) {
                return false;
            }
            let hugs = match right {
                Token::Bracket(bracket) => bracket.kind != BracketKind::Curly,
                Token::Script(_) => true,
                _ => false,
            };
            !(never_spaced(left) && hugs)
        }
        (Token::Script(_), Token::Script(_)) => false,
        (_, Token::Literal(right)) => !never_spaced(right),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BracketGroup, ScriptGroup};

    fn spaced(texts: &[&str]) -> String {
        let tokens = texts.iter().map(|text| Token::literal(*text)).collect();
        Token::Group(add_spacing(tokens, &SpacingClasses::builtin())).plain_text()
    }

    #[test]
    fn test_operators_are_spaced() {
        assert_eq!(spaced(&["a", "+", "b"]), "a + b");
        assert_eq!(spaced(&["x", "=", "1"]), "x = 1");
    }

    #[test]
    fn test_never_spaced_pairs_touch() {
        assert_eq!(spaced(&["2", "x"]), "2x");
        assert_eq!(spaced(&["hello", "world"]), "hello world");
        assert_eq!(spaced(&["a", ","]), "a,");
    }

    #[test]
    fn test_unary_after_equality() {
        assert_eq!(spaced(&["x", "=", "-", "1"]), "x = -1");
        assert_eq!(spaced(&["x", "-", "1"]), "x - 1");
    }

    #[test]
    fn test_leading_unary() {
        assert_eq!(spaced(&["-", "x", "+", "1"]), "-x + 1");
    }

    #[test]
    fn test_containers() {
        let classes = SpacingClasses::builtin();
        let call = vec![
            Token::literal("f"),
            Token::Bracket(BracketGroup {
                kind: BracketKind::Round,
                children: vec![Token::literal("x"), Token::literal("+"), Token::literal("1")],
            }),
            Token::literal("+"),
            Token::literal("y"),
        ];
        let spaced = Token::Group(add_spacing(call, &classes));
        assert_eq!(spaced.plain_text(), "fx + 1 + y");
        let Token::Group(children) = &spaced else {
            unreachable!()
        };
        // no blank between the name and its bracket
        assert!(matches!(children[1], Token::Bracket(_)));
    }

    #[test]
    fn test_adjacent_scripts_touch() {
        let script = || {
            Token::Script(ScriptGroup {
                base: vec![Token::literal("x")],
                subscript: vec![],
                superscript: vec![Token::literal("2")],
            })
        };
        let tokens = add_spacing(vec![script(), script()], &SpacingClasses::builtin());
        assert_eq!(tokens.len(), 2);

        let tokens = add_spacing(vec![script(), Token::literal("y")], &SpacingClasses::builtin());
        assert_eq!(tokens.len(), 2);

        let tokens = add_spacing(vec![script(), Token::literal("+")], &SpacingClasses::builtin());
        assert_eq!(tokens.len(), 3);
    }
}
