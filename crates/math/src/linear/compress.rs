//! Compression - merge runs of adjacent literals

use crate::model::Token;

pub(crate) fn compress(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if let Token::Literal(next) = &token {
            if let Some(Token::Literal(previous)) = out.last_mut() {
                previous.text.push_str(&next.text);
                previous.skip_formatting |= next.skip_formatting;
                continue;
            }
        }
        out.push(token.map_children(&mut compress));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    #[test]
    fn test_runs_are_merged() {
        let tokens = vec![
            Token::literal("a"),
            Token::literal(" "),
            Token::Literal(Literal::finalized("+")),
            Token::Group(vec![Token::literal("b"), Token::literal("c")]),
            Token::literal("d"),
        ];
        assert_eq!(
            compress(tokens),
            vec![
                Token::Literal(Literal::finalized("a +")),
                Token::Group(vec![Token::literal("bc")]),
                Token::literal("d"),
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(compress(Vec::new()).is_empty());
    }
}
