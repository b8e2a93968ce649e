//! Script parser - attach `_` and `^` operands to their base

use crate::error::{MathError, MathResult};
use crate::model::{ScriptGroup, ScriptKind, Token};

pub(crate) fn parse_scripts(tokens: Vec<Token>) -> MathResult<Vec<Token>> {
    let mut input = tokens.into_iter();
    let mut out: Vec<Token> = Vec::with_capacity(input.len());

    while let Some(token) = input.next() {
        let Some(kind) = token.as_literal().and_then(ScriptKind::from_literal) else {
            out.push(token.try_map_children(&mut parse_scripts)?);
            continue;
        };

        let base = out.pop().unwrap_or_else(|| Token::literal(""));
        let script = fetch_script(&mut input, kind)?;

        let group = match base {
            Token::Script(mut group) => {
                if !group.slot(kind).is_empty() {
                    return Err(MathError::Tokenization(format!(
                        "multiple {} found inline",
                        kind.describe()
                    )));
                }
                group.slot_mut(kind).push(script);
                group
            }
            base => {
                let mut group = ScriptGroup::new(base);
                group.slot_mut(kind).push(script);
                group
            }
        };
        out.push(Token::Script(group));
    }

    Ok(out)
}

fn fetch_script(input: &mut impl Iterator<Item = Token>, kind: ScriptKind) -> MathResult<Token> {
    let Some(script) = input.next() else {
        return Err(MathError::Build(format!(
            "no token left to use for {}",
            kind.describe()
        )));
    };
    if let Some(literal) = script.as_literal() {
        if ScriptKind::from_literal(literal).is_some() {
            return Err(MathError::Tokenization(format!(
                "script operator followed by {:?}",
                literal.text
            )));
        }
    }
    script.try_map_children(&mut parse_scripts)
}
