//! Keyword Disambiguation
//!
//!     Turns the lexemes of one line into structural tokens. All lookahead stays within the
//!     line; comments were already removed by the lexer, so they end every lookahead.
//!
//!     if      `if-block` when a `then` follows on the line and nothing but a separator or
//!             the line end comes after it; `if-line` otherwise (including no `then`).
//!     else    `else-line` when the next lexeme is the word `if`, `else-bloc` otherwise.
//!     end     folds a following word into one `end-thing` token, else bare `end`.
//!     next    folds a following word into one `next-var` token, else bare `next`.
//!     begin   folds the block name that follows, if any.
//!     word    followed by a lone `=` is a `<var>`.
//!
//!     `to`, `step` and the header `=` are keywords only inside a `for` header, that is,
//!     between `for` and the next separator.

use super::lexemes::{Lexeme, LexemeKind};
use crate::bloc::classification::SyntaxTable;
use crate::bloc::token::{Token, TokenKind};

/// Classify the lexemes of a single line.
pub fn classify_line(text: &str, lexemes: &[Lexeme], table: &SyntaxTable) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(lexemes.len());
    let mut for_header = ForHeader::Outside;
    let mut i = 0;
    while i < lexemes.len() {
        let lexeme = &lexemes[i];
        let next = lexemes.get(i + 1);
        let token = match lexeme.kind {
            LexemeKind::Newline | LexemeKind::Semicolon => {
                for_header = ForHeader::Outside;
                Token::new(TokenKind::Separator, lexeme.span.clone())
            }
            LexemeKind::Str | LexemeKind::Symbol => Token::new(TokenKind::Exp, lexeme.span.clone()),
            LexemeKind::Equals => {
                if for_header == ForHeader::BeforeAssign {
                    for_header = ForHeader::AfterAssign;
                    Token::new(TokenKind::Assign, lexeme.span.clone())
                } else {
                    Token::new(TokenKind::Exp, lexeme.span.clone())
                }
            }
            LexemeKind::Word => {
                let word = &text[lexeme.span.clone()];
                let is = |keyword: &str| table.is_keyword(word, keyword);
                let following_word = next.filter(|l| l.kind == LexemeKind::Word);
                if is("if") {
                    Token::new(if_kind(text, &lexemes[i + 1..], table), lexeme.span.clone())
                } else if is("else") {
                    let kind = match following_word {
                        Some(l) if table.is_keyword(&text[l.span.clone()], "if") => {
                            TokenKind::ElseLine
                        }
                        _ => TokenKind::ElseBloc,
                    };
                    Token::new(kind, lexeme.span.clone())
                } else if is("end") || is("next") || is("begin") {
                    let (bare, named) = if is("end") {
                        (TokenKind::End, TokenKind::EndThing)
                    } else if is("next") {
                        (TokenKind::Next, TokenKind::NextVar)
                    } else {
                        (TokenKind::Begin, TokenKind::Begin)
                    };
                    match following_word {
                        Some(name) => {
                            i += 1;
                            Token::new(named, lexeme.span.start..name.span.end)
                                .with_payload(name.span.clone())
                        }
                        None => Token::new(bare, lexeme.span.clone()),
                    }
                } else if is("for") {
                    for_header = ForHeader::BeforeAssign;
                    Token::new(TokenKind::For, lexeme.span.clone())
                } else if let Some(kind) = plain_keyword(word, table) {
                    Token::new(kind, lexeme.span.clone())
                } else if for_header == ForHeader::AfterAssign && is("to") {
                    Token::new(TokenKind::To, lexeme.span.clone())
                } else if for_header == ForHeader::AfterAssign && is("step") {
                    Token::new(TokenKind::Step, lexeme.span.clone())
                } else if next.is_some_and(|l| l.kind == LexemeKind::Equals) {
                    Token::new(TokenKind::Var, lexeme.span.clone())
                } else {
                    Token::new(TokenKind::Exp, lexeme.span.clone())
                }
            }
        };
        tokens.push(token);
        i += 1;
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForHeader {
    Outside,
    BeforeAssign,
    AfterAssign,
}

fn plain_keyword(word: &str, table: &SyntaxTable) -> Option<TokenKind> {
    const PLAIN: [(&str, TokenKind); 6] = [
        ("sub", TokenKind::Sub),
        ("while", TokenKind::While),
        ("until", TokenKind::Until),
        ("gsave", TokenKind::Gsave),
        ("grestore", TokenKind::Grestore),
        ("then", TokenKind::Then),
    ];
    PLAIN
        .iter()
        .find(|(keyword, _)| table.is_keyword(word, keyword))
        .map(|(_, kind)| *kind)
}

/// `rest` holds the lexemes after the `if`, up to the end of the line.
fn if_kind(text: &str, rest: &[Lexeme], table: &SyntaxTable) -> TokenKind {
    let then = rest.iter().position(|l| {
        l.kind == LexemeKind::Word && table.is_keyword(&text[l.span.clone()], "then")
    });
    match then.map(|j| rest.get(j + 1)) {
        Some(None) => TokenKind::IfBlock,
        Some(Some(l)) if matches!(l.kind, LexemeKind::Newline | LexemeKind::Semicolon) => {
            TokenKind::IfBlock
        }
        _ => TokenKind::IfLine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloc::lexing::lexemes::lex_line;
    use rstest::rstest;

    fn kinds(line: &str) -> Vec<TokenKind> {
        let table = SyntaxTable::default();
        let lexemes = lex_line(line, 0, &table).lexemes;
        classify_line(line, &lexemes, &table)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[rstest]
    #[case("if x then", TokenKind::IfBlock)]
    #[case("if x then\n", TokenKind::IfBlock)]
    #[case("if x then # trailing note\n", TokenKind::IfBlock)]
    #[case("if x then; print 1", TokenKind::IfBlock)]
    #[case("if x then print 1", TokenKind::IfLine)]
    #[case("if x print 1", TokenKind::IfLine)]
    #[case("IF x THEN", TokenKind::IfBlock)]
    fn classifies_if(#[case] line: &str, #[case] expected: TokenKind) {
        assert_eq!(kinds(line)[0], expected);
    }

    #[test]
    fn else_variants() {
        assert_eq!(kinds("else if a then b")[0], TokenKind::ElseLine);
        assert_eq!(kinds("else")[0], TokenKind::ElseBloc);
        assert_eq!(kinds("else print 2")[0], TokenKind::ElseBloc);
    }

    #[test]
    fn end_consumes_the_following_word() {
        let table = SyntaxTable::default();
        let line = "end box";
        let lexemes = lex_line(line, 0, &table).lexemes;
        let tokens = classify_line(line, &lexemes, &table);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndThing);
        assert_eq!(tokens[0].span, 0..7);
        assert_eq!(tokens[0].payload_text(line), Some("box"));
    }

    #[test]
    fn bare_closers() {
        assert_eq!(kinds("end\n"), vec![TokenKind::End, TokenKind::Separator]);
        assert_eq!(kinds("next; x"), vec![TokenKind::Next, TokenKind::Separator, TokenKind::Exp]);
        assert_eq!(kinds("next i"), vec![TokenKind::NextVar]);
    }

    #[test]
    fn for_header_keywords() {
        assert_eq!(
            kinds("for i = 1 to 10 step 2"),
            vec![
                TokenKind::For,
                TokenKind::Var,
                TokenKind::Assign,
                TokenKind::Exp,
                TokenKind::To,
                TokenKind::Exp,
                TokenKind::Step,
                TokenKind::Exp,
            ]
        );
    }

    #[test]
    fn header_words_are_plain_outside_for() {
        assert_eq!(
            kinds("x = to; step"),
            vec![
                TokenKind::Var,
                TokenKind::Exp,
                TokenKind::Exp,
                TokenKind::Separator,
                TokenKind::Exp
            ]
        );
    }

    #[test]
    fn comparison_is_not_assignment() {
        assert_eq!(
            kinds("if a==0 then print 0"),
            vec![
                TokenKind::IfLine,
                TokenKind::Exp,
                TokenKind::Exp,
                TokenKind::Exp,
                TokenKind::Then,
                TokenKind::Exp,
                TokenKind::Exp,
            ]
        );
    }

    #[test]
    fn begin_takes_its_name() {
        let table = SyntaxTable::default();
        let line = "begin box fill";
        let lexemes = lex_line(line, 0, &table).lexemes;
        let tokens = classify_line(line, &lexemes, &table);
        assert_eq!(tokens[0].kind, TokenKind::Begin);
        assert_eq!(tokens[0].payload_text(line), Some("box"));
        assert_eq!(tokens[1].kind, TokenKind::Exp);
    }
}
