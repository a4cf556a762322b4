//! Line lexer: cuts one physical line into lexemes.
//!
//! String literals use a one-character lookahead for doubled quotes: inside a string, a
//! quote followed by the same quote is a literal quote, anything else ends the string.
//! This makes `""""` a single string holding one quote rather than two empty strings.
//! Whether the bloc processor really treats doubled quotes this way is unverified; the
//! rule is kept as is. Unterminated strings run to the end of the line.

use crate::bloc::classification::{CharClass, SyntaxTable};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    Word,
    Symbol,
    /// A lone `=` (not part of `==`).
    Equals,
    Str,
    Semicolon,
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub span: Range<usize>,
}

/// Lexemes of one line plus the offset where the next line starts.
#[derive(Debug, Clone)]
pub struct LineLexemes {
    pub start: usize,
    pub end: usize,
    pub lexemes: Vec<Lexeme>,
}

/// Lex the line starting at `line_start`, up to and including its line break.
pub fn lex_line(text: &str, line_start: usize, table: &SyntaxTable) -> LineLexemes {
    let mut lexemes = Vec::new();
    let mut pos = line_start;
    let end = loop {
        if pos >= text.len() {
            break text.len();
        }
        match table.class_at(text, pos) {
            CharClass::Newline => {
                lexemes.push(Lexeme {
                    kind: LexemeKind::Newline,
                    span: pos..pos + 1,
                });
                break pos + 1;
            }
            CharClass::Whitespace => pos = next_char(text, pos),
            CharClass::CommentStart => {
                pos = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
            }
            CharClass::Separator => {
                lexemes.push(Lexeme {
                    kind: LexemeKind::Semicolon,
                    span: pos..pos + 1,
                });
                pos += 1;
            }
            CharClass::StringQuote => {
                let end = string_end(text, pos);
                lexemes.push(Lexeme {
                    kind: LexemeKind::Str,
                    span: pos..end,
                });
                pos = end;
            }
            CharClass::Word => {
                let end = run_end(text, pos, table, CharClass::Word);
                lexemes.push(Lexeme {
                    kind: LexemeKind::Word,
                    span: pos..end,
                });
                pos = end;
            }
            CharClass::Symbol => {
                if is_lone_equals(text, pos) {
                    lexemes.push(Lexeme {
                        kind: LexemeKind::Equals,
                        span: pos..pos + 1,
                    });
                    pos += 1;
                } else {
                    let end = run_end(text, pos, table, CharClass::Symbol);
                    lexemes.push(Lexeme {
                        kind: LexemeKind::Symbol,
                        span: pos..end,
                    });
                    pos = end;
                }
            }
        }
    };
    LineLexemes {
        start: line_start,
        end,
        lexemes,
    }
}

fn next_char(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

fn run_end(text: &str, start: usize, table: &SyntaxTable, class: CharClass) -> usize {
    let mut pos = next_char(text, start);
    while pos < text.len() && table.class_at(text, pos) == class {
        pos = next_char(text, pos);
    }
    pos
}

fn is_lone_equals(text: &str, pos: usize) -> bool {
    text[pos..].starts_with('=') && !text[pos + 1..].starts_with('=')
}

/// End of the string literal opening at `open`: after its closing quote, or at the line end.
pub(crate) fn string_end(text: &str, open: usize) -> usize {
    let bytes = text.as_bytes();
    let quote = bytes[open];
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\n' => return pos,
            b if b == quote => {
                if bytes.get(pos + 1) == Some(&quote) {
                    pos += 2;
                } else {
                    return pos + 1;
                }
            }
            _ => pos += 1,
        }
    }
    bytes.len()
}
