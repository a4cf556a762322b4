//! Lexing
//!
//!     Tokenization runs in three layers, each one only looking at a single physical line:
//!
//!         1. Lexemes. See [lexemes](lexemes). The line is cut into words, symbol runs,
//!            strings, separators and the line break, using the [`SyntaxTable`]. Comments are
//!            dropped here, which is how they end every same-line lookahead.
//!
//!         2. Disambiguation. See [disambiguation](disambiguation). Lexemes become
//!            [`Token`]s. This is where `if` becomes `if-block` or `if-line`, `end box` is
//!            folded into one `end-thing`, and a word before `=` becomes a `<var>`.
//!
//!         3. Scanning. See [scanner](scanner). The [`Scanner`] walks tokens forward or
//!            backward from any offset.
//!
//! Direction Independence
//!
//!     A token never spans a line break (the break itself is a separator token), and every
//!     ambiguity is resolved within the line. So the scanner can always re-lex the whole line
//!     it lands on, forwards, and pick the token it needs. Backward scanning therefore
//!     re-derives exactly the classification a forward scan produces, and
//!     `backward(forward(t)) == t` holds for every token.

pub mod disambiguation;
pub mod lexemes;
pub mod scanner;

pub use scanner::Scanner;

use crate::bloc::classification::SyntaxTable;
use crate::bloc::token::Token;

/// Tokenize a whole buffer.
pub fn tokenize(buffer: &str, table: &SyntaxTable) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line_start = 0;
    while line_start < buffer.len() {
        let line = lexemes::lex_line(buffer, line_start, table);
        tokens.extend(disambiguation::classify_line(buffer, &line.lexemes, table));
        line_start = line.end;
    }
    tokens
}

/// Token at or after `position`.
pub fn classify(buffer: &str, position: usize, table: &SyntaxTable) -> Token {
    Scanner::new(buffer, table).next_token(position)
}
