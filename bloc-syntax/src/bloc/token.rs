//! Structural tokens.
//!
//! Tokens are transient: the scanner derives them from text on every query and nobody
//! keeps them across edits.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Syntactic category of a structural token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// `;` or a line break.
    Separator,
    /// `begin NAME`, payload is the name.
    Begin,
    For,
    /// `if` whose line ends right after `then`.
    IfBlock,
    /// Single-line `if`, never closed.
    IfLine,
    Sub,
    Until,
    While,
    Gsave,
    /// `end WORD`, payload is the word.
    EndThing,
    /// `end` with nothing after it.
    End,
    Next,
    /// `next VAR`, payload is the variable.
    NextVar,
    Grestore,
    /// `else` directly followed by `if`.
    ElseLine,
    ElseBloc,
    Then,
    /// `to` inside a `for` header.
    To,
    /// `step` inside a `for` header.
    Step,
    /// `=` inside a `for` header.
    Assign,
    /// Opaque expression text.
    Exp,
    /// Word directly followed by `=`.
    Var,
    /// Start or end of the buffer (or of the scan window).
    Eob,
}

impl TokenKind {
    pub const ALL: [TokenKind; 23] = [
        TokenKind::Separator,
        TokenKind::Begin,
        TokenKind::For,
        TokenKind::IfBlock,
        TokenKind::IfLine,
        TokenKind::Sub,
        TokenKind::Until,
        TokenKind::While,
        TokenKind::Gsave,
        TokenKind::EndThing,
        TokenKind::End,
        TokenKind::Next,
        TokenKind::NextVar,
        TokenKind::Grestore,
        TokenKind::ElseLine,
        TokenKind::ElseBloc,
        TokenKind::Then,
        TokenKind::To,
        TokenKind::Step,
        TokenKind::Assign,
        TokenKind::Exp,
        TokenKind::Var,
        TokenKind::Eob,
    ];

    /// Name used in grammar listings and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Separator => ";",
            TokenKind::Begin => "begin",
            TokenKind::For => "for",
            TokenKind::IfBlock => "if-block",
            TokenKind::IfLine => "if-line",
            TokenKind::Sub => "sub",
            TokenKind::Until => "until",
            TokenKind::While => "while",
            TokenKind::Gsave => "gsave",
            TokenKind::EndThing => "end-thing",
            TokenKind::End => "end",
            TokenKind::Next => "next",
            TokenKind::NextVar => "next-var",
            TokenKind::Grestore => "grestore",
            TokenKind::ElseLine => "else-line",
            TokenKind::ElseBloc => "else-bloc",
            TokenKind::Then => "then",
            TokenKind::To => "to",
            TokenKind::Step => "step",
            TokenKind::Assign => "=",
            TokenKind::Exp => "<exp>",
            TokenKind::Var => "<var>",
            TokenKind::Eob => "<eob>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified span of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range covered by the token, keyword and payload included.
    pub span: Range<usize>,
    /// Block name of `begin`/`end-thing`, variable of `next-var`.
    pub payload: Option<Range<usize>>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self {
            kind,
            span,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Range<usize>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn eob(position: usize) -> Self {
        Self::new(TokenKind::Eob, position..position)
    }

    /// Byte offset where the token starts.
    pub fn position(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn is_eob(&self) -> bool {
        self.kind == TokenKind::Eob
    }

    pub fn text<'a>(&self, buffer: &'a str) -> &'a str {
        &buffer[self.span.clone()]
    }

    pub fn payload_text<'a>(&self, buffer: &'a str) -> Option<&'a str> {
        self.payload.clone().map(|range| &buffer[range])
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.kind, self.span.start, self.span.end)
    }
}
