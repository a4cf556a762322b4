//! Structural queries: matching, parse context, indentation, closing and reindentation.

use super::precedence::{Role, BLOCK_TABLE};
use crate::bloc::classification::{SyntaxOptions, SyntaxTable};
use crate::bloc::lexing::{self, Scanner};
use crate::bloc::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Columns per indentation unit.
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Tokens one query may visit; 0 lifts the bound.
    pub max_scan_tokens: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            max_scan_tokens: 20_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseError {
    #[error("no enclosing construct")]
    NoEnclosingConstruct,
    #[error("`end {found}` at offset {position} closes `begin {expected}`")]
    MismatchedName {
        expected: String,
        found: String,
        position: usize,
    },
}

/// An opener and the closer (or inner keyword) that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryMatch {
    pub opener: Token,
    pub closer: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenConstruct {
    pub kind: TokenKind,
    pub position: usize,
}

/// Constructs open at a position, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseContext {
    pub constructs: Vec<OpenConstruct>,
}

impl ParseContext {
    pub fn innermost(&self) -> Option<&OpenConstruct> {
        self.constructs.last()
    }

    pub fn depth(&self) -> usize {
        self.constructs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructs.is_empty()
    }
}

/// Indentation of a line relative to an earlier line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indentation {
    /// Start of the line whose indentation this one builds on.
    pub anchor: Option<usize>,
    /// Units added to the anchor's indentation.
    pub delta: usize,
}

/// Backward walk state shared by consecutive searches of one query.
struct Walk {
    pos: usize,
    pending: Vec<Token>,
    mismatches: Vec<(Token, Token)>,
}

impl Walk {
    fn at(pos: usize) -> Self {
        Self {
            pos,
            pending: Vec::new(),
            mismatches: Vec::new(),
        }
    }
}

/// Answers structural questions about bloc buffers.
#[derive(Debug, Clone)]
pub struct Engine {
    table: SyntaxTable,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&SyntaxOptions::default(), EngineOptions::default())
    }
}

impl Engine {
    pub fn new(syntax: &SyntaxOptions, options: EngineOptions) -> Self {
        Self {
            table: SyntaxTable::new(syntax),
            options,
        }
    }

    pub fn table(&self) -> &SyntaxTable {
        &self.table
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn scanner<'a>(&'a self, buffer: &'a str) -> Scanner<'a> {
        let scanner = Scanner::new(buffer, &self.table);
        match self.options.max_scan_tokens {
            0 => scanner,
            budget => scanner.with_budget(budget),
        }
    }

    /// Token at or after `position`.
    pub fn classify(&self, buffer: &str, position: usize) -> Token {
        self.scanner(buffer).next_token(position)
    }

    pub fn tokenize(&self, buffer: &str) -> Vec<Token> {
        lexing::tokenize(buffer, &self.table)
    }

    /// Whether `closer` closes (or, for an inner keyword, continues) the construct `opener`
    /// starts.
    pub fn accepts(&self, buffer: &str, opener: &Token, closer: &Token) -> bool {
        if !BLOCK_TABLE.closes(closer.kind, opener.kind) {
            return false;
        }
        if closer.kind != TokenKind::EndThing {
            return true;
        }
        let word = closer.payload_text(buffer).unwrap_or_default();
        let family = if self.table.is_keyword(word, "if") {
            TokenKind::IfBlock
        } else if self.table.is_keyword(word, "sub") {
            TokenKind::Sub
        } else {
            TokenKind::Begin
        };
        opener.kind == family
    }

    /// Whether a matched `begin`/`end` pair spells its bloc name differently.
    pub fn names_differ(&self, buffer: &str, opener: &Token, closer: &Token) -> bool {
        if opener.kind != TokenKind::Begin || closer.kind != TokenKind::EndThing {
            return false;
        }
        match (opener.payload_text(buffer), closer.payload_text(buffer)) {
            (Some(begin), Some(end)) => !self.table.is_keyword(begin, end),
            _ => true,
        }
    }

    pub fn find_match(&self, buffer: &str, position: usize) -> Option<BoundaryMatch> {
        let mut scanner = self.scanner(buffer);
        let token = scanner.next_token(position);
        if self.continues_block_if(&mut scanner, &token) {
            let opener = self.opener_of(&mut scanner, buffer, &as_else(&token))?;
            return Some(BoundaryMatch {
                opener,
                closer: token,
            });
        }
        match BLOCK_TABLE.role(token.kind) {
            Role::Opener => {
                let closer = self.closer_of(&mut scanner, buffer, &token)?;
                Some(BoundaryMatch {
                    opener: token,
                    closer,
                })
            }
            Role::Closer | Role::Inner => {
                if token.kind == TokenKind::ElseBloc && self.is_flat_else(&mut scanner, &token) {
                    return None;
                }
                let opener = self.opener_of(&mut scanner, buffer, &token)?;
                Some(BoundaryMatch {
                    opener,
                    closer: token,
                })
            }
            Role::Neutral => None,
        }
    }

    /// Position of the token matching the one at `position`: the closer of an opener, the
    /// opener of a closer or inner keyword.
    pub fn matching_boundary(&self, buffer: &str, position: usize) -> Option<usize> {
        let token = self.classify(buffer, position);
        let found = self.find_match(buffer, position)?;
        if found.opener == token {
            Some(found.closer.position())
        } else {
            Some(found.opener.position())
        }
    }

    pub fn context_at(&self, buffer: &str, position: usize) -> ParseContext {
        let mut scanner = self.scanner(buffer);
        let mut walk = Walk::at(position.min(buffer.len()));
        let mut constructs = Vec::new();
        while let Some(opener) = self.unclosed_before(&mut scanner, buffer, &mut walk) {
            constructs.push(OpenConstruct {
                kind: opener.kind,
                position: opener.position(),
            });
        }
        constructs.reverse();
        ParseContext { constructs }
    }

    pub fn indentation(&self, buffer: &str, line_start: usize) -> Indentation {
        let mut scanner = self.scanner(buffer);
        let line_start = scanner.line_start(line_start);
        let line_end = buffer[line_start..]
            .find('\n')
            .map_or(buffer.len(), |i| line_start + i);
        let first = scanner.next_token(line_start);
        let leads = !first.is_eob() && first.position() <= line_end;

        let aligned = if !leads {
            None
        } else if self.continues_block_if(&mut scanner, &first) {
            self.opener_of(&mut scanner, buffer, &as_else(&first))
        } else if BLOCK_TABLE.role(first.kind) == Role::Closer
            || (first.kind == TokenKind::ElseBloc && !self.is_flat_else(&mut scanner, &first))
        {
            self.opener_of(&mut scanner, buffer, &first)
        } else {
            None
        };
        if let Some(opener) = aligned {
            return Indentation {
                anchor: Some(scanner.line_start(opener.position())),
                delta: 0,
            };
        }

        let mut walk = Walk::at(line_start);
        match self.unclosed_before(&mut scanner, buffer, &mut walk) {
            Some(opener) => Indentation {
                anchor: Some(scanner.line_start(opener.position())),
                delta: 1,
            },
            None => Indentation {
                anchor: None,
                delta: 0,
            },
        }
    }

    pub fn indent_of(&self, buffer: &str, line_start: usize) -> usize {
        let indentation = self.indentation(buffer, line_start);
        let base = indentation
            .anchor
            .map_or(0, |anchor| self.leading_columns(buffer, anchor) / self.unit());
        base + indentation.delta
    }

    pub fn closing_text(&self, buffer: &str, position: usize) -> Result<String, CloseError> {
        let mut scanner = self.scanner(buffer);
        let mut walk = Walk::at(position.min(buffer.len()));
        let opener = self
            .unclosed_before(&mut scanner, buffer, &mut walk)
            .ok_or(CloseError::NoEnclosingConstruct)?;
        if let Some((begin, end)) = walk.mismatches.first() {
            return Err(CloseError::MismatchedName {
                expected: begin.payload_text(buffer).unwrap_or_default().to_string(),
                found: end.payload_text(buffer).unwrap_or_default().to_string(),
                position: end.position(),
            });
        }
        let text = match opener.kind {
            TokenKind::While | TokenKind::Until => "next".to_string(),
            TokenKind::IfBlock => "end if".to_string(),
            TokenKind::Sub => "end sub".to_string(),
            TokenKind::Gsave => "grestore".to_string(),
            TokenKind::For => {
                let var = scanner.next_token(opener.end());
                if var.kind == TokenKind::Var {
                    format!("next {}", var.text(buffer))
                } else {
                    "next".to_string()
                }
            }
            TokenKind::Begin => match opener.payload_text(buffer) {
                Some(name) => format!("end {name}"),
                None => "end".to_string(),
            },
            _ => return Err(CloseError::NoEnclosingConstruct),
        };
        Ok(text)
    }

    /// Rewrite the leading whitespace of every line. Blank lines are emptied.
    pub fn reindent(&self, buffer: &str) -> String {
        let mut levels: HashMap<usize, usize> = HashMap::new();
        let mut out = String::with_capacity(buffer.len());
        let mut start = 0;
        for line in buffer.split_inclusive('\n') {
            let indentation = self.indentation(buffer, start);
            let level = indentation
                .anchor
                .and_then(|anchor| levels.get(&anchor).copied())
                .unwrap_or(0)
                + indentation.delta;
            levels.insert(start, level);

            let content = line.trim_start_matches([' ', '\t']);
            let body = content.trim_end_matches(['\n', '\r']);
            if body.trim().is_empty() {
                out.push_str(&content[body.len()..]);
            } else {
                out.push_str(&self.indent_string(level));
                out.push_str(content);
            }
            start += line.len();
        }
        out
    }

    fn unit(&self) -> usize {
        self.options.indent_width.max(1)
    }

    fn indent_string(&self, level: usize) -> String {
        if self.options.use_tabs {
            "\t".repeat(level)
        } else {
            " ".repeat(level * self.unit())
        }
    }

    fn leading_columns(&self, buffer: &str, line_start: usize) -> usize {
        buffer[line_start..]
            .chars()
            .map_while(|c| match c {
                ' ' => Some(1),
                '\t' => Some(self.unit()),
                _ => None,
            })
            .sum()
    }

    /// Next opener, walking back from `walk.pos`, that none of the closers in between
    /// closes. Closers still pending carry over to the next call.
    fn unclosed_before(
        &self,
        scanner: &mut Scanner<'_>,
        buffer: &str,
        walk: &mut Walk,
    ) -> Option<Token> {
        loop {
            let token = scanner.backward(&mut walk.pos);
            if token.is_eob() {
                return None;
            }
            match self.role_in_context(scanner, &token) {
                Role::Closer => walk.pending.push(token),
                Role::Opener => {
                    if self.close_pending(buffer, &token, walk).is_none() {
                        return Some(token);
                    }
                }
                Role::Inner | Role::Neutral => {}
            }
        }
    }

    /// Pop the innermost pending closer `opener` accepts, with any stray closers above it.
    /// Returns its index in the pending stack.
    fn close_pending(&self, buffer: &str, opener: &Token, walk: &mut Walk) -> Option<usize> {
        let i = walk
            .pending
            .iter()
            .rposition(|closer| self.accepts(buffer, opener, closer))?;
        if self.names_differ(buffer, opener, &walk.pending[i]) {
            walk.mismatches
                .push((opener.clone(), walk.pending[i].clone()));
        }
        walk.pending.truncate(i);
        Some(i)
    }

    fn opener_of(&self, scanner: &mut Scanner<'_>, buffer: &str, closer: &Token) -> Option<Token> {
        let mut walk = Walk::at(closer.position());
        walk.pending.push(closer.clone());
        loop {
            let token = scanner.backward(&mut walk.pos);
            if token.is_eob() {
                return None;
            }
            match self.role_in_context(scanner, &token) {
                Role::Closer => walk.pending.push(token),
                Role::Opener => {
                    if self.close_pending(buffer, &token, &mut walk) == Some(0) {
                        return Some(token);
                    }
                }
                Role::Inner | Role::Neutral => {}
            }
        }
    }

    fn closer_of(&self, scanner: &mut Scanner<'_>, buffer: &str, opener: &Token) -> Option<Token> {
        let mut pos = opener.end();
        let mut pending = vec![opener.clone()];
        loop {
            let token = scanner.forward(&mut pos);
            if token.is_eob() {
                return None;
            }
            match self.role_in_context(scanner, &token) {
                Role::Opener => pending.push(token),
                Role::Closer => {
                    let found = pending
                        .iter()
                        .rposition(|open| self.accepts(buffer, open, &token));
                    match found {
                        Some(0) => return Some(token),
                        Some(i) => pending.truncate(i),
                        None => {}
                    }
                }
                Role::Inner | Role::Neutral => {}
            }
        }
    }

    /// Whether `else_token` continues a chain of single-line `if`/`else if` statements.
    fn is_flat_else(&self, scanner: &mut Scanner<'_>, else_token: &Token) -> bool {
        let mut pos = else_token.position();
        let mut token = scanner.backward(&mut pos);
        while token.kind == TokenKind::Separator {
            token = scanner.backward(&mut pos);
        }
        if token.is_eob() {
            return false;
        }
        let mut first = token;
        loop {
            let before = scanner.backward(&mut pos);
            if before.is_eob() || before.kind == TokenKind::Separator {
                break;
            }
            first = before;
        }
        match first.kind {
            TokenKind::IfLine => true,
            TokenKind::ElseLine => !self.continues_block_if(scanner, &first),
            _ => false,
        }
    }

    /// Whether `token` is the `else` or the `if` of an `else if ... then` line ending in a
    /// block. Such a line continues the block `if` above it instead of opening a new one.
    fn continues_block_if(&self, scanner: &mut Scanner<'_>, token: &Token) -> bool {
        match token.kind {
            TokenKind::IfBlock => scanner.prev_token(token.position()).kind == TokenKind::ElseLine,
            TokenKind::ElseLine => scanner.next_token(token.end()).kind == TokenKind::IfBlock,
            _ => false,
        }
    }

    fn role_in_context(&self, scanner: &mut Scanner<'_>, token: &Token) -> Role {
        if token.kind == TokenKind::IfBlock && self.continues_block_if(scanner, token) {
            Role::Inner
        } else {
            BLOCK_TABLE.role(token.kind)
        }
    }
}

/// `token` standing in for the `else` of a block `if`.
fn as_else(token: &Token) -> Token {
    Token::new(TokenKind::ElseBloc, token.span.clone())
}
