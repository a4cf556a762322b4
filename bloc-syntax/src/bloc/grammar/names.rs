//! Bloc names.
//!
//! A `begin NAME` and the `end NAME` closing it should spell the same name. The names are
//! read off the token stream on demand, so there is nothing to keep in sync with the text.

use super::engine::Engine;
use super::precedence::{Role, BLOCK_TABLE};
use crate::bloc::token::{Token, TokenKind};
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSide {
    Begin,
    End,
}

/// Name of a `begin NAME` or `end NAME`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSpan {
    pub side: NameSide,
    pub name: String,
    /// Byte range of the name alone.
    pub range: Range<usize>,
    /// Byte range of the whole keyword token.
    pub token: Range<usize>,
}

/// A structurally matched `begin`/`end` pair whose names differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameMismatch {
    pub begin: Token,
    pub end: Token,
    pub expected: String,
    pub found: String,
}

/// Replace `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Engine {
    /// Every `begin NAME` and `end NAME` of the buffer, in text order. `end if` and
    /// `end sub` are not bloc names.
    pub fn named_spans(&self, buffer: &str) -> Vec<NamedSpan> {
        self.tokenize(buffer)
            .into_iter()
            .filter_map(|token| {
                let side = match token.kind {
                    TokenKind::Begin => NameSide::Begin,
                    TokenKind::EndThing if self.is_bloc_end(buffer, &token) => NameSide::End,
                    _ => return None,
                };
                let range = token.payload.clone()?;
                Some(NamedSpan {
                    side,
                    name: buffer[range.clone()].to_string(),
                    range,
                    token: token.span,
                })
            })
            .collect()
    }

    /// Matched `begin`/`end` pairs with differing names, in order of their `end`.
    pub fn name_mismatches(&self, buffer: &str) -> Vec<NameMismatch> {
        let mut open: Vec<Token> = Vec::new();
        let mut mismatches = Vec::new();
        let mut previous = TokenKind::Eob;
        for token in self.tokenize(buffer) {
            let kind = std::mem::replace(&mut previous, token.kind);
            // the `if` of `else if ... then` continues the open `if`
            if token.kind == TokenKind::IfBlock && kind == TokenKind::ElseLine {
                continue;
            }
            match BLOCK_TABLE.role(token.kind) {
                Role::Opener => open.push(token),
                Role::Closer => {
                    let Some(i) = open
                        .iter()
                        .rposition(|opener| self.accepts(buffer, opener, &token))
                    else {
                        continue;
                    };
                    if self.names_differ(buffer, &open[i], &token) {
                        mismatches.push(NameMismatch {
                            expected: name_of(buffer, &open[i]),
                            found: name_of(buffer, &token),
                            begin: open[i].clone(),
                            end: token,
                        });
                    }
                    open.truncate(i);
                }
                Role::Inner | Role::Neutral => {}
            }
        }
        mismatches
    }

    /// Edit that gives the partner of the `begin`/`end` at `position` the same name.
    /// `None` when the token there is not a bloc `begin`/`end`, has no partner, or the
    /// names already agree.
    pub fn sync_name_edit(&self, buffer: &str, position: usize) -> Option<NameEdit> {
        let token = self.classify(buffer, position);
        if !matches!(token.kind, TokenKind::Begin | TokenKind::EndThing) {
            return None;
        }
        let found = self.find_match(buffer, position)?;
        if found.opener.kind != TokenKind::Begin
            || !self.names_differ(buffer, &found.opener, &found.closer)
        {
            return None;
        }
        let (source, target) = if found.opener == token {
            (&found.opener, &found.closer)
        } else {
            (&found.closer, &found.opener)
        };
        let name = source.payload_text(buffer)?;
        Some(match &target.payload {
            Some(range) => NameEdit {
                range: range.clone(),
                replacement: name.to_string(),
            },
            None => NameEdit {
                range: target.end()..target.end(),
                replacement: format!(" {name}"),
            },
        })
    }

    fn is_bloc_end(&self, buffer: &str, token: &Token) -> bool {
        token.payload_text(buffer).is_some_and(|word| {
            !self.table().is_keyword(word, "if") && !self.table().is_keyword(word, "sub")
        })
    }
}

fn name_of(buffer: &str, token: &Token) -> String {
    token.payload_text(buffer).unwrap_or_default().to_string()
}
