//! Bidirectional token scanner.
//!
//! The scanner re-lexes the physical line it lands on and keeps that single line cached,
//! so walking token by token through a line costs one lexing pass. The cache lives as long
//! as the scanner, which lives as long as one query.

use super::disambiguation::classify_line;
use super::lexemes::lex_line;
use crate::bloc::classification::SyntaxTable;
use crate::bloc::token::Token;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedLine {
    start: usize,
    end: usize,
    tokens: Vec<Token>,
}

/// Walks structural tokens of a buffer in either direction.
pub struct Scanner<'a> {
    buffer: &'a str,
    table: &'a SyntaxTable,
    line: Option<CachedLine>,
    budget: Option<usize>,
    visited: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(buffer: &'a str, table: &'a SyntaxTable) -> Self {
        Self {
            buffer,
            table,
            line: None,
            budget: None,
            visited: 0,
        }
    }

    /// Limit the number of tokens this scanner hands out. Once spent, every call answers
    /// with an end-of-buffer token, as if the scan window ended there.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn buffer(&self) -> &'a str {
        self.buffer
    }

    pub fn table(&self) -> &'a SyntaxTable {
        self.table
    }

    /// Whether the token budget ran out during this scan.
    pub fn exhausted(&self) -> bool {
        self.budget.is_some_and(|budget| self.visited > budget)
    }

    /// First token ending after `pos`: the token containing `pos`, or the next one.
    pub fn next_token(&mut self, pos: usize) -> Token {
        let mut pos = pos.min(self.buffer.len());
        loop {
            if pos >= self.buffer.len() {
                return Token::eob(self.buffer.len());
            }
            if !self.spend() {
                return Token::eob(pos);
            }
            let line = self.line_at(pos);
            if let Some(token) = line.tokens.iter().find(|t| t.end() > pos) {
                return token.clone();
            }
            pos = line.end;
        }
    }

    /// Last token starting before `pos`.
    pub fn prev_token(&mut self, pos: usize) -> Token {
        let mut pos = pos.min(self.buffer.len());
        loop {
            if pos == 0 {
                return Token::eob(0);
            }
            if !self.spend() {
                return Token::eob(pos);
            }
            let line = self.line_at(pos - 1);
            if let Some(token) = line.tokens.iter().rev().find(|t| t.position() < pos) {
                return token.clone();
            }
            pos = line.start;
        }
    }

    /// Return the token after `*pos` and move `*pos` past it.
    pub fn forward(&mut self, pos: &mut usize) -> Token {
        let token = self.next_token(*pos);
        *pos = token.end();
        token
    }

    /// Return the token before `*pos` and move `*pos` to its start.
    pub fn backward(&mut self, pos: &mut usize) -> Token {
        let token = self.prev_token(*pos);
        *pos = token.position();
        token
    }

    /// Offset of the first byte of the line containing `pos`.
    pub fn line_start(&self, pos: usize) -> usize {
        line_start_of(self.buffer, pos)
    }

    fn spend(&mut self) -> bool {
        self.visited += 1;
        match self.budget {
            Some(budget) if self.visited > budget => {
                if self.visited == budget + 1 {
                    debug!(budget, "token scan budget exhausted");
                }
                false
            }
            _ => true,
        }
    }

    fn line_at(&mut self, pos: usize) -> &CachedLine {
        if self
            .line
            .as_ref()
            .is_some_and(|line| pos < line.start || pos >= line.end)
        {
            self.line = None;
        }
        let (buffer, table) = (self.buffer, self.table);
        self.line.get_or_insert_with(|| {
            let start = line_start_of(buffer, pos);
            let lexed = lex_line(buffer, start, table);
            CachedLine {
                start,
                end: lexed.end,
                tokens: classify_line(buffer, &lexed.lexemes, table),
            }
        })
    }
}

/// `pos` may fall inside a multi-byte character; the line is the one holding that character.
fn line_start_of(buffer: &str, pos: usize) -> usize {
    let mut pos = pos.min(buffer.len());
    while !buffer.is_char_boundary(pos) {
        pos -= 1;
    }
    buffer[..pos].rfind('\n').map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloc::token::TokenKind;

    #[test]
    fn walks_forward_across_lines() {
        let table = SyntaxTable::default();
        let source = "for i = 1 to 3\n  print i\nnext i\n";
        let mut scanner = Scanner::new(source, &table);
        let mut pos = 0;
        let mut kinds = Vec::new();
        loop {
            let token = scanner.forward(&mut pos);
            if token.is_eob() {
                break;
            }
            kinds.push(token.kind);
        }
        assert_eq!(
            kinds,
            vec![
                TokenKind::For,
                TokenKind::Var,
                TokenKind::Assign,
                TokenKind::Exp,
                TokenKind::To,
                TokenKind::Exp,
                TokenKind::Separator,
                TokenKind::Exp,
                TokenKind::Exp,
                TokenKind::Separator,
                TokenKind::NextVar,
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn backward_rederives_if_classification() {
        let table = SyntaxTable::default();
        let source = "if x then\n  y\nend if";
        let mut scanner = Scanner::new(source, &table);
        let mut pos = source.find("  y").unwrap();
        assert_eq!(scanner.backward(&mut pos).kind, TokenKind::Separator);
        assert_eq!(scanner.backward(&mut pos).kind, TokenKind::Then);
        assert_eq!(scanner.backward(&mut pos).kind, TokenKind::Exp);
        let token = scanner.backward(&mut pos);
        assert_eq!(token.kind, TokenKind::IfBlock);
        assert_eq!(pos, 0);
        assert!(scanner.backward(&mut pos).is_eob());
    }

    #[test]
    fn skips_blank_and_comment_only_stretches() {
        let table = SyntaxTable::default();
        let source = "a   # note";
        let mut scanner = Scanner::new(source, &table);
        assert!(scanner.next_token(2).is_eob());
        assert_eq!(scanner.prev_token(source.len()).kind, TokenKind::Exp);
    }

    #[test]
    fn steps_back_over_multibyte_characters() {
        let table = SyntaxTable::default();
        let source = "begin café\nx «»";
        let mut scanner = Scanner::new(source, &table);
        let token = scanner.prev_token("begin café".len());
        assert_eq!(token.kind, TokenKind::Begin);
        assert_eq!(token.payload_text(source), Some("café"));
        assert_eq!(scanner.prev_token(source.len()).text(source), "«»");
        // inside `»`
        assert_eq!(scanner.line_start(source.len() - 1), "begin café\n".len());
    }

    #[test]
    fn budget_cuts_the_scan_short() {
        let table = SyntaxTable::default();
        let source = "a\nb\nc\nd\n";
        let mut scanner = Scanner::new(source, &table).with_budget(2);
        let mut pos = 0;
        assert!(!scanner.forward(&mut pos).is_eob());
        assert!(!scanner.forward(&mut pos).is_eob());
        assert!(scanner.forward(&mut pos).is_eob());
        assert!(scanner.exhausted());
    }
}
