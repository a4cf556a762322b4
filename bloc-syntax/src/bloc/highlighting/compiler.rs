//! Keyword-tree compiler.
//!
//! Each tree level becomes one regex: an alternation with one named group per literal,
//! longest literal first, so that a literal never loses to a shorter one it starts with.
//! The index of the group that took part in a match is the index of the alternative, which
//! carries the class to assign and the compiled level to continue with.
//!
//!     begin -> ( box -> (fill | add) | clip )
//!
//!     level 0   ^[ \t]*(?:(?P<k0>\bbegin\b))
//!     level 1   ^[ \t]*(?:(?P<k0>\bclip\b)|(?P<k1>\bbox\b))
//!     level 2   ^[ \t]*(?:(?P<k0>\bfill\b)|(?P<k1>\badd\b))

use super::{HighlightClass, HighlightSpan, KeywordTree};
use regex::Regex;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("keyword `{keyword}` appears twice on one level")]
    DuplicateKeyword { keyword: String },
    #[error("empty keyword literal")]
    EmptyKeyword,
    #[error("invalid keyword pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// First non-blank column of the line.
    LineStart,
    /// Right after the previous match, blanks skipped.
    Cursor,
    /// Anywhere after the previous match, repeatedly.
    Free,
}

#[derive(Debug, Clone)]
struct Alternative {
    literal: String,
    class: HighlightClass,
    next: Option<Box<CompiledMatcher>>,
}

/// A keyword tree compiled into one alternation regex per level.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    regex: Regex,
    anchor: Anchor,
    alternatives: Vec<Alternative>,
}

impl CompiledMatcher {
    pub fn compile(tree: &KeywordTree, case_insensitive: bool) -> Result<Self, CompileError> {
        let anchor = if tree.any {
            Anchor::Free
        } else {
            Anchor::LineStart
        };
        Self::level(tree, case_insensitive, anchor)
    }

    fn level(
        tree: &KeywordTree,
        case_insensitive: bool,
        anchor: Anchor,
    ) -> Result<Self, CompileError> {
        let mut seen = HashSet::new();
        let mut alternatives = Vec::with_capacity(tree.children.len());
        for (literal, next) in &tree.children {
            if literal.is_empty() {
                return Err(CompileError::EmptyKeyword);
            }
            let key = if case_insensitive {
                literal.to_lowercase()
            } else {
                literal.clone()
            };
            if !seen.insert(key) {
                return Err(CompileError::DuplicateKeyword {
                    keyword: literal.clone(),
                });
            }
            let next = match next {
                Some(child) => {
                    let anchor = if child.any {
                        Anchor::Free
                    } else {
                        Anchor::Cursor
                    };
                    Some(Box::new(Self::level(child, case_insensitive, anchor)?))
                }
                None => None,
            };
            alternatives.push(Alternative {
                literal: literal.clone(),
                class: tree.class,
                next,
            });
        }
        alternatives.sort_by_key(|alternative| Reverse(alternative.literal.len()));

        let groups: Vec<String> = alternatives
            .iter()
            .enumerate()
            .map(|(i, alternative)| format!("(?P<k{i}>{})", bounded(&alternative.literal)))
            .collect();
        let flags = if case_insensitive { "(?i)" } else { "" };
        let prefix = match anchor {
            Anchor::LineStart | Anchor::Cursor => r"^[ \t]*",
            Anchor::Free => "",
        };
        let regex = Regex::new(&format!("{flags}{prefix}(?:{})", groups.join("|")))?;
        Ok(Self {
            regex,
            anchor,
            alternatives,
        })
    }

    /// The alternation of this level.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Highlight every line overlapping `range`. Spans outside `range` are dropped.
    pub fn highlight(&self, buffer: &str, range: Range<usize>) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        for (offset, line) in lines_in(buffer, range.clone()) {
            self.highlight_line(line, offset, &mut spans);
        }
        spans.retain(|span| span.range.start >= range.start && span.range.end <= range.end);
        spans
    }

    /// Highlight one line (without its break) that starts at `offset` in the buffer.
    pub fn highlight_line(&self, line: &str, offset: usize, spans: &mut Vec<HighlightSpan>) {
        self.run(line, offset, 0, spans);
    }

    fn run(&self, line: &str, offset: usize, from: usize, spans: &mut Vec<HighlightSpan>) -> usize {
        let mut cursor = from;
        while let Some((range, alternative)) = self.find(line, cursor) {
            spans.push(HighlightSpan::new(
                offset + range.start..offset + range.end,
                alternative.class,
            ));
            cursor = range.end;
            if let Some(next) = &alternative.next {
                cursor = next.run(line, offset, cursor, spans);
            }
            if self.anchor != Anchor::Free {
                break;
            }
        }
        cursor
    }

    fn find(&self, line: &str, from: usize) -> Option<(Range<usize>, &Alternative)> {
        if self.alternatives.is_empty() || from > line.len() {
            return None;
        }
        let (captures, shift) = match self.anchor {
            Anchor::Free => (self.regex.captures_at(line, from)?, 0),
            Anchor::LineStart | Anchor::Cursor => (self.regex.captures(&line[from..])?, from),
        };
        let index = captures.iter().skip(1).position(|group| group.is_some())?;
        let group = captures.get(index + 1)?;
        let alternative = self.alternatives.get(index)?;
        Some((shift + group.start()..shift + group.end(), alternative))
    }
}

/// Escape `literal`, with word boundaries on the sides where it starts or ends a word.
fn bounded(literal: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let mut pattern = String::new();
    if is_word(literal.chars().next()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(literal));
    if is_word(literal.chars().next_back()) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Lines overlapping `range`, with their start offsets, line breaks stripped. The range
/// may cut through a character.
pub(crate) fn lines_in(buffer: &str, range: Range<usize>) -> Vec<(usize, &str)> {
    let end = range.end.min(buffer.len());
    let mut start = range.start.min(end);
    while !buffer.is_char_boundary(start) {
        start -= 1;
    }
    let mut pos = buffer[..start]
        .rfind('\n')
        .map_or(0, |i| i + 1);
    let mut lines = Vec::new();
    loop {
        let line_end = buffer[pos..].find('\n').map_or(buffer.len(), |i| pos + i);
        lines.push((pos, buffer[pos..line_end].trim_end_matches('\r')));
        if line_end >= end {
            return lines;
        }
        pos = line_end + 1;
    }
}
