//! Highlighter: compiled keyword trees plus comments and strings.

use super::compiler::{lines_in, CompileError, CompiledMatcher};
use super::{HighlightClass, HighlightSpan, KeywordTree};
use crate::bloc::classification::{CharClass, SyntaxOptions, SyntaxTable};
use crate::bloc::lexing::lexemes::string_end;
use once_cell::sync::Lazy;
use std::ops::Range;

static DEFAULT_HIGHLIGHTER: Lazy<Highlighter> = Lazy::new(|| {
    Highlighter::new(&default_trees(), &SyntaxOptions::default())
        .expect("default keyword trees compile")
});

/// Highlighter for bloc with the default syntax options.
pub fn default_highlighter() -> &'static Highlighter {
    &DEFAULT_HIGHLIGHTER
}

/// Keyword trees of the bloc language.
pub fn default_trees() -> Vec<KeywordTree> {
    let operations =
        KeywordTree::new(HighlightClass::Function).keywords(&["fill", "stroke", "add"]);
    let shapes = KeywordTree::new(HighlightClass::Type)
        .nested("box", operations)
        .keywords(&["clip", "path", "group"]);
    let statements = KeywordTree::new(HighlightClass::Keyword)
        .nested("begin", shapes)
        .nested(
            "end",
            KeywordTree::new(HighlightClass::Keyword).keywords(&["if", "sub"]),
        )
        .nested("else", KeywordTree::new(HighlightClass::Keyword).keyword("if"))
        .keywords(&[
            "if", "for", "next", "while", "until", "sub", "gsave", "grestore", "call", "return",
        ]);
    let operators = KeywordTree::anywhere(HighlightClass::Keyword)
        .keywords(&["then", "to", "step", "and", "or", "not"]);
    let constants = KeywordTree::anywhere(HighlightClass::Constant).keywords(&["true", "false"]);
    let builtins = KeywordTree::anywhere(HighlightClass::Builtin).keywords(&["print", "input"]);
    vec![statements, operators, constants, builtins]
}

/// Runs several compiled keyword trees over a buffer, next to a comment and string pass.
#[derive(Debug, Clone)]
pub struct Highlighter {
    table: SyntaxTable,
    matchers: Vec<CompiledMatcher>,
}

impl Highlighter {
    pub fn new(trees: &[KeywordTree], syntax: &SyntaxOptions) -> Result<Self, CompileError> {
        let matchers = trees
            .iter()
            .map(|tree| CompiledMatcher::compile(tree, syntax.case_insensitive))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            table: SyntaxTable::new(syntax),
            matchers,
        })
    }

    /// Spans overlapping `range`, clipped to it and sorted by position.
    pub fn highlight(&self, buffer: &str, range: Range<usize>) -> Vec<HighlightSpan> {
        let mut syntactic = Vec::new();
        let mut keywords = Vec::new();
        for (offset, line) in lines_in(buffer, range.clone()) {
            self.syntactic_line(buffer, offset..offset + line.len(), &mut syntactic);
            for matcher in &self.matchers {
                matcher.highlight_line(line, offset, &mut keywords);
            }
        }
        keywords.retain(|keyword| {
            !syntactic
                .iter()
                .any(|span| overlaps(&span.range, &keyword.range))
        });

        let mut spans: Vec<HighlightSpan> = syntactic
            .into_iter()
            .chain(keywords)
            .filter(|span| overlaps(&span.range, &range))
            .map(|span| {
                HighlightSpan::new(
                    span.range.start.max(range.start)..span.range.end.min(range.end),
                    span.class,
                )
            })
            .collect();
        spans.sort_by_key(|span| (span.range.start, span.range.end));
        spans
    }

    fn syntactic_line(&self, buffer: &str, line: Range<usize>, spans: &mut Vec<HighlightSpan>) {
        let mut pos = line.start;
        while pos < line.end {
            match self.table.class_at(buffer, pos) {
                CharClass::CommentStart => {
                    spans.push(HighlightSpan::new(pos..line.end, HighlightClass::Comment));
                    return;
                }
                CharClass::StringQuote => {
                    let end = string_end(buffer, pos).min(line.end);
                    spans.push(HighlightSpan::new(pos..end, HighlightClass::String));
                    pos = end;
                }
                _ => pos += buffer[pos..].chars().next().map_or(1, char::len_utf8),
            }
        }
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
