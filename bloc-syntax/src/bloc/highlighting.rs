//! Highlighting
//!
//!     Highlighting is a one-pass, regex driven classification of keywords. It does not
//!     consult the tokenizer or the grammar engine: it is fast and approximate, and a line
//!     that confuses the engine still gets colored.
//!
//!     Keywords are authored as a [`KeywordTree`]: each node lists literals that get the
//!     node's class, and a literal may carry a subtree for the words that may follow it
//!     (`begin` then a shape, the shape then an operation). The [compiler](compiler) turns
//!     each tree level into one alternation regex with a capture group per literal, so a
//!     single match tells which literal was hit and where to continue.
//!
//! Anchoring
//!
//!     The top level of a tree matches once per line, at the first non-blank column. Nested
//!     levels continue right after the previous match. A tree in "any" mode matches
//!     anywhere on the line, as many times as it can.
//!
//! Comments and Strings
//!
//!     The [`Highlighter`] adds comment and string spans from the syntax table and drops
//!     keyword matches that fall inside them.

pub mod compiler;
pub mod highlighter;
pub mod keyword_tree;

pub use compiler::{CompileError, CompiledMatcher};
pub use highlighter::{default_highlighter, default_trees, Highlighter};
pub use keyword_tree::KeywordTree;

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// How a highlighted span should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightClass {
    Keyword,
    Builtin,
    Type,
    Function,
    Variable,
    Constant,
    Comment,
    String,
}

impl HighlightClass {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightClass::Keyword => "keyword",
            HighlightClass::Builtin => "builtin",
            HighlightClass::Type => "type",
            HighlightClass::Function => "function",
            HighlightClass::Variable => "variable",
            HighlightClass::Constant => "constant",
            HighlightClass::Comment => "comment",
            HighlightClass::String => "string",
        }
    }
}

impl fmt::Display for HighlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub class: HighlightClass,
}

impl HighlightSpan {
    pub fn new(range: Range<usize>, class: HighlightClass) -> Self {
        Self { range, class }
    }
}
