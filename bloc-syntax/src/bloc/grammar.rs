//! Grammar Engine
//!
//!     Structural questions about a buffer are answered locally: the engine never builds a
//!     tree for the whole document. It walks tokens out of a [`Scanner`](crate::Scanner)
//!     from the point of interest and consults the precedence table compiled from the
//!     block grammar.
//!
//!     See [block_grammar](block_grammar) for the grammar itself, [precedence](precedence)
//!     for how openers, closers and inner keywords are derived from it, and [engine](engine)
//!     for the queries.
//!
//! Matching
//!
//!     Walking backward from a closer, every closer met on the way is stacked as pending.
//!     An opener pops the innermost pending closer that accepts it (stray closers above it
//!     are dropped with it). The opener that pops the starting closer is the match. Openers
//!     that accept nothing are unclosed and skipped. Forward matching from an opener is the
//!     mirror image, with stray closers skipped.
//!
//!     A closer accepts an opener when the precedence table puts them in one construct and
//!     the closer's payload agrees: `end if` only closes an `if`, `end sub` only a `sub`,
//!     any other `end NAME` only a `begin`. `begin a ... end b` still matches; the differing
//!     names are reported separately.
//!
//! Flat Else Chains
//!
//!     `if a then x` followed by `else if b then y` and `else z` on later lines is three
//!     flat statements. An `else-bloc` whose preceding statement starts with a single-line
//!     `if` or `else if` belongs to such a chain: it has no owner and indents like any other
//!     statement.
//!
//! Scan Window
//!
//!     Every query gets one scanner with a token budget. When the budget runs out the query
//!     sees the end of the buffer and answers from what it saw.

pub mod block_grammar;
pub mod engine;
pub mod names;
pub mod precedence;

pub use engine::{
    BoundaryMatch, CloseError, Engine, EngineOptions, Indentation, OpenConstruct, ParseContext,
};
pub use names::{NameEdit, NameMismatch, NameSide, NamedSpan};
pub use precedence::{GrammarError, Prec, PrecedenceTable, Role, BLOCK_TABLE};

use once_cell::sync::Lazy;

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(Engine::default);

/// Position of the token matching the one at `position`, if it has one.
pub fn matching_boundary(buffer: &str, position: usize) -> Option<usize> {
    DEFAULT_ENGINE.matching_boundary(buffer, position)
}

/// Open constructs around `position`, outermost first.
pub fn context_at(buffer: &str, position: usize) -> ParseContext {
    DEFAULT_ENGINE.context_at(buffer, position)
}

pub fn indentation(buffer: &str, line_start: usize) -> Indentation {
    DEFAULT_ENGINE.indentation(buffer, line_start)
}

/// Indentation level, in units, of the line starting at `line_start`.
pub fn indent_of(buffer: &str, line_start: usize) -> usize {
    DEFAULT_ENGINE.indent_of(buffer, line_start)
}

/// Text that closes the innermost construct still open at `position`.
pub fn closing_text(buffer: &str, position: usize) -> Result<String, CloseError> {
    DEFAULT_ENGINE.closing_text(buffer, position)
}

pub fn reindent(buffer: &str) -> String {
    DEFAULT_ENGINE.reindent(buffer)
}
