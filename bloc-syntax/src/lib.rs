//! # bloc-syntax
//!
//! Structural editing support for the bloc scripting language.
//!
//! File Layout
//!
//!     The crate is split the same way the queries flow: characters are classified, the
//!     classified text is tokenized on demand, and the grammar engine answers structural
//!     questions from the token stream. Highlighting is a separate, regex driven pass that
//!     never consults the grammar.
//!
//!     src/bloc
//!       ├── classification   Character classes and the syntax table
//!       ├── token            Token kinds and tokens
//!       ├── lexing           Line lexer, keyword disambiguation, bidirectional scanner
//!       ├── grammar          Precedence table, matching, indentation, closing, bloc names
//!       ├── highlighting     Keyword-tree compiler and highlighter
//!       └── testing          Cursor-marked buffers for tests
//!
//! Nothing here keeps state between calls apart from the immutable precedence table, the
//! default engine and the default highlighter, all built lazily once per process.

pub mod bloc;

pub use bloc::classification::{CharClass, SyntaxOptions, SyntaxTable};
pub use bloc::grammar::{
    closing_text, context_at, indent_of, indentation, matching_boundary, reindent,
    BoundaryMatch, CloseError, Engine, EngineOptions, GrammarError, Indentation, NameEdit,
    NameMismatch, NameSide, NamedSpan, OpenConstruct, ParseContext,
};
pub use bloc::highlighting::{
    default_highlighter, default_trees, CompileError, CompiledMatcher, HighlightClass,
    HighlightSpan, Highlighter, KeywordTree,
};
pub use bloc::lexing::{classify, tokenize, Scanner};
pub use bloc::token::{Token, TokenKind};
