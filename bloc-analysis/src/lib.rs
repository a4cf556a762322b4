//! # bloc-analysis
//!
//! Runs the external bloc linter and maps what it reports onto buffer ranges.
//!
//! Report Format
//!
//!     The linter writes one record per problem:
//!
//!         script.bloc:3: near "foo"
//!             call foo(1)
//!                  ^
//!         error: unknown sub foo
//!
//!     A header with the file and the 1-based line, optionally the quoted excerpt
//!     (quotes inside it doubled), any number of context lines, then `KIND: MESSAGE`.
//!     Without a quoted excerpt, the first context line that is not a caret marker is the
//!     excerpt. See [report].
//!
//! Resolution
//!
//!     A record becomes a [`Diagnostic`] by finding its line and the excerpt on it. When the
//!     excerpt is not there verbatim, the first non-blank run of the line is used instead.
//!     Records pointing past the end of the buffer are dropped. See [resolve].
//!
//! Sessions
//!
//!     A [`CheckSession`] belongs to one buffer. Starting a check kills the one still
//!     running, and only the outcome of the latest check is ever accepted. See [session].

pub mod diagnostic;
pub mod report;
pub mod resolve;
pub mod session;

pub use diagnostic::{Diagnostic, DiagnosticRecord, Severity};
pub use report::parse_report;
pub use resolve::{resolve, resolve_all};
pub use session::{CheckError, CheckOutcome, CheckSession, CheckerOptions, PendingCheck};
