//! Linter report parser.

use crate::diagnostic::{DiagnosticRecord, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// `FILE:LINE:` with an optional `near "EXCERPT"`.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<file>[^:\s][^:]*):(?P<line>\d+):\s*(?:near\s+"(?P<excerpt>(?:[^"]|"")*)")?\s*$"#)
        .unwrap()
});

/// `KIND: MESSAGE`.
static RESULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<kind>error|warning|note):\s*(?P<message>.*?)\s*$").unwrap());

/// A caret marker line such as `    ^~~~`.
static CARET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[\^~]+\s*$").unwrap());

#[derive(Debug)]
struct OpenRecord {
    file: String,
    line: usize,
    excerpt: Option<String>,
    context: Vec<String>,
}

impl OpenRecord {
    fn finish(self, severity: Severity, message: &str) -> DiagnosticRecord {
        let excerpt = self.excerpt.or_else(|| {
            self.context
                .iter()
                .find(|line| !CARET.is_match(line) && !line.trim().is_empty())
                .map(|line| line.trim().to_string())
        });
        DiagnosticRecord {
            file: self.file,
            line: self.line,
            excerpt,
            severity,
            message: message.to_string(),
        }
    }
}

/// Parse a whole report. Records that do not follow the format are dropped with a warning.
pub fn parse_report(report: &str) -> Vec<DiagnosticRecord> {
    let mut records = Vec::new();
    let mut open: Option<OpenRecord> = None;
    for (index, line) in report.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if let Some(header) = HEADER.captures(line) {
            if let Some(dropped) = open.take() {
                warn!(
                    file = %dropped.file,
                    line = dropped.line,
                    "dropping linter record without a result line"
                );
            }
            let Ok(number) = header["line"].parse::<usize>() else {
                warn!(report_line = index + 1, "dropping linter record with a bad line number");
                continue;
            };
            open = Some(OpenRecord {
                file: header["file"].to_string(),
                line: number,
                excerpt: header
                    .name("excerpt")
                    .map(|excerpt| excerpt.as_str().replace("\"\"", "\"")),
                context: Vec::new(),
            });
            continue;
        }
        match open.take() {
            Some(record) => match RESULT.captures(line) {
                Some(result) => {
                    let severity = Severity::parse(&result["kind"]).unwrap_or(Severity::Error);
                    records.push(record.finish(severity, &result["message"]));
                }
                None => {
                    let mut record = record;
                    record.context.push(line.to_string());
                    open = Some(record);
                }
            },
            None if line.trim().is_empty() => {}
            None => warn!(report_line = index + 1, text = line, "ignoring unparseable linter output"),
        }
    }
    if let Some(dropped) = open {
        warn!(
            file = %dropped.file,
            line = dropped.line,
            "dropping linter record without a result line"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn header_with_excerpt() {
        let report = "script.bloc:3: near \"foo\"\n    call foo(1)\n         ^\nerror: unknown sub foo\n";
        assert_eq!(
            parse_report(report),
            vec![DiagnosticRecord {
                file: "script.bloc".to_string(),
                line: 3,
                excerpt: Some("foo".to_string()),
                severity: Severity::Error,
                message: "unknown sub foo".to_string(),
            }]
        );
    }

    #[rstest]
    #[case("error", Severity::Error)]
    #[case("warning", Severity::Warning)]
    #[case("note", Severity::Note)]
    fn result_line_sets_the_severity(#[case] kind: &str, #[case] severity: Severity) {
        let report = format!("f:2:\n{kind}: something\n");
        let records = parse_report(&report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, severity);
        assert_eq!(records[0].message, "something");
    }

    #[rstest]
    #[case("f:1:\nfatal: nope\n")]
    #[case("f:x:\nerror: nope\n")]
    #[case("error: nope\n")]
    fn malformed_reports_yield_nothing(#[case] report: &str) {
        assert!(parse_report(report).is_empty());
    }

    #[test]
    fn doubled_quotes_in_excerpt() {
        let report = "-:1: near \"print \"\"hi\"\"\"\nwarning: odd string\n";
        let records = parse_report(report);
        assert_eq!(records[0].excerpt.as_deref(), Some("print \"hi\""));
        assert_eq!(records[0].severity, Severity::Warning);
    }

    #[test]
    fn excerpt_falls_back_to_context_line() {
        let report = "a.bloc:2:\n   ^\n   next j  \nnote: loop variable differs\n";
        let records = parse_report(report);
        assert_eq!(records[0].excerpt.as_deref(), Some("next j"));
        assert_eq!(records[0].severity, Severity::Note);
    }

    #[test]
    fn no_excerpt_at_all() {
        let records = parse_report("a.bloc:7:\nerror: unexpected end of file\n");
        assert_eq!(records[0].excerpt, None);
        assert_eq!(records[0].line, 7);
    }

    #[test]
    fn unparseable_records_are_dropped() {
        let report = "\
garbage before anything
a.bloc:1: near \"x\"
a.bloc:2: near \"y\"
error: second one survives
a.bloc:3:
   trailing context with no result
";
        let records = parse_report(report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].message, "second one survives");
    }

    #[test]
    fn several_records_in_a_row() {
        let report = "f:1:\nerror: a\nf:4: near \"b\"\n  b\nwarning: b\n";
        let lines: Vec<_> = parse_report(report).iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 4]);
    }
}
