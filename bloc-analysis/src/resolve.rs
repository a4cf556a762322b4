use crate::diagnostic::{Diagnostic, DiagnosticRecord};
use std::ops::Range;
use tracing::debug;

/// Place a record in `buffer`. `None` when its line does not exist.
pub fn resolve(buffer: &str, record: &DiagnosticRecord) -> Option<Diagnostic> {
    if record.line == 0 {
        debug!(file = %record.file, "linter record on line 0");
        return None;
    }
    let mut offset = 0;
    let mut found = None;
    for (index, line) in buffer.split_inclusive('\n').enumerate() {
        if index + 1 == record.line {
            found = Some((offset, line.trim_end_matches(['\n', '\r'])));
            break;
        }
        offset += line.len();
    }
    let Some((start, line)) = found else {
        debug!(
            file = %record.file,
            line = record.line,
            "linter record past the end of the buffer"
        );
        return None;
    };
    let local = record
        .excerpt
        .as_deref()
        .filter(|excerpt| !excerpt.is_empty())
        .and_then(|excerpt| line.find(excerpt).map(|at| at..at + excerpt.len()))
        .unwrap_or_else(|| first_word(line));
    Some(Diagnostic {
        range: start + local.start..start + local.end,
        line: record.line,
        severity: record.severity,
        message: record.message.clone(),
    })
}

/// Resolve every record, dropping the ones that do not land in the buffer.
pub fn resolve_all(buffer: &str, records: &[DiagnosticRecord]) -> Vec<Diagnostic> {
    records
        .iter()
        .filter_map(|record| resolve(buffer, record))
        .collect()
}

fn first_word(line: &str) -> Range<usize> {
    let Some(start) = line.find(|c: char| !c.is_whitespace()) else {
        let end = line.len();
        return end..end;
    };
    let end = line[start..]
        .find(char::is_whitespace)
        .map_or(line.len(), |len| start + len);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use rstest::rstest;

    fn record(line: usize, excerpt: Option<&str>) -> DiagnosticRecord {
        DiagnosticRecord {
            file: "-".to_string(),
            line,
            excerpt: excerpt.map(str::to_string),
            severity: Severity::Error,
            message: "bad".to_string(),
        }
    }

    const BUFFER: &str = "sub main\n\n  call foo(1)\nend sub\n";

    #[rstest]
    #[case::excerpt_on_its_line(3, Some("foo"), "foo")]
    #[case::excerpt_elsewhere(3, Some("bar"), "call")]
    #[case::no_excerpt(4, None, "end")]
    #[case::indented_line(3, None, "call")]
    fn range_on_the_reported_line(
        #[case] line: usize,
        #[case] excerpt: Option<&str>,
        #[case] expected: &str,
    ) {
        let diagnostic = resolve(BUFFER, &record(line, excerpt)).unwrap();
        assert_eq!(&BUFFER[diagnostic.range.clone()], expected);
        assert_eq!(diagnostic.line, line);
    }

    #[test]
    fn blank_line_gives_an_empty_range() {
        let diagnostic = resolve(BUFFER, &record(2, None)).unwrap();
        assert_eq!(diagnostic.range, 9..9);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(9)]
    fn lines_outside_the_buffer(#[case] line: usize) {
        assert_eq!(resolve(BUFFER, &record(line, None)), None);
    }

    #[test]
    fn resolve_all_skips_unplaced_records() {
        let all = resolve_all(BUFFER, &[record(1, None), record(9, None), record(3, None)]);
        let lines: Vec<_> = all.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }
}
