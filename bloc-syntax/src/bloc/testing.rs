//! Testing utilities
//!
//!     Structural queries are about a position in a buffer, so most tests need both. Writing
//!     offsets by hand is error prone; instead tests mark the point of interest with a `|`
//!     in the source and let [marked] find and remove it.
//!
//!     ```rust,ignore
//!     let (source, cursor) = marked("while x\n  |\n");
//!     assert_eq!(closing_text(&source, cursor).unwrap(), "next");
//!     ```
//!
//!     Larger programs live in [samples]. They are well-formed bloc, each exercising one
//!     construct family, and come with their expected indentation so reindent tests can
//!     start from a flattened copy.

/// Remove the single `|` cursor marker from `text` and return its offset.
///
/// Panics when there is no marker or more than one.
pub fn marked(text: &str) -> (String, usize) {
    let cursor = text.find('|').expect("source has no `|` cursor marker");
    assert!(
        text[cursor + 1..].find('|').is_none(),
        "source has more than one `|` cursor marker"
    );
    let mut source = String::with_capacity(text.len() - 1);
    source.push_str(&text[..cursor]);
    source.push_str(&text[cursor + 1..]);
    (source, cursor)
}

/// Strip all leading whitespace, as if every line was typed flush left.
pub fn flatten(source: &str) -> String {
    source
        .split_inclusive('\n')
        .map(|line| line.trim_start_matches([' ', '\t']))
        .collect()
}

/// Well-formed bloc programs, indented with four spaces per level.
pub mod samples {
    pub const DRAWING: &str = "\
# a framed box
begin frame
    gsave
        box 0 0 10 10
        stroke
    grestore
end frame
";

    pub const LOOPS: &str = "\
for i = 1 to 10 step 2
    n = i * 2
    while n > 0
        n = n - 1
    next
next i
until done
    done = poll()
next
";

    pub const CONDITIONS: &str = "\
sub check x
    if x > 0 then
        print \"positive\"
    else
        print \"not positive\"
    end if
    if x == 0 then print \"zero\"
    else if x == 1 then print \"one\"
    else print \"many\"
    print x
end sub
";

    pub const ALL: [&str; 3] = [DRAWING, LOOPS, CONDITIONS];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_removed() {
        assert_eq!(marked("ab|c"), ("abc".to_string(), 2));
    }

    #[test]
    #[should_panic(expected = "more than one")]
    fn two_markers_panic() {
        marked("a|b|c");
    }

    #[test]
    fn flatten_keeps_line_breaks() {
        assert_eq!(flatten("a\n  b\n\tc"), "a\nb\nc");
    }
}
