//! Character Classification
//!
//!     Every character of a buffer falls in one lexical class. The tokenizer only ever asks
//!     this module "what is the class at byte offset P", so swapping the comment marker or
//!     the keyword case rule is a matter of building a different [`SyntaxTable`].
//!
//!     ASCII characters are resolved through a precomputed table. Anything outside ASCII is
//!     a word constituent when alphabetic, whitespace when whitespace, and a symbol
//!     otherwise.
//!
//! Comment Marker
//!
//!     The comment-start marker is configured, not tabled: it may be a single symbol (`#`),
//!     several symbols (`//`), or a word (`rem`). Word-like markers only count on word
//!     boundaries, so `remark` stays a word when the marker is `rem`.

use serde::{Deserialize, Serialize};

/// Lexical class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharClass {
    Word,
    Symbol,
    Whitespace,
    Newline,
    /// `;`, the explicit statement separator.
    Separator,
    StringQuote,
    CommentStart,
}

const CLASS_TABLE: [CharClass; 128] = {
    let mut table = [CharClass::Symbol; 128];
    let mut i = 0;
    while i < 128 {
        let c = i as u8;
        table[i] = match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'.' | b'$' => CharClass::Word,
            b' ' | b'\t' | b'\r' | 0x0b | 0x0c => CharClass::Whitespace,
            b'\n' => CharClass::Newline,
            b';' => CharClass::Separator,
            b'"' | b'\'' => CharClass::StringQuote,
            _ => CharClass::Symbol,
        };
        i += 1;
    }
    table
};

/// Knobs that change how text is classified and keywords are recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxOptions {
    pub comment_start: String,
    pub case_insensitive: bool,
}

impl Default for SyntaxOptions {
    fn default() -> Self {
        Self {
            comment_start: "#".to_string(),
            case_insensitive: true,
        }
    }
}

/// Classifies characters of a buffer.
#[derive(Debug, Clone)]
pub struct SyntaxTable {
    comment_start: String,
    word_marker: bool,
    case_insensitive: bool,
}

impl SyntaxTable {
    pub fn new(options: &SyntaxOptions) -> Self {
        let word_marker = options
            .comment_start
            .chars()
            .last()
            .is_some_and(|c| char_class(c) == CharClass::Word);
        Self {
            comment_start: options.comment_start.clone(),
            word_marker,
            case_insensitive: options.case_insensitive,
        }
    }

    pub fn comment_start(&self) -> &str {
        &self.comment_start
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Class of the character starting at byte offset `pos`.
    ///
    /// `pos` must sit on a char boundary. Offsets at or past the end are reported as
    /// [`CharClass::Newline`], which is what every scan treats as "stop here".
    pub fn class_at(&self, text: &str, pos: usize) -> CharClass {
        let Some(c) = text.get(pos..).and_then(|rest| rest.chars().next()) else {
            return CharClass::Newline;
        };
        if self.comment_starts_at(text, pos) {
            return CharClass::CommentStart;
        }
        char_class(c)
    }

    fn comment_starts_at(&self, text: &str, pos: usize) -> bool {
        if self.comment_start.is_empty() || !text[pos..].starts_with(&self.comment_start) {
            return false;
        }
        if !self.word_marker {
            return true;
        }
        let before = text[..pos].chars().next_back();
        let after = text[pos + self.comment_start.len()..].chars().next();
        let is_word = |c: Option<char>| c.is_some_and(|c| char_class(c) == CharClass::Word);
        !is_word(before) && !is_word(after)
    }

    /// Whether `word` spells `keyword` under the configured case rule.
    pub fn is_keyword(&self, word: &str, keyword: &str) -> bool {
        if self.case_insensitive {
            word.eq_ignore_ascii_case(keyword)
        } else {
            word == keyword
        }
    }
}

impl Default for SyntaxTable {
    fn default() -> Self {
        Self::new(&SyntaxOptions::default())
    }
}

/// Table lookup for a single character, ignoring the comment marker.
pub fn char_class(c: char) -> CharClass {
    if c.is_ascii() {
        CLASS_TABLE[c as usize]
    } else if c.is_alphabetic() {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Whitespace
    } else {
        CharClass::Symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('a', CharClass::Word)]
    #[case('Z', CharClass::Word)]
    #[case('7', CharClass::Word)]
    #[case('_', CharClass::Word)]
    #[case('é', CharClass::Word)]
    #[case(' ', CharClass::Whitespace)]
    #[case('\t', CharClass::Whitespace)]
    #[case('\n', CharClass::Newline)]
    #[case(';', CharClass::Separator)]
    #[case('"', CharClass::StringQuote)]
    #[case('\'', CharClass::StringQuote)]
    #[case('=', CharClass::Symbol)]
    #[case('(', CharClass::Symbol)]
    fn classifies_characters(#[case] c: char, #[case] expected: CharClass) {
        assert_eq!(char_class(c), expected);
    }

    #[test]
    fn symbol_comment_marker() {
        let table = SyntaxTable::default();
        assert_eq!(table.class_at("x # note", 2), CharClass::CommentStart);
        assert_eq!(table.class_at("x # note", 0), CharClass::Word);
    }

    #[test]
    fn multi_char_comment_marker() {
        let table = SyntaxTable::new(&SyntaxOptions {
            comment_start: "//".to_string(),
            ..SyntaxOptions::default()
        });
        assert_eq!(table.class_at("a / b", 2), CharClass::Symbol);
        assert_eq!(table.class_at("a // b", 2), CharClass::CommentStart);
    }

    #[test]
    fn word_comment_marker_needs_boundaries() {
        let table = SyntaxTable::new(&SyntaxOptions {
            comment_start: "rem".to_string(),
            ..SyntaxOptions::default()
        });
        assert_eq!(table.class_at("rem hello", 0), CharClass::CommentStart);
        assert_eq!(table.class_at("remark", 0), CharClass::Word);
        assert_eq!(table.class_at("x = prem", 5), CharClass::Word);
    }

    #[test]
    fn past_the_end_is_a_line_break() {
        let table = SyntaxTable::default();
        assert_eq!(table.class_at("ab", 2), CharClass::Newline);
    }

    #[test]
    fn keyword_case_rule() {
        let table = SyntaxTable::default();
        assert!(table.is_keyword("END", "end"));
        let strict = SyntaxTable::new(&SyntaxOptions {
            case_insensitive: false,
            ..SyntaxOptions::default()
        });
        assert!(!strict.is_keyword("END", "end"));
    }
}
