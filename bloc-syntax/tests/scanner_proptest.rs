//! Property-based tests for the bidirectional scanner
//!
//! Buffers are assembled from bloc statement fragments, so that ambiguous keywords (`if`,
//! `else`, `end`, `next`) show up in every shape, mixed with comments and strings.

use bloc_syntax::{tokenize, Engine, Scanner, SyntaxTable};
use proptest::prelude::*;

fn statement_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("if x then"),
        Just("if x then print 1"),
        Just("if a==0 then b = 1 # then"),
        Just("else"),
        Just("else if y then z"),
        Just("end if"),
        Just("end"),
        Just("begin box"),
        Just("end box"),
        Just("for i = 1 to 3 step 1"),
        Just("next i"),
        Just("next"),
        Just("while x > 0; x = x - 1"),
        Just("until done"),
        Just("sub main"),
        Just("end sub"),
        Just("gsave"),
        Just("grestore"),
        Just("print \"a\"\"b\""),
        Just("print 'to'"),
        Just("# only a comment"),
        Just(""),
        Just("    indented = 1"),
    ]
}

fn buffer_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(statement_strategy(), 0..14).prop_map(|lines| lines.join("\n"))
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn forward_then_backward_returns_the_same_token(source in buffer_strategy()) {
            let table = SyntaxTable::default();
            let mut scanner = Scanner::new(&source, &table);
            for token in tokenize(&source, &table) {
                let mut pos = token.position();
                let forward = scanner.forward(&mut pos);
                prop_assert_eq!(&forward, &token);
                let backward = scanner.backward(&mut pos);
                prop_assert_eq!(&backward, &token);
                prop_assert_eq!(pos, token.position());
            }
        }

        #[test]
        fn backward_walk_reproduces_the_tokenization(source in buffer_strategy()) {
            let table = SyntaxTable::default();
            let mut scanner = Scanner::new(&source, &table);
            let mut pos = source.len();
            let mut walked = Vec::new();
            loop {
                let token = scanner.backward(&mut pos);
                if token.is_eob() {
                    break;
                }
                walked.push(token);
            }
            walked.reverse();
            prop_assert_eq!(walked, tokenize(&source, &table));
        }

        #[test]
        fn tokens_never_span_a_line_break(source in buffer_strategy()) {
            for token in tokenize(&source, &SyntaxTable::default()) {
                let text = token.text(&source);
                prop_assert!(text == "\n" || !text.contains('\n'), "{} spans lines", token);
            }
        }

        #[test]
        fn reindent_is_idempotent(source in buffer_strategy()) {
            let engine = Engine::default();
            let once = engine.reindent(&source);
            prop_assert_eq!(engine.reindent(&once), once.clone());
        }

        #[test]
        fn queries_accept_any_position(source in "[a-z ;\n\"'#=é×«]{0,60}") {
            let engine = Engine::default();
            let boundaries = source.char_indices().map(|(i, _)| i).chain([source.len()]);
            for position in boundaries {
                let _ = engine.matching_boundary(&source, position);
                let _ = engine.context_at(&source, position);
                let _ = engine.closing_text(&source, position);
                let _ = engine.indent_of(&source, position);
            }
        }
    }
}
