//! Structural behaviour of the grammar engine on whole programs.

use bloc_syntax::bloc::grammar::{Role, BLOCK_TABLE};
use bloc_syntax::bloc::testing::{marked, samples};
use bloc_syntax::{
    closing_text, context_at, default_highlighter, matching_boundary, tokenize, CloseError,
    CompiledMatcher, HighlightClass, KeywordTree, SyntaxTable, TokenKind,
};
use rstest::rstest;

fn kind_at(source: &str, position: usize) -> TokenKind {
    bloc_syntax::classify(source, position, &SyntaxTable::default()).kind
}

#[rstest]
#[case("if x then print 1")]
#[case("if a==0 then b = 2")]
#[case("if x then print \"then\"")]
#[case("IF ready THEN go")]
fn single_line_if_expects_no_end(#[case] source: &str) {
    assert_eq!(kind_at(source, 0), TokenKind::IfLine);
    assert_eq!(matching_boundary(source, 0), None);
}

#[rstest]
#[case("if x then\n  print 1\nend if\n")]
#[case("if x then # check x\n  print 1\nend if")]
#[case("if x then\nend")]
#[case("if x then\n  if y then print 2\nend if\n")]
fn block_if_and_its_end_point_at_each_other(#[case] source: &str) {
    let end = source.rfind("end").unwrap();
    assert_eq!(kind_at(source, 0), TokenKind::IfBlock);
    assert_eq!(matching_boundary(source, 0), Some(end));
    assert_eq!(matching_boundary(source, end), Some(0));
}

#[test]
fn for_loop_nesting() {
    let (source, cursor) = marked("for i = 1 to 10\n  while j\n  next\n  |\nnext i\n");
    let next_i = source.find("next i").unwrap();
    assert_eq!(matching_boundary(&source, 0), Some(next_i));
    assert_eq!(closing_text(&source, cursor).unwrap(), "next i");
}

#[test]
fn else_chain_stays_flat() {
    let source = "if a==0 then print 0\nelse if a==1 then print 1\nelse print 2\n";
    let tokens = tokenize(source, &SyntaxTable::default());
    assert!(tokens.iter().all(|t| t.kind != TokenKind::IfBlock));
    let prints: Vec<_> = tokens
        .iter()
        .filter(|t| t.text(source) == "print")
        .map(|t| t.kind)
        .collect();
    assert_eq!(prints, vec![TokenKind::Exp; 3]);
    assert_eq!(
        closing_text(source, source.len()),
        Err(CloseError::NoEnclosingConstruct)
    );
    assert!(context_at(source, source.len()).is_empty());
}

#[test]
fn every_sample_construct_matches_both_ways() {
    for source in samples::ALL {
        let tokens = tokenize(source, &SyntaxTable::default());
        let openers = tokens
            .iter()
            .filter(|t| BLOCK_TABLE.role(t.kind) == Role::Opener);
        for opener in openers {
            let closer = matching_boundary(source, opener.position())
                .unwrap_or_else(|| panic!("{opener} in sample has no closer"));
            assert_eq!(
                matching_boundary(source, closer),
                Some(opener.position()),
                "{opener}"
            );
        }
    }
}

#[test]
fn context_inside_nested_loops() {
    let (source, cursor) = marked(
        "for i = 1 to 3\n  until done\n    gsave\n      |\n    grestore\n  next\nnext i\n",
    );
    let kinds: Vec<_> = context_at(&source, cursor)
        .constructs
        .into_iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(kinds, vec![TokenKind::For, TokenKind::Until, TokenKind::Gsave]);
}

#[test]
fn keyword_tree_continuations() {
    let tree = KeywordTree::new(HighlightClass::Keyword).nested(
        "begin",
        KeywordTree::new(HighlightClass::Keyword)
            .nested(
                "box",
                KeywordTree::new(HighlightClass::Keyword).keywords(&["fill", "add"]),
            )
            .keyword("clip"),
    );
    let matcher = CompiledMatcher::compile(&tree, false).unwrap();

    let text = "begin box fill";
    let words: Vec<_> = matcher
        .highlight(text, 0..text.len())
        .into_iter()
        .map(|span| &text[span.range])
        .collect();
    assert_eq!(words, vec!["begin", "box", "fill"]);

    let text = "begin circle";
    let spans = matcher.highlight(text, 0..text.len());
    assert_eq!(spans.len(), 1);
    assert_eq!(&text[spans[0].range.clone()], "begin");
}

#[test]
fn default_highlighter_covers_a_sample() {
    let source = samples::DRAWING;
    let spans = default_highlighter().highlight(source, 0..source.len());
    assert_eq!(spans[0].class, HighlightClass::Comment);
    let words: Vec<_> = spans[1..].iter().map(|s| &source[s.range.clone()]).collect();
    assert_eq!(words, vec!["begin", "gsave", "grestore", "end"]);
}
