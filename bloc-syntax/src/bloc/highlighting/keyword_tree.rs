//! Keyword trees: authored keyword classification data.

use super::HighlightClass;

/// One level of keywords sharing a highlight class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTree {
    pub class: HighlightClass,
    /// Match anywhere on the line, repeatedly, instead of at the line start.
    pub any: bool,
    /// Literals in authoring order, each with the words that may follow it.
    pub children: Vec<(String, Option<KeywordTree>)>,
}

impl KeywordTree {
    pub fn new(class: HighlightClass) -> Self {
        Self {
            class,
            any: false,
            children: Vec::new(),
        }
    }

    /// A tree whose keywords may appear anywhere on a line.
    pub fn anywhere(class: HighlightClass) -> Self {
        Self {
            any: true,
            ..Self::new(class)
        }
    }

    pub fn keyword(mut self, literal: &str) -> Self {
        self.children.push((literal.to_string(), None));
        self
    }

    pub fn keywords(self, literals: &[&str]) -> Self {
        literals
            .iter()
            .fold(self, |tree, literal| tree.keyword(literal))
    }

    /// Add `literal`, followed by the keywords of `next`.
    pub fn nested(mut self, literal: &str, next: KeywordTree) -> Self {
        self.children.push((literal.to_string(), Some(next)));
        self
    }

    /// Total number of literals, nested ones included.
    pub fn len(&self) -> usize {
        self.children
            .iter()
            .map(|(_, next)| 1 + next.as_ref().map_or(0, KeywordTree::len))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
