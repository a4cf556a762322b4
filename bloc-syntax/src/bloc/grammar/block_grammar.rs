//! The bloc block grammar, as data.
//!
//! Expressions are operands and never appear here: an `exp` between two keywords is
//! absorbed by the neighbouring `inst`. The `;` that ends a `for`/`while`/`until` header is
//! the `inst ";" inst` separator of the body, so those headers need no separator terminal.

use crate::bloc::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Inst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    T(TokenKind),
    N(NonTerminal),
    /// Optional group, `[ ... ]`.
    Opt(&'static [Item]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: &'static [Item],
}

/// How a terminal relates to itself when it is both yielded to and taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    /// Associative both ways; resolved as left.
    Assoc,
}

#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    pub productions: &'static [Production],
    pub associativity: &'static [(TokenKind, Assoc)],
}

use Item::{Opt, N, T};
use NonTerminal::Inst;
use TokenKind::*;

pub const BLOCK_GRAMMAR: Grammar = Grammar {
    productions: &[
        // inst ; inst
        Production {
            lhs: Inst,
            rhs: &[N(Inst), T(Separator), N(Inst)],
        },
        // begin NAME inst end NAME
        Production {
            lhs: Inst,
            rhs: &[T(Begin), N(Inst), T(EndThing)],
        },
        // if ... then inst [else inst] end if
        Production {
            lhs: Inst,
            rhs: &[T(IfBlock), N(Inst), Opt(&[T(ElseBloc), N(Inst)]), T(EndThing)],
        },
        Production {
            lhs: Inst,
            rhs: &[T(IfBlock), N(Inst), Opt(&[T(ElseBloc), N(Inst)]), T(End)],
        },
        // sub NAME inst end sub
        Production {
            lhs: Inst,
            rhs: &[T(Sub), N(Inst), T(EndThing)],
        },
        Production {
            lhs: Inst,
            rhs: &[T(Sub), N(Inst), T(End)],
        },
        // for VAR = exp to exp [step exp] ; inst next VAR
        Production {
            lhs: Inst,
            rhs: &[
                T(For),
                T(Assign),
                N(Inst),
                T(To),
                N(Inst),
                Opt(&[T(Step), N(Inst)]),
                T(NextVar),
            ],
        },
        // while exp ; inst next
        Production {
            lhs: Inst,
            rhs: &[T(While), N(Inst), T(Next)],
        },
        Production {
            lhs: Inst,
            rhs: &[T(Until), N(Inst), T(Next)],
        },
        // gsave inst grestore
        Production {
            lhs: Inst,
            rhs: &[T(Gsave), N(Inst), T(Grestore)],
        },
    ],
    associativity: &[(Separator, Assoc::Assoc)],
};

/// Plain symbol of an expanded right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    T(TokenKind),
    N(NonTerminal),
}

impl Production {
    /// Every right-hand side obtained by taking or dropping each optional group.
    pub fn expand(&self) -> Vec<Vec<Symbol>> {
        expand_items(self.rhs)
    }
}

fn expand_items(items: &[Item]) -> Vec<Vec<Symbol>> {
    let mut alternatives = vec![Vec::new()];
    for item in items {
        alternatives = match item {
            Item::T(kind) => push_all(alternatives, &[Symbol::T(*kind)]),
            Item::N(nt) => push_all(alternatives, &[Symbol::N(*nt)]),
            Item::Opt(group) => {
                let mut taken = Vec::new();
                for tail in expand_items(group) {
                    taken.extend(push_all(alternatives.clone(), &tail));
                }
                alternatives.extend(taken);
                alternatives
            }
        };
    }
    alternatives
}

fn push_all(mut alternatives: Vec<Vec<Symbol>>, tail: &[Symbol]) -> Vec<Vec<Symbol>> {
    for alternative in &mut alternatives {
        alternative.extend_from_slice(tail);
    }
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_groups_double_the_alternatives() {
        let for_loop = BLOCK_GRAMMAR
            .productions
            .iter()
            .find(|p| p.rhs.first() == Some(&Item::T(For)))
            .unwrap();
        let expanded = for_loop.expand();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].len(), 6);
        assert_eq!(expanded[1].len(), 8);
        assert_eq!(expanded[1][5], Symbol::T(Step));
    }
}
