//! Precedence Table
//!
//!     The block grammar is compiled once into an operator-precedence table: for every
//!     ordered pair of terminals that may meet, whether the left one yields to the right
//!     one (`<`), both belong to the same construct (`=`), or the left one takes
//!     precedence (`>`). The classic construction is used:
//!
//!         a N b   in a right-hand side      a = b
//!         a b     in a right-hand side      a = b
//!         a N                               a < every first operator of N
//!         N b                               every last operator of N > b
//!
//!     The structural roles the engine works with fall out of the `=` relation:
//!
//!         opener   has a right `=` partner only (`begin`, `for`, `if-block`, ...)
//!         closer   has a left `=` partner only (`end-thing`, `next`, `grestore`, ...)
//!         inner    has both (`else-bloc`, `to`, `step`, the header `=`)
//!         neutral  everything else (`;`, expressions, single-line `if`)
//!
//!     A closer closes the openers it can reach through a chain of `=`; an inner keyword
//!     belongs to the openers that reach it the same way.
//!
//! Conflicts
//!
//!     A pair with two different relations is a construction-time error, unless the pair
//!     is a terminal with itself and the grammar declares its associativity.

use super::block_grammar::{Assoc, Grammar, NonTerminal, Symbol, BLOCK_GRAMMAR};
use crate::bloc::token::TokenKind;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Precedence table of the bloc block grammar, built on first use.
pub static BLOCK_TABLE: Lazy<PrecedenceTable> = Lazy::new(|| {
    PrecedenceTable::build(&BLOCK_GRAMMAR).expect("the block grammar has no precedence conflicts")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prec {
    /// `<`
    Yields,
    /// `=`
    Equal,
    /// `>`
    Takes,
}

impl Prec {
    pub fn symbol(self) -> &'static str {
        match self {
            Prec::Yields => "<",
            Prec::Equal => "=",
            Prec::Takes => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Opener,
    Inner,
    Closer,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("precedence conflict between `{left}` and `{right}`: {relations}")]
    Conflict {
        left: TokenKind,
        right: TokenKind,
        relations: String,
    },
}

#[derive(Debug, Clone)]
pub struct PrecedenceTable {
    relations: BTreeMap<(TokenKind, TokenKind), Prec>,
    roles: BTreeMap<TokenKind, Role>,
    /// opener -> closers and inner keywords reachable through `=`
    reach: BTreeMap<TokenKind, BTreeSet<TokenKind>>,
}

impl PrecedenceTable {
    pub fn build(grammar: &Grammar) -> Result<Self, GrammarError> {
        let rhs: Vec<(NonTerminal, Vec<Symbol>)> = grammar
            .productions
            .iter()
            .flat_map(|p| p.expand().into_iter().map(move |rhs| (p.lhs, rhs)))
            .collect();
        let first = operator_sets(&rhs, Edge::First);
        let last = operator_sets(&rhs, Edge::Last);

        let mut found: BTreeMap<(TokenKind, TokenKind), BTreeSet<Prec>> = BTreeMap::new();
        let mut relate = |a: TokenKind, b: TokenKind, prec: Prec| {
            found.entry((a, b)).or_default().insert(prec);
        };
        for (_, symbols) in &rhs {
            for (i, pair) in symbols.windows(2).enumerate() {
                match (pair[0], pair[1]) {
                    (Symbol::T(a), Symbol::T(b)) => relate(a, b, Prec::Equal),
                    (Symbol::T(a), Symbol::N(n)) => {
                        for &b in first.get(&n).into_iter().flatten() {
                            relate(a, b, Prec::Yields);
                        }
                        if let Some(Symbol::T(c)) = symbols.get(i + 2) {
                            relate(a, *c, Prec::Equal);
                        }
                    }
                    (Symbol::N(n), Symbol::T(b)) => {
                        for &a in last.get(&n).into_iter().flatten() {
                            relate(a, b, Prec::Takes);
                        }
                    }
                    (Symbol::N(_), Symbol::N(_)) => {}
                }
            }
        }

        let mut relations = BTreeMap::new();
        for ((a, b), precs) in found {
            let prec = resolve(grammar, a, b, &precs)?;
            relations.insert((a, b), prec);
        }

        let equal = |a: TokenKind, b: TokenKind| relations.get(&(a, b)) == Some(&Prec::Equal);
        let mut roles = BTreeMap::new();
        for kind in TokenKind::ALL {
            let left = TokenKind::ALL.iter().any(|&a| equal(a, kind));
            let right = TokenKind::ALL.iter().any(|&b| equal(kind, b));
            let role = match (left, right) {
                (false, true) => Role::Opener,
                (true, true) => Role::Inner,
                (true, false) => Role::Closer,
                (false, false) => Role::Neutral,
            };
            roles.insert(kind, role);
        }

        let mut reach = BTreeMap::new();
        for (&opener, &role) in &roles {
            if role != Role::Opener {
                continue;
            }
            let mut seen = BTreeSet::new();
            let mut todo = vec![opener];
            while let Some(kind) = todo.pop() {
                for &next in TokenKind::ALL.iter().filter(|&&b| equal(kind, b)) {
                    if seen.insert(next) {
                        todo.push(next);
                    }
                }
            }
            reach.insert(opener, seen);
        }

        Ok(Self {
            relations,
            roles,
            reach,
        })
    }

    pub fn relation(&self, left: TokenKind, right: TokenKind) -> Option<Prec> {
        self.relations.get(&(left, right)).copied()
    }

    /// Every defined relation, ordered by pair.
    pub fn relations(&self) -> impl Iterator<Item = (TokenKind, TokenKind, Prec)> + '_ {
        self.relations.iter().map(|(&(a, b), &prec)| (a, b, prec))
    }

    pub fn role(&self, kind: TokenKind) -> Role {
        self.roles.get(&kind).copied().unwrap_or(Role::Neutral)
    }

    /// Whether `closer` (a closer or inner keyword) belongs to a construct opened by `opener`.
    pub fn closes(&self, closer: TokenKind, opener: TokenKind) -> bool {
        self.reach
            .get(&opener)
            .is_some_and(|reached| reached.contains(&closer))
    }

    /// Closers that can end a construct opened by `opener`.
    pub fn closers_of(&self, opener: TokenKind) -> Vec<TokenKind> {
        self.reach
            .get(&opener)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&kind| self.role(kind) == Role::Closer)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    First,
    Last,
}

/// FIRSTOP / LASTOP sets: terminals that can appear first (last) in a derivation of each
/// nonterminal, looking past at most one leading (trailing) nonterminal.
fn operator_sets(
    rhs: &[(NonTerminal, Vec<Symbol>)],
    edge: Edge,
) -> BTreeMap<NonTerminal, BTreeSet<TokenKind>> {
    let mut sets: BTreeMap<NonTerminal, BTreeSet<TokenKind>> = BTreeMap::new();
    loop {
        let mut changed = false;
        for (lhs, symbols) in rhs {
            let ordered: Vec<Symbol> = match edge {
                Edge::First => symbols.clone(),
                Edge::Last => symbols.iter().rev().copied().collect(),
            };
            let mut additions = BTreeSet::new();
            match ordered.as_slice() {
                [Symbol::T(a), ..] => {
                    additions.insert(*a);
                }
                [Symbol::N(n), rest @ ..] => {
                    additions.extend(sets.get(n).into_iter().flatten().copied());
                    if let Some(Symbol::T(b)) = rest.first() {
                        additions.insert(*b);
                    }
                }
                [] => {}
            }
            let set = sets.entry(*lhs).or_default();
            for kind in additions {
                changed |= set.insert(kind);
            }
        }
        if !changed {
            return sets;
        }
    }
}

fn resolve(
    grammar: &Grammar,
    left: TokenKind,
    right: TokenKind,
    precs: &BTreeSet<Prec>,
) -> Result<Prec, GrammarError> {
    if precs.len() == 1 {
        if let Some(&prec) = precs.iter().next() {
            return Ok(prec);
        }
    }
    let declared = grammar
        .associativity
        .iter()
        .find(|(kind, _)| *kind == left)
        .map(|(_, assoc)| *assoc);
    match declared {
        Some(assoc) if left == right && !precs.contains(&Prec::Equal) => Ok(match assoc {
            Assoc::Left | Assoc::Assoc => Prec::Takes,
            Assoc::Right => Prec::Yields,
        }),
        _ => Err(GrammarError::Conflict {
            left,
            right,
            relations: precs
                .iter()
                .map(|p| p.symbol())
                .collect::<Vec<_>>()
                .join(" "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::super::block_grammar::{Item, Production};
    use super::*;
    use TokenKind::*;

    #[test]
    fn block_grammar_builds() {
        assert!(PrecedenceTable::build(&BLOCK_GRAMMAR).is_ok());
    }

    #[test]
    fn roles_follow_from_equal_relations() {
        let table = &*BLOCK_TABLE;
        for opener in [Begin, For, IfBlock, Sub, Until, While, Gsave] {
            assert_eq!(table.role(opener), Role::Opener, "{opener}");
        }
        for closer in [EndThing, End, Next, NextVar, Grestore] {
            assert_eq!(table.role(closer), Role::Closer, "{closer}");
        }
        for inner in [ElseBloc, Assign, To, Step] {
            assert_eq!(table.role(inner), Role::Inner, "{inner}");
        }
        for neutral in [Separator, IfLine, ElseLine, Then, Exp, Var, Eob] {
            assert_eq!(table.role(neutral), Role::Neutral, "{neutral}");
        }
    }

    #[test]
    fn families() {
        let table = &*BLOCK_TABLE;
        assert!(table.closes(Next, While));
        assert!(table.closes(Next, Until));
        assert!(table.closes(NextVar, For));
        assert!(!table.closes(Next, For));
        assert!(table.closes(EndThing, IfBlock));
        assert!(table.closes(EndThing, Sub));
        assert!(table.closes(EndThing, Begin));
        assert!(!table.closes(End, Begin));
        assert!(table.closes(ElseBloc, IfBlock));
        assert!(table.closes(Step, For));
        assert_eq!(table.closers_of(Gsave), vec![Grestore]);
    }

    #[test]
    fn separator_is_associative() {
        let table = &*BLOCK_TABLE;
        assert_eq!(table.relation(Separator, Separator), Some(Prec::Takes));
        assert_eq!(table.relation(Begin, Separator), Some(Prec::Yields));
        assert_eq!(table.relation(Separator, EndThing), Some(Prec::Takes));
        assert_eq!(table.relation(Begin, EndThing), Some(Prec::Equal));
    }

    #[test]
    fn undeclared_self_conflict_is_rejected() {
        const CONFLICTING: Grammar = Grammar {
            productions: &[Production {
                lhs: NonTerminal::Inst,
                rhs: &[
                    Item::N(NonTerminal::Inst),
                    Item::T(Separator),
                    Item::N(NonTerminal::Inst),
                ],
            }],
            associativity: &[],
        };
        let error = PrecedenceTable::build(&CONFLICTING).unwrap_err();
        assert!(matches!(
            error,
            GrammarError::Conflict {
                left: Separator,
                right: Separator,
                ..
            }
        ));
    }
}
