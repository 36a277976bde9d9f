//! Node representation: operators, structural kinds, and stored contents.
//!
//! A [`FormulaKind`] is the structural identity of a node (what the hashed
//! index deduplicates on); a [`FormulaContent`] is a kind plus the per-node
//! metadata the pool maintains (id, usage counter, negation link,
//! difficulty).

use std::fmt;

use crate::types::Variable;

/// The associative-commutative n-ary connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaryOp {
    And,
    Or,
    Xor,
    Iff,
}

impl NaryOp {
    pub fn name(self) -> &'static str {
        match self {
            NaryOp::And => "and",
            NaryOp::Or => "or",
            NaryOp::Xor => "xor",
            NaryOp::Iff => "iff",
        }
    }
}

impl fmt::Display for NaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First-order quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Exists,
    Forall,
}

impl Quantifier {
    pub fn name(self) -> &'static str {
        match self {
            Quantifier::Exists => "exists",
            Quantifier::Forall => "forall",
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The structural kind of a node.
///
/// Children are arena slots of already-canonical nodes, so structural
/// equality of kinds is plain `Eq`. N-ary children are sorted by node id and
/// duplicate-free; implication and if-then-else never appear here, they are
/// rewritten into these kinds at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormulaKind<A> {
    True,
    False,
    Var(Variable),
    Atom(A),
    Not(usize),
    NAry(NaryOp, Box<[usize]>),
    Quantified(Quantifier, Box<[Variable]>, usize),
}

impl<A> FormulaKind<A> {
    pub fn is_atom(&self) -> bool {
        matches!(self, FormulaKind::Atom(_))
    }
}

/// A stored node: structural kind plus pool-managed metadata.
///
/// The kind never changes after construction. `usages` is meaningful on the
/// positive orientation of a pair only; `negation` always links to the other
/// orientation's slot.
#[derive(Debug)]
pub struct FormulaContent<A> {
    pub kind: FormulaKind<A>,
    /// Stable numeric identity; a node and its negation get consecutive ids,
    /// the node (odd) before the negation (even). Never reused.
    pub id: u64,
    /// Usage counter of the pair, tracked on the positive orientation.
    pub usages: usize,
    /// Slot of the negation node.
    pub negation: usize,
    /// Cost heuristic consumed by encoders; copied onto Tseitin substitutes.
    pub difficulty: f64,
}

impl<A> FormulaContent<A> {
    pub fn new(kind: FormulaKind<A>, id: u64) -> Self {
        Self {
            kind,
            id,
            usages: 0,
            negation: 0,
            difficulty: 0.0,
        }
    }
}
