//! The contract for opaque leaf payloads.
//!
//! The pool treats atomic constraints (arithmetic constraints, bitvector
//! constraints, uninterpreted equalities, ...) as black boxes. Everything the
//! pool needs from them is captured by the [`Atom`] trait; the rest of the
//! library plugs its constraint types in through it.

use std::fmt;
use std::hash::Hash;

/// An opaque, totally-ordered, hashable leaf payload.
///
/// An atom comes in two orientations, an atom and its negation, and the pool
/// stores only the smaller of the two (by `Ord`) as the positive entry of a
/// node pair. The contract:
///
/// - `a.negation().negation() == a` (involution),
/// - `a != a.negation()` for every atom that is not decided by
///   [`truth_value`][Atom::truth_value],
/// - `Ord` is a total order consistent with `Eq`, so exactly one orientation
///   of every pair is the smaller one.
///
/// [`truth_value`][Atom::truth_value] lets trivially decided atoms (such as
/// a constraint `0 < 1`) collapse to the TRUE/FALSE singletons before any
/// allocation happens.
pub trait Atom: Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display {
    /// Returns the negated orientation of this atom.
    fn negation(&self) -> Self;

    /// Returns `Some` if the atom is trivially true or trivially false.
    fn truth_value(&self) -> Option<bool> {
        None
    }
}

/// The uninhabited atom type, for pools over purely boolean structure.
///
/// `FormulaPool<NoAtom>` never holds an atom leaf; every formula is built
/// from boolean variables and the connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoAtom {}

impl fmt::Display for NoAtom {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl Atom for NoAtom {
    fn negation(&self) -> Self {
        match *self {}
    }
}
