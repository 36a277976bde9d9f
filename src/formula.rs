//! Shared handles to pooled formula nodes.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops;

use crate::atom::Atom;
use crate::content::FormulaKind;
use crate::pool::{FormulaPool, RenderSlot, FALSE_SLOT, TRUE_SLOT};
use crate::types::Variable;

/// A usage-counted handle to a canonical formula node.
///
/// Handles are cheap to clone (one counter bump) and compare in O(1): two
/// handles are equal exactly when they designate the same node. Dropping the
/// last handle of a node/negation pair removes the pair from its pool.
pub struct Formula<'p, A: Atom> {
    pool: &'p FormulaPool<A>,
    slot: usize,
}

impl<'p, A: Atom> Formula<'p, A> {
    pub(crate) fn from_raw(pool: &'p FormulaPool<A>, slot: usize) -> Self {
        Formula { pool, slot }
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn pool(&self) -> &'p FormulaPool<A> {
        self.pool
    }

    /// The node's unique id.
    ///
    /// Ids reflect creation order and are never reused while the pair lives;
    /// a node and its negation hold consecutive ids, the positive
    /// orientation's being odd.
    pub fn id(&self) -> u64 {
        self.pool.state.lock().content(self.slot).id
    }

    /// The pair's current usage count.
    pub fn usages(&self) -> usize {
        let state = self.pool.state.lock();
        let counter = if self.slot == TRUE_SLOT || self.slot == FALSE_SLOT {
            self.slot
        } else {
            state.base_slot(self.slot)
        };
        state.content(counter).usages
    }

    pub fn is_true(&self) -> bool {
        self.slot == TRUE_SLOT
    }

    pub fn is_false(&self) -> bool {
        self.slot == FALSE_SLOT
    }

    pub fn is_var(&self) -> bool {
        matches!(self.pool.state.lock().content(self.slot).kind, FormulaKind::Var(_))
    }

    pub fn is_atom(&self) -> bool {
        self.pool.state.lock().content(self.slot).kind.is_atom()
    }

    /// The variable behind this node, when it is a variable leaf.
    pub fn as_var(&self) -> Option<Variable> {
        match self.pool.state.lock().content(self.slot).kind {
            FormulaKind::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Whether `other` is exactly this node's negation.
    pub fn is_negation_of(&self, other: &Formula<A>) -> bool {
        self.pool.check_pool(other);
        self.pool.state.lock().content(self.slot).negation == other.slot
    }

    /// The difficulty estimate attached to this node (0.0 until set).
    pub fn difficulty(&self) -> f64 {
        self.pool.state.lock().content(self.slot).difficulty
    }

    pub fn set_difficulty(&self, value: f64) {
        self.pool.state.lock().content_mut(self.slot).difficulty = value;
    }
}

impl<A: Atom> Clone for Formula<'_, A> {
    fn clone(&self) -> Self {
        self.pool.state.lock().register(self.slot);
        Formula {
            pool: self.pool,
            slot: self.slot,
        }
    }
}

impl<A: Atom> Drop for Formula<'_, A> {
    fn drop(&mut self) {
        self.pool.state.lock().release(self.slot);
    }
}

impl<A: Atom> PartialEq for Formula<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.pool.check_pool(other);
        self.slot == other.slot
    }
}

impl<A: Atom> Eq for Formula<'_, A> {}

impl<A: Atom> Hash for Formula<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl<A: Atom> fmt::Display for Formula<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state.lock();
        write!(f, "{}", RenderSlot { state: &*state, slot: self.slot })
    }
}

impl<A: Atom> fmt::Debug for Formula<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state.lock();
        let content = state.content(self.slot);
        write!(
            f,
            "Formula(id = {}, {})",
            content.id,
            RenderSlot { state: &*state, slot: self.slot }
        )
    }
}

impl<'p, A: Atom> ops::Not for &Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn not(self) -> Self::Output {
        self.pool.mk_not(self)
    }
}

impl<'p, A: Atom> ops::Not for Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn not(self) -> Self::Output {
        !&self
    }
}

impl<'p, A: Atom> ops::BitAnd for &Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.pool.mk_and(&[self.clone(), rhs.clone()])
    }
}

impl<'p, A: Atom> ops::BitAnd for Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitand(self, rhs: Self) -> Self::Output {
        &self & &rhs
    }
}

impl<'p, A: Atom> ops::BitOr for &Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.pool.mk_or(&[self.clone(), rhs.clone()])
    }
}

impl<'p, A: Atom> ops::BitOr for Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitor(self, rhs: Self) -> Self::Output {
        &self | &rhs
    }
}

impl<'p, A: Atom> ops::BitXor for &Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.pool.mk_xor(&[self.clone(), rhs.clone()])
    }
}

impl<'p, A: Atom> ops::BitXor for Formula<'p, A> {
    type Output = Formula<'p, A>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        &self ^ &rhs
    }
}
