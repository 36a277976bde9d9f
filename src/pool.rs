//! The interning pool: canonical identity, pairing, and lifecycle.
//!
//! Every formula node lives in the pool's arena as one of a pair: the
//! positive orientation (odd id, indexed for lookup) and its negation (even
//! id, reachable through the pair link only). Structural equality therefore
//! coincides with slot equality, and negating twice returns the original
//! node without allocating.
//!
//! Lifecycle is usage-counted on the positive orientation. A pair starts
//! with one baseline reference (the partner's back edge for composite nodes,
//! the substitution allowance for atoms) and dies when the counter falls
//! back to that baseline, unless a Tseitin mapping still pins one of its
//! orientations.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};

use crate::arena::Arena;
use crate::atom::Atom;
use crate::content::{FormulaContent, FormulaKind, Quantifier};
use crate::formula::Formula;
use crate::lock::Shared;
use crate::types::Variable;

/// Slot of the TRUE singleton (id 1).
pub(crate) const TRUE_SLOT: usize = 1;
/// Slot of the FALSE singleton (id 2).
pub(crate) const FALSE_SLOT: usize = 2;

const DEFAULT_BITS: usize = 16;

/// The mutable pool internals, guarded by the pool's cell.
pub(crate) struct PoolState<A: Atom> {
    pub(crate) arena: Arena<A>,
    next_id: u64,
    next_var: u32,
    /// formula slot -> substitute variable slot
    pub(crate) tseitin_vars: HashMap<usize, usize>,
    /// substitute variable slot -> formula slot
    pub(crate) tseitin_var_to_formula: HashMap<usize, usize>,
}

impl<A: Atom> PoolState<A> {
    pub(crate) fn content(&self, slot: usize) -> &FormulaContent<A> {
        self.arena.value(slot)
    }

    pub(crate) fn content_mut(&mut self, slot: usize) -> &mut FormulaContent<A> {
        self.arena.value_mut(slot)
    }

    /// Normalize a slot to the positive orientation of its pair, where the
    /// usage counter lives. The singletons track their counters separately
    /// and never pass through here.
    pub(crate) fn base_slot(&self, slot: usize) -> usize {
        debug_assert!(slot != TRUE_SLOT && slot != FALSE_SLOT);
        let content = self.content(slot);
        let base = if content.id % 2 == 1 { slot } else { content.negation };
        trace!("base of slot {} is slot {}", slot, base);
        base
    }

    /// Increment the pair's usage count. An atom pair transitioning from
    /// unused to used counts twice: once for itself, once as a potential
    /// substitution target.
    pub(crate) fn register(&mut self, slot: usize) {
        if slot == TRUE_SLOT || slot == FALSE_SLOT {
            return;
        }
        let base = self.base_slot(slot);
        let content = self.arena.value_mut(base);
        debug!("registering slot {}, usages {}", base, content.usages);
        content.usages += 1;
        if content.usages == 1 && content.kind.is_atom() {
            debug!("atom pair, counting twice");
            content.usages += 1;
        }
    }

    /// Decrement the pair's usage count; when only the baseline reference
    /// remains, destroy the pair unless a Tseitin mapping pins either
    /// orientation.
    pub(crate) fn release(&mut self, slot: usize) {
        if slot == TRUE_SLOT || slot == FALSE_SLOT {
            return;
        }
        let base = self.base_slot(slot);
        {
            let content = self.arena.value_mut(base);
            debug!("releasing slot {}, usages {}", base, content.usages);
            assert!(content.usages > 1, "released a formula with no live references");
            content.usages -= 1;
            if content.usages > 1 {
                return;
            }
        }
        let partner = self.content(base).negation;
        let pinned_base = self.release_tseitin(base);
        let pinned_partner = self.release_tseitin(partner);
        if !pinned_base && !pinned_partner {
            self.destroy_pair(base);
        }
    }

    /// Remove a pair from the pool and release the stored node's children.
    ///
    /// The partner's back edge is the baseline reference whose exhaustion
    /// triggered the destruction, so it is consumed here structurally rather
    /// than released through the counter.
    pub(crate) fn destroy_pair(&mut self, base: usize) {
        let partner = self.content(base).negation;
        debug!(
            "destroying pair: slots {}/{} (ids {}/{})",
            base,
            partner,
            self.content(base).id,
            self.content(partner).id
        );
        let content = self.arena.remove(base);
        let partner_content = self.arena.take(partner);
        match partner_content.kind {
            FormulaKind::Not(child) => debug_assert_eq!(child, base),
            FormulaKind::Atom(_) => {}
            _ => unreachable!("a negation partner is a NOT node or an atom"),
        }
        match content.kind {
            FormulaKind::NAry(_, children) => {
                for &child in children.iter() {
                    self.release(child);
                }
            }
            FormulaKind::Quantified(_, _, body) => self.release(body),
            _ => {}
        }
    }

    /// Intern a composite or variable node; returns the existing slot when
    /// an equal node is present, otherwise admits the node together with a
    /// freshly built negation partner.
    pub(crate) fn intern(&mut self, kind: FormulaKind<A>) -> usize {
        debug_assert!(matches!(
            kind,
            FormulaKind::Var(_) | FormulaKind::NAry(..) | FormulaKind::Quantified(..)
        ));
        if let Some(slot) = self.arena.find(&kind) {
            trace!("found existing node at slot {}", slot);
            return slot;
        }
        let children: Vec<usize> = match &kind {
            FormulaKind::NAry(_, items) => items.to_vec(),
            FormulaKind::Quantified(_, _, body) => vec![*body],
            _ => Vec::new(),
        };
        let id = self.next_id;
        self.next_id += 2;
        let base = self.arena.insert(FormulaContent::new(kind, id));
        let partner = self.arena.add(FormulaContent::new(FormulaKind::Not(base), id + 1));
        self.arena.value_mut(base).negation = partner;
        self.arena.value_mut(partner).negation = base;
        // the partner's back edge is the pair's baseline reference
        self.register(base);
        for child in children {
            self.register(child);
        }
        debug!("interned id {} at slot {}, negation id {} at slot {}", id, base, id + 1, partner);
        base
    }

    /// Intern an atom pair, storing the smaller orientation as the positive
    /// entry, and return the slot of the requested orientation.
    pub(crate) fn intern_atom(&mut self, atom: A) -> usize {
        let negated = atom.negation();
        assert!(atom != negated, "an atom must differ from its negation");
        let (positive, negative, requested_positive) = if atom < negated {
            (atom, negated, true)
        } else {
            (negated, atom, false)
        };
        let kind = FormulaKind::Atom(positive);
        if let Some(base) = self.arena.find(&kind) {
            trace!("found existing atom at slot {}", base);
            return if requested_positive {
                base
            } else {
                self.content(base).negation
            };
        }
        let id = self.next_id;
        self.next_id += 2;
        let base = self.arena.insert(FormulaContent::new(kind, id));
        let partner = self.arena.add(FormulaContent::new(FormulaKind::Atom(negative), id + 1));
        self.arena.value_mut(base).negation = partner;
        self.arena.value_mut(partner).negation = base;
        // no baseline reference yet: the double count on first registration
        // covers the pair
        debug!("interned atom id {} at slot {}, negation id {} at slot {}", id, base, id + 1, partner);
        if requested_positive {
            base
        } else {
            partner
        }
    }

    /// Allocate a fresh boolean variable node, for Tseitin substitutes.
    pub(crate) fn fresh_var_slot(&mut self) -> usize {
        let var = Variable::new(self.next_var);
        self.next_var += 1;
        self.intern(FormulaKind::Var(var))
    }

    /// Keep the fresh-variable counter ahead of client-chosen numbering.
    fn note_var(&mut self, var: Variable) {
        if var.id() >= self.next_var {
            self.next_var = var.id() + 1;
        }
    }
}

/// The canonical formula pool.
///
/// All construction funnels through one pool instance; handles borrow it, so
/// isolated pools (one per test, one per solver context) come for free. With
/// the `thread-safe` feature every entry point serializes on the pool's
/// internal lock.
pub struct FormulaPool<A: Atom> {
    pub(crate) state: Shared<PoolState<A>>,
}

impl<A: Atom> FormulaPool<A> {
    /// Create a pool with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity_bits(DEFAULT_BITS)
    }

    /// Create a pool with `2^bits` node slots.
    ///
    /// # Panics
    ///
    /// Later operations panic with "Arena is full" once all slots are taken.
    pub fn with_capacity_bits(bits: usize) -> Self {
        let mut arena = Arena::new(bits);
        let t = arena.insert(FormulaContent::new(FormulaKind::True, 1));
        let f = arena.add(FormulaContent::new(FormulaKind::False, 2));
        assert_eq!(t, TRUE_SLOT);
        assert_eq!(f, FALSE_SLOT);
        arena.value_mut(t).negation = f;
        arena.value_mut(t).usages = 1;
        arena.value_mut(f).negation = t;
        arena.value_mut(f).usages = 1;
        Self {
            state: Shared::new(PoolState {
                arena,
                next_id: 3,
                next_var: 1,
                tseitin_vars: HashMap::new(),
                tseitin_var_to_formula: HashMap::new(),
            }),
        }
    }

    pub(crate) fn wrap(&self, state: &mut PoolState<A>, slot: usize) -> Formula<'_, A> {
        state.register(slot);
        Formula::from_raw(self, slot)
    }

    pub(crate) fn check_pool(&self, f: &Formula<A>) {
        debug_assert!(std::ptr::eq(self, f.pool()), "formula belongs to a different pool");
    }

    /// The TRUE singleton (id 1).
    pub fn mk_true(&self) -> Formula<'_, A> {
        let mut state = self.state.lock();
        self.wrap(&mut state, TRUE_SLOT)
    }

    /// The FALSE singleton (id 2).
    pub fn mk_false(&self) -> Formula<'_, A> {
        let mut state = self.state.lock();
        self.wrap(&mut state, FALSE_SLOT)
    }

    /// A boolean variable leaf.
    pub fn var(&self, var: Variable) -> Formula<'_, A> {
        debug!("var({})", var);
        let mut state = self.state.lock();
        state.note_var(var);
        let slot = state.intern(FormulaKind::Var(var));
        self.wrap(&mut state, slot)
    }

    /// An atom leaf. Trivially decided atoms collapse to the TRUE/FALSE
    /// singletons without touching the index.
    pub fn atom(&self, atom: A) -> Formula<'_, A> {
        debug!("atom({})", atom);
        let mut state = self.state.lock();
        let slot = match atom.truth_value() {
            Some(true) => TRUE_SLOT,
            Some(false) => FALSE_SLOT,
            None => state.intern_atom(atom),
        };
        self.wrap(&mut state, slot)
    }

    /// The negation of a formula. Never allocates: the negation node exists
    /// from the moment its pair is created.
    pub fn mk_not(&self, f: &Formula<A>) -> Formula<'_, A> {
        self.check_pool(f);
        debug!("mk_not(slot {})", f.slot());
        let mut state = self.state.lock();
        let slot = state.content(f.slot()).negation;
        self.wrap(&mut state, slot)
    }

    /// A quantified formula. An empty variable list returns the body
    /// unchanged.
    pub fn mk_quantified(&self, quantifier: Quantifier, vars: &[Variable], body: &Formula<A>) -> Formula<'_, A> {
        self.check_pool(body);
        debug!("mk_quantified({}, {} vars, slot {})", quantifier, vars.len(), body.slot());
        let mut state = self.state.lock();
        if vars.is_empty() {
            return self.wrap(&mut state, body.slot());
        }
        let slot = state.intern(FormulaKind::Quantified(quantifier, vars.into(), body.slot()));
        self.wrap(&mut state, slot)
    }

    /// Number of live canonical entries: one per node/negation pair, the
    /// TRUE/FALSE pair included.
    pub fn size(&self) -> usize {
        self.state.lock().arena.index_size()
    }
}

impl<A: Atom> Default for FormulaPool<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a slot as an s-expression; shared by `Display` on handles and the
/// pool dump.
pub(crate) struct RenderSlot<'s, A: Atom> {
    pub(crate) state: &'s PoolState<A>,
    pub(crate) slot: usize,
}

impl<A: Atom> fmt::Display for RenderSlot<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let child = |slot: usize| RenderSlot { state: self.state, slot };
        match &self.state.content(self.slot).kind {
            FormulaKind::True => f.write_str("true"),
            FormulaKind::False => f.write_str("false"),
            FormulaKind::Var(v) => write!(f, "{}", v),
            FormulaKind::Atom(a) => write!(f, "{}", a),
            FormulaKind::Not(inner) => write!(f, "(not {})", child(*inner)),
            FormulaKind::NAry(op, children) => {
                write!(f, "({}", op)?;
                for &c in children.iter() {
                    write!(f, " {}", child(c))?;
                }
                f.write_str(")")
            }
            FormulaKind::Quantified(q, vars, body) => {
                write!(f, "({} (", q)?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ") {})", child(*body))
            }
        }
    }
}
