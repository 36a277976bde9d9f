//! Tseitin substitute variables.
//!
//! A Tseitin encoding replaces a subformula by a fresh boolean variable.
//! The pool keeps that association in two maps (formula to substitute and
//! back), keyed by exact orientation, so a formula and its negation can
//! carry distinct substitutes.
//!
//! The maps hold raw slots without usage counts. Deletion is cooperative
//! instead: a pair whose counter runs out checks both maps first and stays
//! as a zombie while the other side of its association is still in use.
//! Whichever side dies last sweeps the association and both pairs. A zombie
//! remains indexed, so re-building the same formula revives it together
//! with its mapping.

use log::debug;

use crate::atom::Atom;
use crate::formula::Formula;
use crate::pool::{FormulaPool, PoolState, FALSE_SLOT, TRUE_SLOT};

impl<A: Atom> PoolState<A> {
    /// Check the Tseitin maps on behalf of a pair whose counter just ran
    /// out. Returns true when an association still needs the pair alive.
    pub(crate) fn release_tseitin(&mut self, slot: usize) -> bool {
        if let Some(&var_slot) = self.tseitin_vars.get(&slot) {
            if self.content(var_slot).usages == 1 {
                debug!("sweeping the unused substitute of slot {}", slot);
                self.tseitin_vars.remove(&slot);
                self.tseitin_var_to_formula.remove(&var_slot);
                self.destroy_pair(var_slot);
            } else {
                debug!("slot {} stays, its substitute is in use", slot);
                return true;
            }
        }
        if let Some(&formula_slot) = self.tseitin_var_to_formula.get(&slot) {
            let in_use =
                formula_slot <= FALSE_SLOT || self.content(self.base_slot(formula_slot)).usages > 1;
            if in_use {
                debug!("slot {} stays, it substitutes a live formula", slot);
                return true;
            }
            debug!("slot {} substitutes a dead formula, sweeping the association", slot);
            self.tseitin_var_to_formula.remove(&slot);
            self.tseitin_vars.remove(&formula_slot);
            let base = self.base_slot(formula_slot);
            self.destroy_pair(base);
        }
        false
    }
}

impl<A: Atom> FormulaPool<A> {
    /// The substitute variable registered for `f`, or TRUE when there is
    /// none. Orientation matters: a formula and its negation are looked up
    /// separately.
    pub fn tseitin_var(&self, f: &Formula<A>) -> Formula<'_, A> {
        self.check_pool(f);
        let mut state = self.state.lock();
        let slot = state.tseitin_vars.get(&f.slot()).copied().unwrap_or(TRUE_SLOT);
        self.wrap(&mut state, slot)
    }

    /// Register a substitute variable for `f`, or return the existing one.
    ///
    /// The first call allocates a fresh boolean variable, copies the
    /// formula's difficulty onto it, and links the association in both
    /// directions.
    pub fn create_tseitin_var(&self, f: &Formula<A>) -> Formula<'_, A> {
        self.check_pool(f);
        debug!("create_tseitin_var(slot {})", f.slot());
        let mut state = self.state.lock();
        if let Some(&var_slot) = state.tseitin_vars.get(&f.slot()) {
            return self.wrap(&mut state, var_slot);
        }
        let var_slot = state.fresh_var_slot();
        let difficulty = state.content(f.slot()).difficulty;
        state.content_mut(var_slot).difficulty = difficulty;
        state.tseitin_vars.insert(f.slot(), var_slot);
        state.tseitin_var_to_formula.insert(var_slot, f.slot());
        debug!("slot {} now substitutes slot {}", var_slot, f.slot());
        self.wrap(&mut state, var_slot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::atom::NoAtom;
    use crate::pool::FormulaPool;
    use crate::types::Variable;

    fn pool() -> FormulaPool<NoAtom> {
        FormulaPool::new()
    }

    #[test]
    fn test_lookup_without_registration_yields_true() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        assert!(pool.tseitin_var(&x).is_true());
    }

    #[test]
    fn test_create_and_lookup() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        f.set_difficulty(3.0);
        let v = pool.create_tseitin_var(&f);
        assert!(v.is_var());
        assert_eq!(v.difficulty(), 3.0);
        assert_eq!(pool.tseitin_var(&f), v);
        assert_eq!(pool.create_tseitin_var(&f), v);
    }

    #[test]
    fn test_substitute_does_not_collide_with_client_vars() {
        let pool = pool();
        let x = pool.var(Variable::new(7));
        let v = pool.create_tseitin_var(&x);
        assert_ne!(v, x);
        assert_eq!(v.to_string(), "x8");
    }

    #[test]
    fn test_orientations_carry_distinct_substitutes() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let nf = !&f;
        let v = pool.create_tseitin_var(&nf);
        assert_eq!(pool.tseitin_var(&nf), v);
        assert!(pool.tseitin_var(&f).is_true());
        let w = pool.create_tseitin_var(&f);
        assert_ne!(w, v);
    }

    #[test]
    fn test_live_substitute_pins_dead_formula() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let f_id = f.id();
        let v = pool.create_tseitin_var(&f);
        let before = pool.size();
        drop(f);
        // the formula stays indexed while its substitute is held
        assert_eq!(pool.size(), before);
        let revived = pool.mk_and(&[x.clone(), y.clone()]);
        assert_eq!(revived.id(), f_id);
        assert_eq!(pool.tseitin_var(&revived), v);
    }

    #[test]
    fn test_formula_death_sweeps_unused_substitute() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let v = pool.create_tseitin_var(&f);
        drop(v);
        // the zombie substitute stays until the formula goes
        assert_eq!(pool.size(), 5);
        drop(f);
        assert_eq!(pool.size(), 3);
        let rebuilt = pool.mk_and(&[x.clone(), y.clone()]);
        assert!(pool.tseitin_var(&rebuilt).is_true());
    }

    #[test]
    fn test_substitute_death_sweeps_dead_formula() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let v = pool.create_tseitin_var(&f);
        drop(f);
        assert_eq!(pool.size(), 5);
        drop(v);
        // the last side of the association sweeps both pairs
        assert_eq!(pool.size(), 3);
        let rebuilt = pool.mk_and(&[x.clone(), y.clone()]);
        assert!(pool.tseitin_var(&rebuilt).is_true());
    }

    #[test]
    fn test_negative_orientation_association_sweeps() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let nf = !&f;
        let v = pool.create_tseitin_var(&nf);
        drop(v);
        drop(nf);
        assert_eq!(pool.size(), 5);
        drop(f);
        assert_eq!(pool.size(), 3);
    }

    #[test]
    fn test_revived_zombie_survives_later_drops() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let f = pool.mk_and(&[x.clone(), pool.var(Variable::new(2))]);
        let v = pool.create_tseitin_var(&f);
        drop(f);
        let revived = pool.tseitin_var(&x);
        // unrelated lookup; the zombie formula is untouched
        assert!(revived.is_true());
        drop(v);
        // both sides of the association are gone now
        assert_eq!(pool.size(), 2);
    }
}
