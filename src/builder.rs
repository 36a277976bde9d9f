//! N-ary construction: flattening, ordering, and complementary-pair
//! simplification.
//!
//! All n-ary operations are stored with their operands sorted by id and
//! deduplicated, so commutativity and idempotence hold at the identity
//! level. Conjunctions and disjunctions absorb directly nested applications
//! of themselves before sorting, which keeps interned AND/OR nodes free of
//! same-operation children.
//!
//! After sorting, a node and its negation end up adjacent (their ids are
//! consecutive), so one linear scan finds every complementary pair. Such a
//! pair collapses the whole application for AND, OR and IFF; for XOR it is
//! equivalent to TRUE, which replaces the pair, and the scan restarts.

use log::debug;

use crate::atom::Atom;
use crate::content::{FormulaKind, NaryOp};
use crate::formula::Formula;
use crate::pool::{FormulaPool, PoolState, FALSE_SLOT, TRUE_SLOT};

impl<A: Atom> PoolState<A> {
    /// Normalize an n-ary application over raw slots and intern the result.
    pub(crate) fn nary(&mut self, op: NaryOp, operands: Vec<usize>) -> usize {
        let mut slots = Vec::with_capacity(operands.len());
        for slot in operands {
            match &self.content(slot).kind {
                FormulaKind::NAry(inner, children)
                    if *inner == op && matches!(op, NaryOp::And | NaryOp::Or) =>
                {
                    slots.extend(children.iter().copied());
                }
                _ => slots.push(slot),
            }
        }
        slots.sort_by_key(|&slot| self.content(slot).id);
        slots.dedup();

        loop {
            let mut cancelled = false;
            for i in 1..slots.len() {
                if self.content(slots[i - 1]).negation == slots[i] {
                    match op {
                        NaryOp::And | NaryOp::Iff => {
                            debug!("complementary pair collapses the {} to false", op);
                            return FALSE_SLOT;
                        }
                        NaryOp::Or => {
                            debug!("complementary pair collapses the or to true");
                            return TRUE_SLOT;
                        }
                        NaryOp::Xor => {
                            debug!("complementary pair inside a xor is equivalent to true");
                            slots.drain(i - 1..=i);
                            if slots.first() != Some(&TRUE_SLOT) {
                                slots.insert(0, TRUE_SLOT);
                            }
                        }
                    }
                    cancelled = true;
                    break;
                }
            }
            if !cancelled {
                break;
            }
        }

        match slots.len() {
            0 => {
                debug!("empty {} collapses to false", op);
                FALSE_SLOT
            }
            1 if op != NaryOp::Iff => slots[0],
            1 => TRUE_SLOT,
            _ => self.intern(FormulaKind::NAry(op, slots.into_boxed_slice())),
        }
    }
}

impl<A: Atom> FormulaPool<A> {
    /// Build an n-ary application.
    ///
    /// Operands are flattened one level (AND/OR only), sorted by id,
    /// deduplicated, and simplified on complementary pairs, so common
    /// boolean identities resolve to existing nodes instead of allocating:
    ///
    /// - `AND(x, NOT x, ..)` is FALSE, `OR(x, NOT x, ..)` is TRUE,
    ///   `IFF(x, NOT x, ..)` is FALSE;
    /// - in `XOR` a complementary pair is replaced by TRUE;
    /// - an empty application is FALSE;
    /// - a single remaining operand is the result itself, except for IFF,
    ///   which is TRUE.
    pub fn mk_nary(&self, op: NaryOp, operands: &[Formula<A>]) -> Formula<'_, A> {
        for f in operands {
            self.check_pool(f);
        }
        debug!("mk_nary({}, {} operands)", op, operands.len());
        let mut state = self.state.lock();
        let slots = operands.iter().map(|f| f.slot()).collect();
        let slot = state.nary(op, slots);
        self.wrap(&mut state, slot)
    }

    pub fn mk_and(&self, operands: &[Formula<A>]) -> Formula<'_, A> {
        self.mk_nary(NaryOp::And, operands)
    }

    pub fn mk_or(&self, operands: &[Formula<A>]) -> Formula<'_, A> {
        self.mk_nary(NaryOp::Or, operands)
    }

    pub fn mk_xor(&self, operands: &[Formula<A>]) -> Formula<'_, A> {
        self.mk_nary(NaryOp::Xor, operands)
    }

    pub fn mk_iff(&self, operands: &[Formula<A>]) -> Formula<'_, A> {
        self.mk_nary(NaryOp::Iff, operands)
    }

    /// `premise -> conclusion`, stored as `(or (not premise) conclusion)`.
    pub fn mk_implication(&self, premise: &Formula<A>, conclusion: &Formula<A>) -> Formula<'_, A> {
        self.check_pool(premise);
        self.check_pool(conclusion);
        debug!("mk_implication(slot {}, slot {})", premise.slot(), conclusion.slot());
        let mut state = self.state.lock();
        let negated = state.content(premise.slot()).negation;
        let slot = state.nary(NaryOp::Or, vec![negated, conclusion.slot()]);
        self.wrap(&mut state, slot)
    }

    /// `if cond then then_branch else else_branch`, expanded to
    /// `(or (and cond then_branch) (and (not cond) else_branch))`.
    ///
    /// A constant condition or equal branches short-circuit to the branch
    /// itself.
    pub fn mk_ite(
        &self,
        cond: &Formula<A>,
        then_branch: &Formula<A>,
        else_branch: &Formula<A>,
    ) -> Formula<'_, A> {
        self.check_pool(cond);
        self.check_pool(then_branch);
        self.check_pool(else_branch);
        debug!(
            "mk_ite(slot {}, slot {}, slot {})",
            cond.slot(),
            then_branch.slot(),
            else_branch.slot()
        );
        let mut state = self.state.lock();
        if cond.is_true() {
            return self.wrap(&mut state, then_branch.slot());
        }
        if cond.is_false() {
            return self.wrap(&mut state, else_branch.slot());
        }
        if then_branch == else_branch {
            return self.wrap(&mut state, then_branch.slot());
        }
        let negated = state.content(cond.slot()).negation;
        let positive = state.nary(NaryOp::And, vec![cond.slot(), then_branch.slot()]);
        let negative = state.nary(NaryOp::And, vec![negated, else_branch.slot()]);
        let slot = state.nary(NaryOp::Or, vec![positive, negative]);
        self.wrap(&mut state, slot)
    }

    /// XOR over a multiset of operands: multiplicities are condensed by
    /// parity first, so duplicated operands cancel instead of merging.
    pub fn mk_xor_multiset(&self, operands: &[Formula<A>]) -> Formula<'_, A> {
        for f in operands {
            self.check_pool(f);
        }
        debug!("mk_xor_multiset({} operands)", operands.len());
        let mut state = self.state.lock();
        if operands.is_empty() {
            return self.wrap(&mut state, FALSE_SLOT);
        }
        if operands.len() == 1 {
            return self.wrap(&mut state, operands[0].slot());
        }
        let mut slots: Vec<usize> = operands.iter().map(|f| f.slot()).collect();
        slots.sort_by_key(|&slot| state.content(slot).id);
        let mut kept = Vec::with_capacity(slots.len());
        let mut run = 1;
        for i in 1..=slots.len() {
            if i < slots.len() && slots[i] == slots[i - 1] {
                run += 1;
            } else {
                if run % 2 == 1 {
                    kept.push(slots[i - 1]);
                }
                run = 1;
            }
        }
        let slot = state.nary(NaryOp::Xor, kept);
        self.wrap(&mut state, slot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::atom::NoAtom;
    use crate::content::NaryOp;
    use crate::pool::FormulaPool;
    use crate::types::Variable;

    fn pool() -> FormulaPool<NoAtom> {
        FormulaPool::new()
    }

    #[test]
    fn test_commutative_and_idempotent() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let a = pool.mk_and(&[x.clone(), y.clone()]);
        let b = pool.mk_and(&[y.clone(), x.clone()]);
        let c = pool.mk_and(&[x.clone(), y.clone(), x.clone()]);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_and_flattens_nested_and() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let z = pool.var(Variable::new(3));
        let inner = pool.mk_and(&[x.clone(), y.clone()]);
        let left = pool.mk_and(&[inner.clone(), z.clone()]);
        let flat = pool.mk_and(&[x.clone(), y.clone(), z.clone()]);
        assert_eq!(left, flat);
        assert_eq!(left.to_string(), "(and x1 x2 x3)");
        let right = pool.mk_and(&[x.clone(), pool.mk_and(&[y.clone(), z.clone()])]);
        assert_eq!(right, flat);
    }

    #[test]
    fn test_and_keeps_nested_or() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let z = pool.var(Variable::new(3));
        let disjunction = pool.mk_or(&[x.clone(), y.clone()]);
        let conjunction = pool.mk_and(&[disjunction.clone(), z.clone()]);
        assert_eq!(conjunction.to_string(), "(and x3 (or x1 x2))");
    }

    #[test]
    fn test_complementary_pairs_collapse() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let nx = !&x;
        assert!(pool.mk_and(&[x.clone(), nx.clone()]).is_false());
        assert!(pool.mk_and(&[x.clone(), y.clone(), nx.clone()]).is_false());
        assert!(pool.mk_or(&[x.clone(), nx.clone()]).is_true());
        assert!(pool.mk_or(&[y.clone(), x.clone(), nx.clone()]).is_true());
        assert!(pool.mk_iff(&[x.clone(), nx.clone()]).is_false());
    }

    #[test]
    fn test_collapse_allocates_nothing() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let nx = !&x;
        let before = pool.size();
        assert!(pool.mk_and(&[x.clone(), nx.clone()]).is_false());
        assert_eq!(pool.size(), before);
    }

    #[test]
    fn test_xor_cancellation() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let nx = !&x;
        assert!(pool.mk_xor(&[x.clone(), nx.clone()]).is_true());
        let reduced = pool.mk_xor(&[x.clone(), nx.clone(), y.clone()]);
        assert_eq!(reduced.to_string(), "(xor true x2)");
        assert_eq!(reduced, pool.mk_xor(&[pool.mk_true(), y.clone()]));
    }

    #[test]
    fn test_xor_set_semantics() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let nx = !&x;
        // operands are a set: the pair's replacement merges with the
        // already-present true
        assert!(pool.mk_xor(&[pool.mk_true(), x.clone(), nx.clone()]).is_true());
        assert_eq!(pool.mk_xor(&[x.clone(), x.clone()]), x);
    }

    #[test]
    fn test_empty_applications() {
        let pool = pool();
        assert!(pool.mk_and(&[]).is_false());
        assert!(pool.mk_or(&[]).is_false());
        assert!(pool.mk_xor(&[]).is_false());
        assert!(pool.mk_iff(&[]).is_false());
    }

    #[test]
    fn test_singleton_applications() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        assert_eq!(pool.mk_and(&[x.clone()]), x);
        assert_eq!(pool.mk_or(&[x.clone()]), x);
        assert_eq!(pool.mk_xor(&[x.clone()]), x);
        assert!(pool.mk_iff(&[x.clone()]).is_true());
    }

    #[test]
    fn test_iff_of_equal_operands() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        // dedup leaves a single operand, and a reflexive iff holds
        assert!(pool.mk_iff(&[x.clone(), x.clone()]).is_true());
    }

    #[test]
    fn test_implication() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let imp = pool.mk_implication(&x, &y);
        assert_eq!(imp, pool.mk_or(&[!&x, y.clone()]));
        assert_eq!(imp.to_string(), "(or (not x1) x2)");
        assert!(pool.mk_implication(&x, &x).is_true());
        assert!(pool.mk_implication(&x, &!&x).is_negation_of(&x));
    }

    #[test]
    fn test_ite_expansion() {
        let pool = pool();
        let c = pool.var(Variable::new(1));
        let t = pool.var(Variable::new(2));
        let e = pool.var(Variable::new(3));
        let ite = pool.mk_ite(&c, &t, &e);
        let expanded = pool.mk_or(&[
            pool.mk_and(&[c.clone(), t.clone()]),
            pool.mk_and(&[!&c, e.clone()]),
        ]);
        assert_eq!(ite, expanded);
    }

    #[test]
    fn test_ite_short_circuits() {
        let pool = pool();
        let c = pool.var(Variable::new(1));
        let t = pool.var(Variable::new(2));
        let e = pool.var(Variable::new(3));
        assert_eq!(pool.mk_ite(&pool.mk_true(), &t, &e), t);
        assert_eq!(pool.mk_ite(&pool.mk_false(), &t, &e), e);
        assert_eq!(pool.mk_ite(&c, &t, &t), t);
    }

    #[test]
    fn test_ite_short_circuits_outlive_operands() {
        let pool = pool();
        let (on_true, on_false, on_equal) = {
            let c = pool.var(Variable::new(1));
            let t = pool.var(Variable::new(2));
            let e = pool.var(Variable::new(3));
            (
                pool.mk_ite(&pool.mk_true(), &t, &e),
                pool.mk_ite(&pool.mk_false(), &t, &e),
                pool.mk_ite(&c, &t, &t),
            )
        };
        // the condition's pair died with its handle, the chosen branches stay
        assert_eq!(pool.size(), 3);
        assert!(on_true.is_var());
        assert_eq!(on_false.to_string(), "x3");
        assert_eq!(on_equal, on_true);
    }

    #[test]
    fn test_xor_multiset_parity() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        assert!(pool.mk_xor_multiset(&[]).is_false());
        assert_eq!(pool.mk_xor_multiset(&[x.clone()]), x);
        assert!(pool.mk_xor_multiset(&[x.clone(), x.clone()]).is_false());
        assert_eq!(pool.mk_xor_multiset(&[x.clone(), x.clone(), x.clone()]), x);
        assert_eq!(pool.mk_xor_multiset(&[x.clone(), y.clone(), x.clone()]), y);
        let mixed = pool.mk_xor_multiset(&[y.clone(), x.clone(), y.clone(), x.clone(), y.clone()]);
        assert_eq!(mixed, y, "x cancels, y keeps one copy");
        let condensed = pool.mk_xor_multiset(&[x.clone(), y.clone(), x.clone(), x.clone()]);
        assert_eq!(condensed, pool.mk_xor(&[x.clone(), y.clone()]), "three copies of x keep one");
    }

    #[test]
    fn test_xor_multiset_singleton_outlives_operand() {
        let pool = pool();
        let kept = {
            let x = pool.var(Variable::new(1));
            pool.mk_xor_multiset(&[x.clone()])
        };
        assert_eq!(kept.to_string(), "x1");
        assert_eq!(pool.size(), 2);
        drop(kept);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_nary_operator_names() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        for (op, name) in [
            (NaryOp::And, "(and x1 x2)"),
            (NaryOp::Or, "(or x1 x2)"),
            (NaryOp::Xor, "(xor x1 x2)"),
            (NaryOp::Iff, "(iff x1 x2)"),
        ] {
            assert_eq!(pool.mk_nary(op, &[x.clone(), y.clone()]).to_string(), name);
        }
    }

    #[test]
    fn test_released_conjunction_cascades() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let conjunction = pool.mk_and(&[x.clone(), y.clone()]);
        assert_eq!(pool.size(), 4);
        drop(conjunction);
        assert_eq!(pool.size(), 3);
        drop(x);
        drop(y);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_operands_survive_through_parent() {
        let pool = pool();
        let conjunction = {
            let x = pool.var(Variable::new(1));
            let y = pool.var(Variable::new(2));
            pool.mk_and(&[x, y])
        };
        // the operand handles are gone, the node keeps its children alive
        assert_eq!(pool.size(), 4);
        assert_eq!(conjunction.to_string(), "(and x1 x2)");
        drop(conjunction);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_xor_multiset_condenses_before_cancellation() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let nx = !&x;
        // two copies of x cancel each other, leaving xor(not x) = not x
        let odd = pool.mk_xor_multiset(&[x.clone(), nx.clone(), x.clone()]);
        assert_eq!(odd, nx);
    }
}
