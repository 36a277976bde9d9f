//! Pool introspection: iteration over live nodes and a readable dump.

use std::collections::HashMap;
use std::fmt::Write;

use crate::atom::Atom;
use crate::formula::Formula;
use crate::pool::{FormulaPool, RenderSlot};

impl<A: Atom> FormulaPool<A> {
    /// Handles to every live node, negations included, ordered by id.
    ///
    /// Materializing handles up front keeps the visited nodes alive for the
    /// whole iteration, even when a callback drops its own references
    /// mid-way, and leaves the pool free for further construction while
    /// iterating.
    pub fn live_handles(&self) -> Vec<Formula<'_, A>> {
        let mut state = self.state.lock();
        let mut slots = state.arena.indexed_slots();
        slots.sort_by_key(|&slot| state.content(slot).id);
        let mut handles = Vec::with_capacity(slots.len() * 2);
        for slot in slots {
            let negation = state.content(slot).negation;
            handles.push(self.wrap(&mut state, slot));
            handles.push(self.wrap(&mut state, negation));
        }
        handles
    }

    /// Apply `f` to every live node, each orientation exactly once.
    pub fn forall_do<'p, F>(&'p self, mut f: F)
    where
        F: FnMut(&Formula<'p, A>),
    {
        for handle in &self.live_handles() {
            f(handle);
        }
    }

    /// Collect `f` over every live node into a map keyed by the node.
    pub fn forall_map<'p, R, F>(&'p self, mut f: F) -> HashMap<Formula<'p, A>, R>
    where
        F: FnMut(&Formula<'p, A>) -> R,
    {
        self.live_handles()
            .into_iter()
            .map(|handle| {
                let value = f(&handle);
                (handle, value)
            })
            .collect()
    }

    /// Render the pool's contents, Tseitin associations included.
    pub fn dump(&self) -> String {
        let state = self.state.lock();
        let mut slots = state.arena.indexed_slots();
        slots.sort_by_key(|&slot| state.content(slot).id);
        let mut out = String::new();
        writeln!(out, "Formula pool contains:").unwrap();
        for slot in slots {
            let content = state.content(slot);
            writeln!(
                out,
                "  id {} at slot {} [usages = {}]: {}, negation at slot {}",
                content.id,
                slot,
                content.usages,
                RenderSlot { state: &*state, slot },
                content.negation
            )
            .unwrap();
        }
        writeln!(out, "Tseitin variables:").unwrap();
        let mut associations: Vec<_> = state.tseitin_vars.iter().map(|(&f, &v)| (f, v)).collect();
        associations.sort_by_key(|&(formula_slot, _)| state.content(formula_slot).id);
        for (formula_slot, var_slot) in associations {
            writeln!(
                out,
                "  {} substituted by {}",
                RenderSlot { state: &*state, slot: formula_slot },
                RenderSlot { state: &*state, slot: var_slot }
            )
            .unwrap();
        }
        writeln!(
            out,
            "{} entries, {} slots in use, high water at slot {}",
            state.arena.index_size(),
            state.arena.real_size(),
            state.arena.last_index()
        )
        .unwrap();
        out
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
    fn test_forall_do_visits_each_orientation_once() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let _f = pool.mk_and(&[x.clone(), y.clone()]);
        let mut ids = Vec::new();
        pool.forall_do(|handle| ids.push(handle.id()));
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_forall_do_tolerates_drops_in_callback() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let mut count = 0;
        pool.forall_do(|handle| {
            let copy = handle.clone();
            drop(copy);
            count += 1;
        });
        assert_eq!(count, 4);
        drop(x);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_forall_map_keys_by_node() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let map = pool.forall_map(|handle| handle.to_string());
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(&x).map(String::as_str), Some("x1"));
        assert_eq!(map.get(&!&x).map(String::as_str), Some("(not x1)"));
        assert_eq!(map.get(&pool.mk_true()).map(String::as_str), Some("true"));
    }

    #[test]
    fn test_live_handles_keep_nodes_alive() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let y = pool.var(Variable::new(2));
        let f = pool.mk_and(&[x.clone(), y.clone()]);
        let handles = pool.live_handles();
        assert_eq!(handles.len(), 8);
        drop(f);
        assert_eq!(pool.size(), 4);
        drop(handles);
        assert_eq!(pool.size(), 3);
    }

    #[test]
    fn test_dump_format() {
        let pool = pool();
        let x = pool.var(Variable::new(1));
        let f = pool.mk_and(&[x.clone(), pool.var(Variable::new(2))]);
        let _v = pool.create_tseitin_var(&f);
        let dump = pool.dump();
        assert!(dump.contains("Formula pool contains:"), "{}", dump);
        assert!(dump.contains("(and x1 x2)"), "{}", dump);
        assert!(dump.contains("Tseitin variables:"), "{}", dump);
        assert!(dump.contains("(and x1 x2) substituted by x3"), "{}", dump);
        // singletons, two leaves, the gate and its substitute
        assert!(dump.contains("5 entries, 10 slots in use"), "{}", dump);
    }
}
