/*************************************************************************************[watches.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::{
        clause::{CRef, ClauseAllocator, LMap, Lit},
        intmap::{AsIndex, IntMap, IntMapBool},
    },
    std::{mem, ops},
};

/// Entry of a watch list: the clause, plus a literal of it whose truth
/// lets propagation skip the clause without touching the arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Watcher {
    pub cref: CRef,
    pub blocker: Lit,
}

impl Watcher {
    #[inline(always)]
    pub fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

/// Predicate that decides whether a value `V` is deleted or not
pub(crate) trait DeletePred<V> {
    fn deleted(&self, v: &V) -> bool;
}

/// A two-watch entry is stale once its clause is removed or frozen.
pub(crate) struct WatcherDeleted<'a> {
    pub ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        let c = self.ca.get_ref(w.cref);
        c.mark() == 1 || c.frozen()
    }
}

#[derive(Debug, Clone)]
/// List of occurrences of objects of type `K` (e.g. literals) in values
/// of type `V` (e.g. clauses), with lazy removal.
pub(crate) struct OccListsData<K: AsIndex, V> {
    occs: IntMap<K, Vec<V>>,
    dirty: IntMapBool<K>,
    dirties: Vec<K>, // to know what keys to examine in `clean_all_pred`
}

impl<K: AsIndex, V> OccListsData<K, V> {
    pub fn new() -> Self {
        Self {
            occs: IntMap::new(),
            dirty: IntMapBool::new(),
            dirties: Vec::new(),
        }
    }

    /// Initialize occurrence list for the given `idx`
    pub fn init(&mut self, idx: K) {
        self.occs.reserve_default(idx);
        self.occs[idx].clear();
        self.dirty.reserve(idx);
    }

    /// Up-to-date list of occurrences for `idx`, cleaned with `pred` if dirty.
    pub fn lookup_mut_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) -> &mut Vec<V> {
        if self.dirty[idx] {
            self.clean_pred(idx, pred);
        }
        &mut self.occs[idx]
    }

    /// Cleanup every entry marked as dirty
    pub fn clean_all_pred<P: DeletePred<V>>(&mut self, pred: &P) {
        for &x in &self.dirties {
            // `dirties` may contain duplicates
            if self.dirty[x] {
                self.occs[x].retain(|v| !pred.deleted(v));
                self.dirty.set(x, false);
            }
        }
        self.dirties.clear();
    }

    pub fn clean_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) {
        self.occs[idx].retain(|v| !pred.deleted(v));
        self.dirty.set(idx, false);
    }

    /// Mark `idx` as dirty, so it can be cleaned up later
    pub fn smudge(&mut self, idx: K) {
        if !self.dirty[idx] {
            self.dirty.set(idx, true);
            self.dirties.push(idx);
        }
    }

    pub fn is_dirty(&self, idx: K) -> bool {
        self.dirty[idx]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut Vec<V>)> {
        self.occs.iter_mut()
    }

    pub fn memory_footprint(&self) -> usize {
        let lists: usize = self
            .occs
            .iter()
            .map(|(_, l)| l.capacity() * mem::size_of::<V>())
            .sum();
        lists + self.occs.memory_footprint() + self.dirty.memory_footprint()
    }
}

impl<K: AsIndex, V> ops::Index<K> for OccListsData<K, V> {
    type Output = Vec<V>;
    fn index(&self, index: K) -> &Self::Output {
        &self.occs[index]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for OccListsData<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.occs[index]
    }
}

/// Every watch structure, indexed by the literal whose *truth* triggers
/// a visit (i.e. the negation of the watched literal).
///
/// - `clauses[p]`: attached clauses of size >= 3 watching `!p`.
/// - `bins[p]`: for each binary clause `(!p \/ q)`, the literal `q`.
/// - `mono[p]`: frozen learnt clauses whose single watch is `!p`.
#[derive(Debug)]
pub(crate) struct Watches {
    pub clauses: OccListsData<Lit, Watcher>,
    pub bins: LMap<Vec<Lit>>,
    pub mono: LMap<Vec<Watcher>>,
}

impl Watches {
    pub fn new() -> Self {
        Watches {
            clauses: OccListsData::new(),
            bins: LMap::new(),
            mono: LMap::new(),
        }
    }

    /// Prepare the lists of both literals of a new variable.
    pub fn init_lit(&mut self, p: Lit) {
        self.clauses.init(p);
        self.bins.reserve_default(p);
        self.mono.reserve_default(p);
        self.bins[p].clear();
        self.mono[p].clear();
    }

    /// Record the binary clause `a \/ b`.
    pub fn add_binary(&mut self, a: Lit, b: Lit) {
        debug_assert_ne!(a.var(), b.var());
        self.bins[!a].push(b);
        self.bins[!b].push(a);
    }

    /// Watch clause `cr` on `c0` and `c1`, its first two literals.
    pub fn watch(&mut self, cr: CRef, c0: Lit, c1: Lit) {
        self.clauses[!c0].push(Watcher::new(cr, c1));
        self.clauses[!c1].push(Watcher::new(cr, c0));
    }

    /// Stop watching `cr`; `strict` removes the entries now, otherwise
    /// both lists are only marked dirty.
    pub fn unwatch(&mut self, cr: CRef, c0: Lit, c1: Lit, strict: bool) {
        if strict {
            for &(p, other) in &[(!c0, c1), (!c1, c0)] {
                let ws = &mut self.clauses[p];
                if let Some(pos) = ws.iter().position(|w| w == &Watcher::new(cr, other)) {
                    ws.remove(pos);
                } else {
                    debug_assert!(false, "watcher of {:?} not found in list of {:?}", cr, p);
                }
            }
        } else {
            self.clauses.smudge(!c0);
            self.clauses.smudge(!c1);
        }
    }

    /// Single-watch a frozen clause on `watch`.
    pub fn watch_mono(&mut self, cr: CRef, watch: Lit, blocker: Lit) {
        self.mono[!watch].push(Watcher::new(cr, blocker));
    }

    pub fn clear_mono(&mut self) {
        for ms in self.mono.values_mut() {
            ms.clear();
        }
    }

    pub fn memory_footprint(&self) -> usize {
        let bins: usize = self.bins.iter().map(|(_, b)| b.capacity()).sum();
        let mono: usize = self.mono.iter().map(|(_, m)| m.capacity()).sum();
        self.clauses.memory_footprint()
            + bins * mem::size_of::<Lit>()
            + mono * mem::size_of::<Watcher>()
            + self.bins.memory_footprint()
            + self.mono.memory_footprint()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clause::Var;

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    fn watches_for(n: u32) -> Watches {
        let mut w = Watches::new();
        for v in 0..n {
            w.init_lit(Lit::new(Var::from_idx(v), true));
            w.init_lit(Lit::new(Var::from_idx(v), false));
        }
        w
    }

    #[test]
    fn test_binary_adjacency() {
        let mut w = watches_for(3);
        w.add_binary(lit(1), lit(-2));
        // `-1` true forces `-2`, `2` true forces `1`
        assert_eq!(w.bins[lit(-1)], vec![lit(-2)]);
        assert_eq!(w.bins[lit(2)], vec![lit(1)]);
        assert!(w.bins[lit(1)].is_empty());
    }

    #[test]
    fn test_lazy_unwatch() {
        let mut ca = ClauseAllocator::with_start_cap(32, 1000);
        let mut w = watches_for(4);
        let c1 = ca
            .alloc_with_learnt(&[lit(1), lit(2), lit(3)], false)
            .unwrap();
        let c2 = ca
            .alloc_with_learnt(&[lit(1), lit(-2), lit(4)], false)
            .unwrap();
        w.watch(c1, lit(1), lit(2));
        w.watch(c2, lit(1), lit(-2));
        assert_eq!(w.clauses[lit(-1)].len(), 2);

        w.unwatch(c1, lit(1), lit(2), false);
        ca.get_mut(c1).set_mark(1);
        assert!(w.clauses.is_dirty(lit(-1)));
        let ws = w
            .clauses
            .lookup_mut_pred(lit(-1), &WatcherDeleted { ca: &ca });
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].cref, c2);
        w.clauses.clean_all_pred(&WatcherDeleted { ca: &ca });
        assert!(w.clauses[lit(-2)].is_empty());
        assert!(!w.clauses.is_dirty(lit(-2)));
    }

    #[test]
    fn test_strict_unwatch() {
        let mut ca = ClauseAllocator::with_start_cap(32, 1000);
        let mut w = watches_for(3);
        let c = ca
            .alloc_with_learnt(&[lit(1), lit(2), lit(3)], false)
            .unwrap();
        w.watch(c, lit(1), lit(2));
        w.unwatch(c, lit(1), lit(2), true);
        assert!(w.clauses[lit(-1)].is_empty());
        assert!(w.clauses[lit(-2)].is_empty());
    }
}
