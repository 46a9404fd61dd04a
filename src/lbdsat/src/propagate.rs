/***********************************************************************************[propagate.rs]
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
        clause::{lbool, CRef, Lit},
        core::SolverV,
        trail::Reason,
        watches::{Watcher, WatcherDeleted},
    },
    std::mem,
};

/// A clause whose literals are all false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conflict {
    Binary(Lit, Lit),
    Clause(CRef),
}

impl SolverV {
    /// Propagates all enqueued facts.
    ///
    /// Each literal goes through its binary list, then its two-watch
    /// list, then its mono-watch list. If a conflict arises, the
    /// conflicting clause is returned, otherwise `None`.
    ///
    /// # Post-conditions:
    ///
    /// - the propagation queue is empty, even if there was a conflict.
    pub(crate) fn propagate(&mut self) -> Option<Conflict> {
        let mut confl = None;
        let mut num_props: u64 = 0;

        while confl.is_none() && self.qhead < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            num_props += 1;

            confl = self.propagate_binary(p);
            if confl.is_none() {
                confl = self.propagate_watched(p);
            }
            if confl.is_none() {
                confl = self.propagate_mono(p);
            }
        }
        if confl.is_some() {
            self.qhead = self.vars.trail.len();
        }

        self.stats.propagations += num_props;
        confl
    }

    fn propagate_binary(&mut self, p: Lit) -> Option<Conflict> {
        let vars = &mut self.vars;
        for &q in self.watches.bins[p].iter() {
            let v = vars.value_lit(q);
            if v == lbool::FALSE {
                return Some(Conflict::Binary(q, !p));
            } else if v == lbool::UNDEF {
                vars.unchecked_enqueue(q, Reason::Binary(!p));
            }
        }
        None
    }

    fn propagate_watched(&mut self, p: Lit) -> Option<Conflict> {
        if self.watches.clauses.is_dirty(p) {
            self.watches
                .clauses
                .clean_pred(p, &WatcherDeleted { ca: &self.ca });
        }
        // `!c[1] != p` for every new watch, so nothing is pushed to `ws` meanwhile
        let mut ws = mem::take(&mut self.watches.clauses[p]);
        let false_lit = !p;
        let mut confl = None;
        let mut i: usize = 0;
        let mut j: usize = 0;
        let end: usize = ws.len();

        'clauses: while i < end {
            // Try to avoid inspecting the clause:
            let blocker = ws[i].blocker;
            if self.vars.value_lit(blocker) == lbool::TRUE {
                ws[j] = ws[i];
                j += 1;
                i += 1;
                continue;
            }

            // Make sure the false literal is data[1]:
            let cr = ws[i].cref;
            let mut c = self.ca.get_mut(cr);
            if c[0] == false_lit {
                c.swap(0, 1);
            }
            debug_assert_eq!(c[1], false_lit);
            i += 1;

            // If 0th watch is true, then clause is already satisfied.
            let first = c[0];
            let w = Watcher::new(cr, first);
            if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                ws[j] = w;
                j += 1;
                continue;
            }

            // Look for new watch:
            for k in 2..c.size() {
                if self.vars.value_lit(c[k]) != lbool::FALSE {
                    c.swap(1, k);
                    self.watches.clauses[!c[1]].push(w);
                    continue 'clauses;
                }
            }

            // Did not find watch -- clause is unit under assignment:
            ws[j] = w;
            j += 1;
            if self.vars.value_lit(first) == lbool::FALSE {
                trace!("propagate.conflict {:?}", cr);
                confl = Some(Conflict::Clause(cr));
                // Copy the remaining watches:
                while i < end {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                }
            } else {
                let learnt = c.learnt();
                self.vars.unchecked_enqueue(first, Reason::Clause(cr));
                if learnt {
                    self.refresh_lbd(cr);
                }
            }
        }
        ws.truncate(j);
        self.watches.clauses[p] = ws;
        confl
    }

    /// A learnt clause just propagated: lower its LBD if the levels it
    /// spans now are fewer.
    fn refresh_lbd(&mut self, cr: CRef) {
        let c = self.ca.get_ref(cr);
        let old = c.lbd();
        if old <= 3 {
            return;
        }
        let lbd = self.lbd.lbd(&self.vars, c.lits());
        if lbd < old {
            self.ca.get_mut(cr).set_lbd(lbd);
            self.lbd_values[old as usize] -= 1;
            self.record_lbd(lbd);
            self.stats.lbd_updates += 1;
        }
    }

    /// Visit the frozen clauses watching `!p`.
    ///
    /// A frozen clause never propagates: its single watch moves to any
    /// non-false literal, and once none is left the clause is put back
    /// into the two-watch scheme and reported as a conflict.
    fn propagate_mono(&mut self, p: Lit) -> Option<Conflict> {
        if self.watches.mono[p].is_empty() {
            return None;
        }
        let false_lit = !p;
        let mut ms = mem::take(&mut self.watches.mono[p]);
        let mut confl = None;
        let mut i = 0;

        while i < ms.len() {
            let Watcher { cref: cr, blocker } = ms[i];
            i += 1;
            let c = self.ca.get_ref(cr);
            if c.mark() == 1 || !c.frozen() {
                continue; // stale entry
            }
            if blocker != false_lit && self.vars.value_lit(blocker) != lbool::FALSE {
                self.watches.mono[!blocker].push(Watcher::new(cr, false_lit));
                continue;
            }
            let found = {
                let vars = &self.vars;
                c.iter().copied().find(|&q| vars.value_lit(q) != lbool::FALSE)
            };
            match found {
                Some(q) => {
                    debug_assert_ne!(!q, p);
                    self.watches.mono[!q].push(Watcher::new(cr, false_lit));
                }
                None => {
                    trace!("propagate.mono-conflict {:?}", cr);
                    self.thaw_falsified(cr);
                    confl = Some(Conflict::Clause(cr));
                    break;
                }
            }
        }

        if confl.is_some() {
            // entries after the conflicting one were not visited
            ms.drain(..i);
        } else {
            ms.clear();
        }
        debug_assert!(self.watches.mono[p].is_empty());
        self.watches.mono[p] = ms;
        confl
    }

    /// Reattach the frozen clause `cr`, all of whose literals are false,
    /// watching its two literals of highest level.
    fn thaw_falsified(&mut self, cr: CRef) {
        let vars = &self.vars;
        let mut c = self.ca.get_mut(cr);
        for k in 0..2 {
            let mut best = k;
            for m in (k + 1)..c.size() {
                if vars.level(c[m].var()) > vars.level(c[best].var()) {
                    best = m;
                }
            }
            c.swap(k, best);
        }
        c.set_frozen(false);
        let (c0, c1) = (c[0], c[1]);
        self.watches.watch(cr, c0, c1);
        self.num_frozen -= 1;
        self.stats.thawed += 1;
    }
}
