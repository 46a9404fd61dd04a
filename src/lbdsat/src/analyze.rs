/*************************************************************************************[analyze.rs]
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

use crate::{
    clause::{lbool, CRef, LSet, Lit, Var},
    core::SolverV,
    propagate::Conflict,
    trail::{Reason, VarState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub(crate) enum Seen {
    UNDEF,
    SOURCE,
    REMOVABLE,
}

impl Default for Seen {
    fn default() -> Self {
        Seen::UNDEF
    }
}

impl Seen {
    #[inline(always)]
    fn is_seen(&self) -> bool {
        *self != Seen::UNDEF
    }
}

/// Outcome of `analyze`; the literals are in the caller's buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Learnt {
    pub backtrack_lvl: u32,
    pub lbd: u32,
}

/// What the next resolution step uses.
#[derive(Debug, Clone, Copy)]
enum ResolveWith {
    Init(Conflict),
    Resolve(Lit, Reason),
}

/// Counts the distinct decision levels of a set of assigned literals,
/// stamping each level instead of clearing a set.
#[derive(Debug, Default)]
pub(crate) struct LbdCounter {
    stamps: Vec<u64>,
    now: u64,
}

impl LbdCounter {
    pub fn lbd(&mut self, vars: &VarState, lits: &[Lit]) -> u32 {
        self.now += 1;
        let mut n = 0;
        for lit in lits {
            let lvl = vars.level(lit.var()) as usize;
            if lvl >= self.stamps.len() {
                self.stamps.resize(lvl + 1, 0);
            }
            if self.stamps[lvl] != self.now {
                self.stamps[lvl] = self.now;
                n += 1;
            }
        }
        n
    }
}

impl SolverV {
    /// Analyze conflict and produce a reason clause.
    ///
    /// # Pre-conditions:
    ///
    /// - current decision level must be greater than root level.
    /// - every literal of `confl` is false, one of them at the current level.
    ///
    /// # Post-conditions:
    ///
    /// - `out_learnt[0]` is the asserting literal at level `backtrack_lvl`.
    /// - if `out_learnt.len() > 1` then `out_learnt[1]` has the greatest decision level of the
    ///   rest of literals. There may be others from the same level though.
    pub(crate) fn analyze(
        &mut self,
        confl: Conflict,
        learnts: &[CRef],
        out_learnt: &mut Vec<Lit>,
    ) -> Learnt {
        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // leave room for the UIP
        debug!("analyze.start {:?}", confl);

        let conflict_level = self.vars.decision_level();
        debug_assert!(conflict_level > 0);

        let mut cur_clause = ResolveWith::Init(confl);
        let mut path_c = 0;
        let mut index = self.vars.trail.len();

        let p = loop {
            let bin: [Lit; 2];
            let lits: &[Lit] = match cur_clause {
                ResolveWith::Init(Conflict::Binary(a, b)) => {
                    bin = [a, b];
                    &bin
                }
                ResolveWith::Init(Conflict::Clause(cr)) => {
                    self.bump_if_learnt(learnts, cr);
                    self.ca.get_ref(cr).lits()
                }
                ResolveWith::Resolve(_, Reason::Binary(other)) => {
                    bin = [other, Lit::UNDEF];
                    &bin[..1]
                }
                ResolveWith::Resolve(lit, Reason::Clause(cr)) => {
                    self.bump_if_learnt(learnts, cr);
                    let lits = self.ca.get_ref(cr).lits();
                    // `lits[0]` is `lit` itself, it can't appear in the learnt clause
                    debug_assert_eq!(lit.var(), lits[0].var());
                    &lits[1..]
                }
                ResolveWith::Resolve(lit, Reason::Decision) => {
                    unreachable!("analyze: reached a decision literal {:?}, path_c={}", lit, path_c)
                }
            };
            trace!("analyze.resolve-with {:?} (path_c: {})", lits, path_c);

            for &q in lits {
                let v = q.var();
                let lvl = self.vars.level(v);
                debug_assert!(lvl <= conflict_level);
                debug_assert_eq!(self.vars.value_lit(q), lbool::FALSE);
                if !self.seen[v].is_seen() && lvl > 0 {
                    self.vars.var_bump_activity(v);
                    self.seen[v] = Seen::SOURCE;
                    if lvl == conflict_level {
                        // at conflict level: need to eliminate this lit by resolution
                        path_c += 1;
                    } else {
                        out_learnt.push(q); // part of the learnt clause
                    }
                }
            }

            // Select next literal in the trail to look at:
            while !self.seen[self.vars.trail[index - 1].var()].is_seen() {
                index -= 1;
            }
            let p = self.vars.trail[index - 1];
            index -= 1;
            cur_clause = ResolveWith::Resolve(p, self.vars.reason(p.var()));
            self.seen[p.var()] = Seen::REMOVABLE;
            path_c -= 1;

            if path_c == 0 {
                break p;
            }
        };

        // cleanup literals flagged `REMOVABLE`
        for &q in self.vars.trail[index..].iter() {
            if self.seen[q.var()] == Seen::REMOVABLE {
                self.seen[q.var()] = Seen::UNDEF;
            }
        }

        debug_assert_eq!(self.vars.value_lit(p), lbool::TRUE);
        out_learnt[0] = !p;
        trace!("analyze-learnt: {:?} (before minimization)", &out_learnt);

        self.stats.max_literals += out_learnt.len() as u64;
        self.minimize_conflict(out_learnt);
        self.stats.tot_literals += out_learnt.len() as u64;

        // Find correct backtrack level:
        let backtrack_lvl = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            let mut max_level = self.vars.level(out_learnt[1].var());
            // Find the first literal assigned at the next-highest level:
            for i in 2..out_learnt.len() {
                let level = self.vars.level(out_learnt[i].var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            // Swap-in this literal at index 1:
            out_learnt.swap(max_i, 1);
            max_level
        };

        for &lit in &self.analyze_toclear {
            self.seen[lit.var()] = Seen::UNDEF; // (`seen[]` is now cleared)
        }

        let lbd = self.lbd.lbd(&self.vars, out_learnt);
        debug!(
            "analyze.learnt {:?} (lbd {}, backtrack to {})",
            out_learnt, lbd, backtrack_lvl
        );
        Learnt { backtrack_lvl, lbd }
    }

    fn bump_if_learnt(&mut self, learnts: &[CRef], cr: CRef) {
        if self.ca.get_ref(cr).learnt() {
            self.cla_bump_activity(learnts, cr);
        }
    }

    /// An abstraction of the level of a variable
    #[inline]
    fn abstract_level(&self, v: Var) -> u32 {
        1 << (self.vars.level(v) & 31)
    }

    fn minimize_conflict(&mut self, out_learnt: &mut Vec<Lit>) {
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(out_learnt);

        let new_size = match self.opts.ccmin_mode {
            2 => {
                let mut abstract_levels = 0;
                for a in out_learnt[1..].iter() {
                    abstract_levels |= self.abstract_level(a.var())
                }

                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let lit = out_learnt[i];
                    // can eliminate `lit` only if it's redundant *and* not a decision
                    if self.vars.reason(lit.var()) == Reason::Decision
                        || !self.lit_redundant(lit, abstract_levels)
                    {
                        out_learnt[j] = lit;
                        j += 1;
                    }
                }
                j
            }
            1 => {
                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let lit = out_learnt[i];
                    let retain = match self.vars.reason(lit.var()) {
                        Reason::Decision => true,
                        Reason::Binary(other) => self.needed_for_removal(&[other]),
                        Reason::Clause(cr) => {
                            self.needed_for_removal(&self.ca.get_ref(cr).lits()[1..])
                        }
                    };
                    if retain {
                        out_learnt[j] = lit;
                        j += 1;
                    }
                }
                j
            }
            _ => out_learnt.len(),
        };

        debug_assert!(new_size <= out_learnt.len());
        out_learnt.truncate(new_size);
    }

    /// Does the reason `lits` contain a literal that isn't in the learnt
    /// clause and isn't fixed at level 0?
    fn needed_for_removal(&self, lits: &[Lit]) -> bool {
        lits.iter().any(|l| {
            let v = l.var();
            !self.seen[v].is_seen() && self.vars.level(v) > 0
        })
    }

    /// Check if `p` can be removed from a conflict clause `C`.
    ///
    /// It can be removed from `C` if it is propagation-implied
    /// by literals of level 0 exclusively or if `C x p.reason` subsumes `C`.
    fn lit_redundant(&mut self, p: Lit, abstract_levels: u32) -> bool {
        self.minimize_stack.clear();
        self.minimize_stack.push(p);

        let top = self.analyze_toclear.len();

        while let Some(q) = self.minimize_stack.pop() {
            let bin;
            let lits: &[Lit] = match self.vars.reason(q.var()) {
                Reason::Clause(cr) => &self.ca.get_ref(cr).lits()[1..],
                Reason::Binary(other) => {
                    bin = [other];
                    &bin
                }
                Reason::Decision => unreachable!("lit_redundant: {:?} is a decision", q),
            };

            for &l in lits {
                let v = l.var();
                // Variable at level 0 or previously removable: just skip
                if self.vars.level(v) == 0 || self.seen[v] == Seen::SOURCE {
                    continue;
                }

                if self.vars.reason(v) != Reason::Decision
                    && (self.abstract_level(v) & abstract_levels) != 0
                {
                    // keep exploring, `l` may be implied by the learnt clause
                    self.seen[v] = Seen::SOURCE;
                    self.minimize_stack.push(l);
                    self.analyze_toclear.push(l);
                } else {
                    // cannot remove `l`, cancel
                    for a in self.analyze_toclear[top..].iter() {
                        self.seen[a.var()] = Seen::UNDEF;
                    }
                    self.analyze_toclear.truncate(top);
                    return false;
                }
            }
        }

        true
    }

    /// Express the final conflict in terms of presumptions.
    ///
    /// `p` is the negation of a presumption that is false; `out_conflict`
    /// receives `p` and the negations of the presumptions that led to it.
    pub(crate) fn analyze_final(&mut self, p: Lit, out_conflict: &mut LSet) {
        out_conflict.clear();
        out_conflict.insert(p);
        debug!("analyze_final lit={:?}", p);

        if self.vars.decision_level() == 0 {
            return; // no presumptions
        }

        self.seen[p.var()] = Seen::SOURCE;

        let start = self.vars.trail_lim[0] as usize;
        for i in (start..self.vars.trail.len()).rev() {
            let lit = self.vars.trail[i];
            let x = lit.var();
            if !self.seen[x].is_seen() {
                continue;
            }
            match self.vars.reason(x) {
                Reason::Decision => {
                    debug_assert!(self.vars.level(x) > 0);
                    out_conflict.insert(!lit);
                }
                Reason::Binary(other) => {
                    if self.vars.level(other.var()) > 0 {
                        self.seen[other.var()] = Seen::SOURCE;
                    }
                }
                Reason::Clause(cr) => {
                    let c = self.ca.get_ref(cr);
                    for &q in &c.lits()[1..] {
                        if self.vars.level(q.var()) > 0 {
                            self.seen[q.var()] = Seen::SOURCE;
                        }
                    }
                }
            }
            self.seen[x] = Seen::UNDEF;
        }

        self.seen[p.var()] = Seen::UNDEF;
        debug_assert!(self.seen.iter().all(|(_, &s)| s == Seen::UNDEF));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lbd_counter() {
        let mut vars = VarState::new(0.95, 2);
        for i in 0..4 {
            vars.init_var(Var::from_idx(i), false);
        }
        let lits: Vec<Lit> = (0..4).map(|i| Lit::new(Var::from_idx(i), true)).collect();
        vars.unchecked_enqueue(lits[0], Reason::Decision);
        vars.new_decision_level();
        vars.unchecked_enqueue(lits[1], Reason::Decision);
        vars.unchecked_enqueue(lits[2], Reason::Binary(!lits[1]));
        vars.new_decision_level();
        vars.unchecked_enqueue(lits[3], Reason::Decision);

        let mut counter = LbdCounter::default();
        assert_eq!(counter.lbd(&vars, &lits), 3);
        assert_eq!(counter.lbd(&vars, &lits[1..3]), 1);
        assert_eq!(counter.lbd(&vars, &[lits[3], lits[0]]), 2);
    }
}
