/****************************************************************************************[simp.rs]
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

//! Level 0 simplifications of the clause database.

use {
    crate::{
        callbacks::Callbacks,
        clause::{lbool, CRef, Lit, Var},
        core::{Solver, SolverV, State},
        error::Result,
        intmap::IntMapBool,
        trail::Reason,
    },
    std::mem,
};

/// What simplification does to one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simplified {
    Unchanged,
    Shrunk,
    /// Replaced by a binary clause.
    Binary,
    Removed,
}

impl SolverV {
    /// Remove `cr` if it is satisfied at level 0, otherwise drop its false
    /// literals.
    ///
    /// Frozen clauses are only removed, never shrunk: their literals
    /// are not where their watch expects them.
    fn simplify_clause(&mut self, cr: CRef) -> Simplified {
        let c = self.ca.get_ref(cr);
        if self.satisfied(c.lits()) {
            self.remove_clause(cr);
            return Simplified::Removed;
        }
        if c.learnt() && c.frozen() {
            return Simplified::Unchanged;
        }
        let (learnt, size) = (c.learnt(), c.size());
        let n_false = c.lits()[2..]
            .iter()
            .filter(|&&lit| self.vars.value_lit(lit) == lbool::FALSE)
            .count() as u32;
        if n_false == 0 {
            return Simplified::Unchanged;
        }

        if size - n_false == 2 {
            let (c0, c1) = (c[0], c[1]);
            self.remove_clause(cr);
            self.watches.add_binary(c0, c1);
            if learnt {
                self.num_learnt_binary += 1;
            } else {
                self.num_binary += 1;
            }
            return Simplified::Binary;
        }

        let vars = &self.vars;
        let mut c = self.ca.get_mut(cr);
        // watches are never false at level 0 after propagation
        let mut j = 2;
        for k in 2..size {
            let lit = c[k];
            if vars.value_lit(lit) != lbool::FALSE {
                c[j] = lit;
                j += 1;
            }
        }
        c.shrink(j);
        self.ca.free_amount(n_false);
        if learnt {
            self.learnts_literals -= n_false as u64;
        } else {
            self.clauses_literals -= n_false as u64;
        }
        Simplified::Shrunk
    }

    /// Probe clause `cr` at level 0 by asserting the negation of its
    /// literals in order. `out` receives a subset of the clause implied
    /// by the clause set; returns `true` if it is strictly smaller.
    ///
    /// The clause is detached, and left detached.
    fn vivify_clause(&mut self, cr: CRef, out: &mut Vec<Lit>) -> bool {
        debug_assert_eq!(self.vars.decision_level(), 0);
        out.clear();
        self.detach_clause(cr, true);
        let lits: Vec<Lit> = self.ca.get_ref(cr).lits().to_vec();
        for &lit in &lits {
            let value = self.vars.value_lit(lit);
            if value == lbool::TRUE {
                out.push(lit);
                break;
            } else if value == lbool::FALSE {
                continue;
            }
            out.push(lit);
            self.vars.new_decision_level();
            self.vars.unchecked_enqueue(!lit, Reason::Decision);
            if self.propagate().is_some() {
                break;
            }
        }
        self.cancel_until(0);
        out.len() < lits.len()
    }

    /// Overwrite the detached original clause `cr` with `lits`, a subset
    /// of its literals.
    fn replace_lits(&mut self, cr: CRef, lits: &[Lit]) {
        let mut c = self.ca.get_mut(cr);
        let old_size = c.size();
        let new_size = lits.len() as u32;
        for (k, &lit) in lits.iter().enumerate() {
            c[k as u32] = lit;
        }
        c.shrink(new_size);
        self.ca.free_amount(old_size - new_size);
        self.clauses_literals -= (old_size - new_size) as u64;
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Simplify the clause database according to the current top-level
    /// assignment: satisfied clauses are removed, and false literals
    /// removed from the others.
    ///
    /// Returns `false` if the clause set is found unsatisfiable. Does
    /// nothing if no literal was fixed since the last call.
    pub(crate) fn simplify_internal(&mut self) -> Result<bool> {
        debug_assert_eq!(self.v.vars.decision_level(), 0);
        if !self.v.ok || self.v.propagate().is_some() {
            self.v.ok = false;
            return Ok(false);
        }
        if self.v.vars.num_assigns() as i64 == self.v.simp_db_assigns {
            return Ok(true);
        }
        debug!(
            "simplify at {} level 0 literals",
            self.v.vars.num_assigns()
        );

        let mut learnts = mem::take(&mut self.learnts);
        let first_recent = learnts.len().saturating_sub(self.recent_learnts);
        let mut i = 0;
        let mut recent_gone = 0;
        learnts.retain(|&cr| {
            let keep = match self.v.simplify_clause(cr) {
                Simplified::Unchanged | Simplified::Shrunk => true,
                Simplified::Removed => {
                    self.v.stats.removed_learnts += 1;
                    false
                }
                Simplified::Binary => false,
            };
            if !keep && i >= first_recent {
                recent_gone += 1;
            }
            i += 1;
            keep
        });
        self.learnts = learnts;
        self.recent_learnts -= recent_gone;

        let mut clauses = mem::take(&mut self.clauses);
        clauses.retain(|&cr| match self.v.simplify_clause(cr) {
            Simplified::Unchanged => true,
            Simplified::Shrunk => {
                self.v.stats.shrunk_clauses += 1;
                true
            }
            Simplified::Removed => {
                self.v.stats.removed_clauses += 1;
                false
            }
            Simplified::Binary => {
                self.v.stats.shrunk_clauses += 1;
                false
            }
        });
        self.clauses = clauses;

        self.v.vars.rebuild_order_heap();
        self.v.simp_db_assigns = self.v.vars.num_assigns() as i64;
        self.pure_lits_stale = true;
        self.cb.on_simplify();
        self.check_garbage()?;
        Ok(true)
    }

    /// Collect the pure literals: unassigned decision variables that occur
    /// with a single polarity in the clauses (learnt ones included) and
    /// the presumptions.
    ///
    /// They are assumed after the presumptions until the end of `solve`.
    pub(crate) fn search_pure_literals(&mut self) {
        self.pure_lits_stale = false;
        self.pure_lits.clear();
        let n_vars = self.v.num_vars();
        if !self.v.opts.pure_literals || n_vars == 0 {
            return;
        }

        let mut occurs: IntMapBool<Lit> = IntMapBool::new();
        occurs.reserve(Lit::new(Var::from_idx(n_vars - 1), false));
        let ca = &self.v.ca;
        for &cr in self.clauses.iter().chain(self.learnts.iter()) {
            for &lit in ca.get_ref(cr).iter() {
                occurs.set(lit, true);
            }
        }
        // each literal of a binary clause is in the list of the other's negation
        for (_, qs) in self.v.watches.bins.iter() {
            for &q in qs {
                occurs.set(q, true);
            }
        }
        for &p in &self.presumptions {
            occurs.set(p, true);
        }

        let vars = &self.v.vars;
        for i in 0..n_vars {
            let v = Var::from_idx(i);
            if !vars.decision[v] || vars.value(v) != lbool::UNDEF {
                continue;
            }
            let pos = occurs[Lit::new(v, true)];
            let neg = occurs[Lit::new(v, false)];
            if pos != neg {
                self.pure_lits.push(Lit::new(v, pos));
            }
        }
        self.v.stats.pure_literals += self.pure_lits.len() as u64;
        debug!("pure literals: {:?}", self.pure_lits);
    }

    /// Vivify every original clause of at least `min_size` literals.
    ///
    /// Returns `false` if the clause set is found unsatisfiable.
    pub(crate) fn vivify_internal(&mut self, min_size: u32) -> Result<bool> {
        if !self.simplify_internal()? {
            return Ok(false);
        }
        let min_size = min_size.max(3);
        let clauses = mem::take(&mut self.clauses);
        let mut kept = Vec::with_capacity(clauses.len());
        let mut out = vec![];

        for cr in clauses {
            let c = self.v.ca.get_ref(cr);
            if !self.v.ok || c.size() < min_size {
                kept.push(cr);
                continue;
            }
            if self.v.satisfied(c.lits()) {
                self.v.remove_clause(cr);
                self.v.stats.removed_clauses += 1;
                continue;
            }
            if !self.v.vivify_clause(cr, &mut out) {
                self.v.attach_clause(cr);
                kept.push(cr);
                continue;
            }

            trace!("vivify {:?} into {:?}", cr, out);
            let size = self.v.ca.get_ref(cr).size();
            self.v.stats.vivified_clauses += 1;
            self.v.stats.vivified_lits += (size as usize - out.len()) as u64;
            match out.len() {
                0 => self.v.ok = false,
                1 => {
                    self.v.remove_clause(cr);
                    self.v.vars.unchecked_enqueue(out[0], Reason::Decision);
                    if self.v.propagate().is_some() {
                        self.v.ok = false;
                    }
                }
                2 => {
                    self.v.remove_clause(cr);
                    self.v.watches.add_binary(out[0], out[1]);
                    self.v.num_binary += 1;
                }
                _ => {
                    self.v.replace_lits(cr, &out);
                    self.v.attach_clause(cr);
                    kept.push(cr);
                }
            }
        }

        self.clauses = kept;
        if !self.v.ok {
            return Ok(false);
        }
        self.check_garbage()?;
        Ok(true)
    }

    /// Vivify the original clauses of at least `min_size` literals:
    /// each is shortened if the other clauses imply a subset of it.
    ///
    /// Returns `Ok(false)` if the clause set is found unsatisfiable.
    pub fn vivify(&mut self, min_size: u32) -> Result<bool> {
        let res = self.vivify_internal(min_size);
        if let Ok(false) = res {
            self.state = State::Unsat;
        }
        res
    }
}

#[cfg(test)]
mod test {
    use crate::{lbool, BasicSolver, Lit, SolverInterface, SolverOpts, State};

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    fn add(s: &mut BasicSolver, c: &[i32]) -> bool {
        let c: Vec<Lit> = c.iter().map(|&i| lit(i)).collect();
        s.add_clause(&c).unwrap()
    }

    #[test]
    fn test_simplify_removes_and_shrinks() {
        let mut s = BasicSolver::default();
        s.ensure_capacity(6);
        add(&mut s, &[1, 2, 3]);
        add(&mut s, &[-1, 4, 5, 6]);
        add(&mut s, &[-1, 2, 4]);
        assert_eq!(s.num_clauses(), 3);
        add(&mut s, &[1]);
        assert!(s.simplify().unwrap());
        // [1,2,3] satisfied, [-1,4,5,6] shrunk, [-1,2,4] now binary
        assert_eq!(s.num_clauses(), 2);
        assert_eq!(s.num_binary_clauses(), 1);
        assert_eq!(s.stats().removed_clauses, 1);
        assert_eq!(s.stats().shrunk_clauses, 2);
        assert!(s.check_invariants());
        assert_eq!(s.solve().unwrap(), State::Sat);
        assert!(s.validate());
    }

    #[test]
    fn test_pure_literals() {
        let mut s = BasicSolver::default();
        s.ensure_capacity(4);
        add(&mut s, &[1, 2, 3]);
        add(&mut s, &[1, -2, -3]);
        add(&mut s, &[-4, 2, 3]);
        s.add_presumption(lit(4)).unwrap();
        s.pure_lits_stale = true;
        s.search_pure_literals();
        // 1 only occurs positively, 4 in both polarities through the presumption
        assert_eq!(s.pure_lits, vec![lit(1)]);
        assert_eq!(s.solve().unwrap(), State::Sat);
        assert_eq!(s.value_lit(lit(1)), lbool::TRUE);
        assert_eq!(s.value_lit(lit(4)), lbool::TRUE);
        assert!(s.pure_lits.is_empty());
        // not a level 0 fact
        assert_eq!(s.value_lvl_0(lit(1)), lbool::UNDEF);
        add(&mut s, &[-1]);
        assert_eq!(s.solve().unwrap(), State::Sat);
        assert_eq!(s.value_lit(lit(1)), lbool::FALSE);
    }

    #[test]
    fn test_pure_literal_on_last_var() {
        let mut s = BasicSolver::default();
        s.ensure_capacity(3);
        add(&mut s, &[1, 2, -3]);
        add(&mut s, &[-1, -2, -3]);
        add(&mut s, &[1, -2]);
        s.search_pure_literals();
        assert_eq!(s.pure_lits, vec![lit(-3)]);
        assert_eq!(s.solve().unwrap(), State::Sat);
        assert_eq!(s.value_lit(lit(-3)), lbool::TRUE);
        assert!(s.validate());
    }

    #[test]
    fn test_vivify() {
        let mut s = BasicSolver::new(
            SolverOpts {
                pure_literals: false,
                ..SolverOpts::default()
            },
            Default::default(),
        );
        s.ensure_capacity(5);
        // 4 -> 2, so [1,2,3,4] can lose 4
        add(&mut s, &[-4, 2]);
        add(&mut s, &[1, 2, 3, 4]);
        add(&mut s, &[-2, -3, 5]);
        assert!(s.vivify(3).unwrap());
        assert_eq!(s.stats().vivified_clauses, 1);
        let long: Vec<Vec<Lit>> = s
            .clauses
            .iter()
            .map(|&cr| s.v.ca.get_ref(cr).lits().to_vec())
            .collect();
        assert!(long.contains(&vec![lit(1), lit(2), lit(3)]));
        assert!(s.check_invariants());
        assert_eq!(s.solve().unwrap(), State::Sat);
        assert!(s.validate());
    }

    #[test]
    fn test_vivify_to_unit() {
        let mut s = BasicSolver::default();
        s.ensure_capacity(4);
        // both 1 and -1 imply 2
        add(&mut s, &[-1, 2]);
        add(&mut s, &[1, 2]);
        add(&mut s, &[2, 3, 4]);
        assert!(s.vivify(3).unwrap());
        assert_eq!(s.value_lvl_0(lit(2)), lbool::TRUE);
        assert_eq!(s.value_lvl_0(lit(3)), lbool::UNDEF);
        assert!(s.is_ok());
        assert_eq!(s.num_clauses(), 2);
    }
}
