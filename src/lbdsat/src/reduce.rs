/**************************************************************************************[reduce.rs]
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

//! Restart and reduce policy, learnt clause reduction, and compaction of
//! the clause arena.

use crate::{
    callbacks::Callbacks,
    clause::{lbool, CRef, ClauseAllocator},
    core::{RestartPolicy, Solver, SolverOpts, SolverV},
    error::Result,
    mean::{Mean, SlidingMean},
    trail::{Reason, VarData},
    watches::WatcherDeleted,
};

/// When to restart and when to reduce.
#[derive(Debug, Clone)]
pub(crate) struct Policy {
    /// A restart is due at the next conflict-free step.
    pub restart_pending: bool,
    /// LBD of the recent learnt clauses.
    pub lbd_window: SlidingMean,
    /// Trail size at the recent conflicts.
    pub trail_window: SlidingMean,
    /// LBD of every learnt clause so far.
    pub lbd_mean: Mean,
    pub conflicts_before_reduce: u64,
    reduce_limit: u64,
    /// Smallest phase deviation seen so far, capped by the option.
    min_deviation: f64,
}

impl Policy {
    pub fn new(opts: &SolverOpts) -> Self {
        Policy {
            restart_pending: false,
            lbd_window: SlidingMean::new(opts.lbd_window),
            trail_window: SlidingMean::new(opts.trail_window),
            lbd_mean: Mean::default(),
            conflicts_before_reduce: opts.reduce_first,
            reduce_limit: opts.reduce_first,
            min_deviation: opts.min_deviation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    Freeze,
    Remove,
}

impl SolverV {
    /// Update the policy after learning a clause of LBD `lbd` from a
    /// conflict with `trail_len` assigned literals.
    pub(crate) fn on_conflict(&mut self, lbd: u32, trail_len: usize) {
        let opts = &self.opts;
        let p = &mut self.policy;
        p.lbd_mean.add(lbd as f64);
        p.conflicts_before_reduce = p.conflicts_before_reduce.saturating_sub(1);

        match opts.restarts {
            RestartPolicy::Adaptive => {
                // a long trail means we may be close to a model
                p.trail_window.add(trail_len as f64);
                if self.stats.conflicts > opts.blocking_after
                    && p.lbd_window.is_full()
                    && trail_len as f64 > opts.trail_factor * p.trail_window.mean()
                {
                    p.lbd_window.clear();
                    self.stats.blocked_restarts += 1;
                    trace!("restart.blocked at trail {}", trail_len);
                }
                p.lbd_window.add(lbd as f64);
                if p.lbd_window.is_full()
                    && p.lbd_window.mean() * opts.lbd_factor > p.lbd_mean.mean()
                {
                    p.restart_pending = true;
                }
            }
            RestartPolicy::EveryConflict => p.restart_pending = true,
            RestartPolicy::Never => {}
        }
    }

    #[inline]
    pub(crate) fn reduce_due(&self) -> bool {
        self.opts.reduce && self.policy.conflicts_before_reduce == 0
    }

    /// Smallest LBD reaching half of the learnt clauses, plus 2.
    fn lbd_median(&self) -> u32 {
        let half = self.num_learnts / 2;
        let mut sum = 0;
        let mut median = 0;
        while median + 1 < self.lbd_values.len() && sum + self.lbd_values[median + 1] < half {
            sum += self.lbd_values[median];
            median += 1;
        }
        median as u32 + 2
    }

    /// Fraction of the variables assigned since the last reduction whose
    /// saved phase moved.
    fn phase_deviation(&mut self) -> f64 {
        let hamming = self.vars.phase_hamming_distance();
        let seen = self.vars.vars_seen;
        self.vars.vars_seen = 0;
        self.vars.reduce_epoch = self.vars.reduce_epoch.wrapping_add(1);

        let p = &mut self.policy;
        let mut deviation = if seen == 0 {
            p.min_deviation
        } else {
            hamming as f64 / seen as f64
        };
        if deviation > p.min_deviation {
            deviation = p.min_deviation;
        } else {
            p.min_deviation = deviation;
        }
        if deviation < 0.01 {
            0.1
        } else {
            deviation
        }
    }

    /// Decide the fate of learnt clause `cr` during a reduction at level 0.
    ///
    /// A clause with many literals agreeing with the saved phase is far
    /// from being falsified, and unlikely to be useful soon.
    fn reduce_verdict(&mut self, cr: CRef, worse_half: bool, median: u32, deviation: f64) -> Verdict {
        if self.locked(cr) {
            return Verdict::Keep;
        }
        let vars = &self.vars;
        let c = self.ca.get_ref(cr);
        let lbd = c.lbd();
        if worse_half && lbd > median {
            return Verdict::Remove;
        }
        if c.iter().any(|&lit| vars.value_lit(lit) == lbool::TRUE) {
            return Verdict::Remove; // proven at level 0
        }
        if lbd < 3 {
            return Verdict::Keep;
        }

        let max_useful = (c.size() as f64 * deviation) as u32;
        let true_lits = c
            .iter()
            .filter(|&&lit| vars.polarity[lit.var()] == lit.sign())
            .count() as u32;
        if true_lits <= max_useful {
            return Verdict::Keep;
        }
        let count = c.freeze_count() + 1;
        if count > self.opts.max_freeze {
            return Verdict::Remove;
        }
        self.ca.get_mut(cr).set_freeze_count(count);
        Verdict::Freeze
    }

    fn freeze_clause(&mut self, cr: CRef) {
        self.detach_clause(cr, false);
        self.ca.get_mut(cr).set_frozen(true);
        self.num_frozen += 1;
        self.stats.frozen += 1;
    }

    /// Put a frozen clause back into the two-watch scheme, at level 0.
    ///
    /// If only one literal is not false, it is propagated.
    fn thaw_clause(&mut self, cr: CRef) {
        let vars = &self.vars;
        let mut c = self.ca.get_mut(cr);
        let mut k = 0;
        for m in 0..c.size() {
            if vars.value_lit(c[m]) != lbool::FALSE {
                c.swap(k, m);
                k += 1;
                if k == 2 {
                    break;
                }
            }
        }
        debug_assert!(k > 0, "frozen clause {:?} is falsified", cr);
        c.set_frozen(false);
        let (c0, c1) = (c[0], c[1]);
        self.watches.watch(cr, c0, c1);
        self.num_frozen -= 1;
        self.stats.thawed += 1;
        if k == 1 && self.vars.value_lit(c0) == lbool::UNDEF {
            self.vars.unchecked_enqueue(c0, Reason::Clause(cr));
        }
    }

    /// Watch each frozen clause of `learnts` on one of its non-false literals.
    fn rebuild_mono(&mut self, learnts: &[CRef]) {
        self.watches.clear_mono();
        for &cr in learnts {
            let c = self.ca.get_ref(cr);
            if !c.frozen() {
                continue;
            }
            let vars = &self.vars;
            let k = c
                .iter()
                .position(|&lit| vars.value_lit(lit) != lbool::FALSE)
                .unwrap_or(0) as u32;
            let blocker = if k == 0 { c[1] } else { c[0] };
            self.watches.watch_mono(cr, c[k], blocker);
        }
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Remove, freeze or thaw learnt clauses.
    ///
    /// Learnt clauses are ranked by LBD then activity. The worse half
    /// loses its clauses above the median LBD, clauses satisfied at level 0
    /// go away, and clauses far from the saved phase are frozen.
    ///
    /// Clauses learnt since the previous reduction are left alone.
    pub(crate) fn reduce_db(&mut self) -> Result<()> {
        debug_assert_eq!(self.v.vars.decision_level(), 0);
        let before = self.learnts.len();
        let first_recent = before.saturating_sub(self.recent_learnts);
        let recent = self.learnts.split_off(first_recent);
        self.recent_learnts = 0;
        let v = &mut self.v;
        v.stats.reduces += 1;
        let median = v.lbd_median();
        let deviation = v.phase_deviation();

        {
            let ca = &v.ca;
            self.learnts.sort_unstable_by(|&x, &y| {
                let (cx, cy) = (ca.get_ref(x), ca.get_ref(y));
                cx.lbd()
                    .cmp(&cy.lbd())
                    .then_with(|| cy.activity().total_cmp(&cx.activity()))
            });
        }

        let half = self.learnts.len() / 2;
        let mut to_thaw = vec![];
        let mut j = 0;
        for i in 0..self.learnts.len() {
            let cr = self.learnts[i];
            let frozen = v.ca.get_ref(cr).frozen();
            match v.reduce_verdict(cr, i >= half, median, deviation) {
                Verdict::Remove => {
                    v.remove_clause(cr);
                    v.stats.removed_learnts += 1;
                    continue;
                }
                Verdict::Freeze => {
                    if !frozen {
                        v.freeze_clause(cr);
                    }
                }
                Verdict::Keep => {
                    if frozen {
                        to_thaw.push(cr);
                    }
                }
            }
            self.learnts[j] = cr;
            j += 1;
        }
        self.learnts.truncate(j);
        self.learnts.extend(recent);

        v.watches.clauses.clean_all_pred(&WatcherDeleted { ca: &v.ca });
        for cr in to_thaw {
            v.thaw_clause(cr);
        }
        v.rebuild_mono(&self.learnts);

        let p = &mut v.policy;
        p.reduce_limit += v.opts.reduce_increment;
        p.conflicts_before_reduce = p.reduce_limit;

        info!(
            "reduce.done #{}: {} -> {} learnts ({} frozen, median lbd {}, deviation {:.3})",
            v.stats.reduces,
            before,
            self.learnts.len(),
            v.num_frozen,
            median,
            deviation
        );
        self.cb.on_reduce(before, self.learnts.len());
        self.report_progress();
        self.check_garbage()
    }

    /// Compact the arena if too much of it is wasted.
    pub(crate) fn check_garbage(&mut self) -> Result<()> {
        let ca = &self.v.ca;
        if ca.wasted() as f64 > ca.len() as f64 * self.v.opts.garbage_frac {
            self.garbage_collect()?;
        }
        Ok(())
    }

    /// Move every live clause into a fresh arena.
    ///
    /// The new arena is reserved up front, so that once relocation starts
    /// it cannot fail halfway.
    pub(crate) fn garbage_collect(&mut self) -> Result<()> {
        let mut to = self.v.ca.for_compaction()?;
        let old_size = self.v.ca.len() as usize * ClauseAllocator::WORD_SIZE;
        self.reloc_all(&mut to)?;
        let new_size = to.len() as usize * ClauseAllocator::WORD_SIZE;
        info!("gc.done {} -> {} bytes", old_size, new_size);
        self.v.ca = to;
        self.v.stats.compactions += 1;
        self.cb.on_gc(old_size, new_size);
        Ok(())
    }

    fn reloc_all(&mut self, to: &mut ClauseAllocator) -> Result<()> {
        let v = &mut self.v;

        // All watchers:
        v.watches.clauses.clean_all_pred(&WatcherDeleted { ca: &v.ca });
        for (_, ws) in v.watches.clauses.iter_mut() {
            for w in ws.iter_mut() {
                v.ca.reloc(&mut w.cref, to)?;
            }
        }
        {
            let ca = &v.ca;
            for ms in v.watches.mono.values_mut() {
                ms.retain(|w| {
                    let c = ca.get_ref(w.cref);
                    c.mark() == 0 && c.frozen()
                });
            }
        }
        for ms in v.watches.mono.values_mut() {
            for w in ms.iter_mut() {
                v.ca.reloc(&mut w.cref, to)?;
            }
        }

        // All reasons:
        let vars = &mut v.vars;
        for &lit in vars.trail.iter() {
            let x = lit.var();
            if let Reason::Clause(mut cr) = vars.vardata[x].reason {
                if v.ca.get_ref(cr).mark() == 1 {
                    debug_assert_eq!(vars.vardata[x].level, 0);
                    vars.vardata[x] = VarData::default();
                } else {
                    v.ca.reloc(&mut cr, to)?;
                    vars.vardata[x].reason = Reason::Clause(cr);
                }
            }
        }

        // All learnt and original clauses:
        for cr in self.learnts.iter_mut().chain(self.clauses.iter_mut()) {
            v.ca.reloc(cr, to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        clause::{lbool, Lit, Var},
        core::RestartPolicy,
        trail::Reason,
        BasicSolver, SolverInterface, SolverOpts,
    };

    fn lits(c: &[i32]) -> Vec<Lit> {
        c.iter().map(|&i| Lit::from_dimacs(i)).collect()
    }

    fn solver(opts: SolverOpts) -> BasicSolver {
        BasicSolver::new(opts, Default::default())
    }

    #[test]
    fn test_every_conflict() {
        let mut s = solver(SolverOpts {
            restarts: RestartPolicy::EveryConflict,
            ..SolverOpts::default()
        });
        s.v.on_conflict(4, 10);
        assert!(s.v.policy.restart_pending);

        let mut s = solver(SolverOpts {
            restarts: RestartPolicy::Never,
            ..SolverOpts::default()
        });
        for _ in 0..100 {
            s.v.on_conflict(20, 10);
        }
        assert!(!s.v.policy.restart_pending);
    }

    #[test]
    fn test_adaptive_restart() {
        let mut s = solver(SolverOpts {
            lbd_window: 3,
            ..SolverOpts::default()
        });
        for _ in 0..10 {
            s.v.on_conflict(2, 10);
        }
        assert!(!s.v.policy.restart_pending);
        for _ in 0..3 {
            s.v.on_conflict(10, 10);
        }
        assert!(s.v.policy.restart_pending);
    }

    #[test]
    fn test_restart_blocking() {
        let mut s = solver(SolverOpts {
            lbd_window: 3,
            trail_window: 5,
            blocking_after: 0,
            ..SolverOpts::default()
        });
        s.v.stats.conflicts = 100;
        for _ in 0..5 {
            s.v.on_conflict(2, 10);
        }
        s.v.on_conflict(9, 100);
        assert_eq!(s.v.stats.blocked_restarts, 1);
        assert_eq!(s.v.policy.lbd_window.len(), 1);
        assert!(!s.v.policy.restart_pending);
    }

    #[test]
    fn test_recent_learnts_survive_reduce() {
        let mut s = solver(SolverOpts::default());
        s.ensure_capacity(9);
        for (c, lbd) in &[
            (&[1, 2, 3][..], 3),
            (&[-1, 4, 5][..], 3),
            (&[2, -4, 6][..], 3),
            (&[7, 8, -3][..], 30),
        ] {
            s.store_learnt(&lits(c), *lbd).unwrap();
        }
        // all learnt since the last reduction
        s.reduce_db().unwrap();
        assert_eq!(s.learnt_clauses().count(), 4);
        assert_eq!(s.recent_learnts, 0);

        s.store_learnt(&lits(&[-7, 9, 2]), 40).unwrap();
        s.reduce_db().unwrap();
        // the old clause of LBD 30 is in the worse half, above the median
        assert_eq!(s.stats().removed_learnts, 1);
        assert!(s.learnt_clauses().any(|c| c == &lits(&[-7, 9, 2])[..]));
        assert!(!s.learnt_clauses().any(|c| c == &lits(&[7, 8, -3])[..]));
        assert!(s.check_invariants());
    }

    #[test]
    fn test_locked_learnt_is_kept() {
        let mut s = solver(SolverOpts::default());
        s.ensure_capacity(3);
        let cr = s.store_learnt(&lits(&[1, 2, 3]), 5).unwrap();
        s.reduce_db().unwrap();
        s.v.vars.unchecked_enqueue(Lit::from_dimacs(1), Reason::Clause(cr));
        assert_eq!(s.v.vars.value_lit(Lit::from_dimacs(1)), lbool::TRUE);
        s.reduce_db().unwrap();
        assert_eq!(s.learnt_clauses().count(), 1);
        assert_eq!(s.stats().removed_learnts, 0);
    }

    #[test]
    fn test_reduce_schedule() {
        let mut s = solver(SolverOpts {
            reduce_first: 3,
            reduce_increment: 2,
            ..SolverOpts::default()
        });
        for _ in 0..2 {
            s.v.on_conflict(2, 1);
        }
        assert!(!s.v.reduce_due());
        s.v.on_conflict(2, 1);
        assert!(s.v.reduce_due());
        s.reduce_db().unwrap();
        assert_eq!(s.v.policy.conflicts_before_reduce, 5);
        assert_eq!(s.num_reduces(), 1);
    }

    #[test]
    fn test_lbd_median() {
        let mut s = solver(SolverOpts::default());
        s.v.lbd_values = vec![0, 0, 5, 3, 2];
        s.v.num_learnts = 10;
        assert_eq!(s.v.lbd_median(), 3);
        s.v.lbd_values = vec![];
        s.v.num_learnts = 0;
        assert_eq!(s.v.lbd_median(), 2);
    }

    #[test]
    fn test_phase_deviation() {
        let mut s = solver(SolverOpts::default());
        s.ensure_capacity(4);
        s.v.vars.polarity[Var::from_dimacs(1)] = true;
        s.v.vars.polarity[Var::from_dimacs(2)] = true;
        s.v.vars.vars_seen = 8;
        assert_eq!(s.v.phase_deviation(), 0.25);
        assert_eq!(s.v.vars.vars_seen, 0);
        // nothing seen: the smallest deviation so far
        assert_eq!(s.v.phase_deviation(), 0.25);
        // below 0.01: replaced
        s.v.vars.vars_seen = 1000;
        assert_eq!(s.v.phase_deviation(), 0.1);
    }
}
