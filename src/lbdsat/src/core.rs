/****************************************************************************************[core.rs]
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
        analyze::{LbdCounter, Seen},
        callbacks::{Callbacks, ProgressStatus},
        clause::{lbool, CRef, ClauseAllocator, LSet, Lit, VMap, Var, MAX_LBD},
        error::{Error, Result},
        interface::SolverInterface,
        propagate::Conflict,
        reduce::Policy,
        trail::{Reason, VarData, VarState},
        watches::Watches,
    },
    std::{
        fmt, mem,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    },
};

/// Status of the solver, and result of `solve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No verdict: nothing solved yet, a budget ran out, or clauses were
    /// added since the last verdict.
    Unknown,
    Sat,
    Unsat,
    /// Stopped from outside. The model is partial (unassigned variables
    /// are `UNDEF`) and need not satisfy the clauses.
    Interrupted,
}

impl fmt::Display for State {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            State::Unknown => "UNKNOWN",
            State::Sat => "SATISFIABLE",
            State::Unsat => "UNSATISFIABLE",
            State::Interrupted => "INTERRUPTED",
        };
        write!(out, "{}", s)
    }
}

/// When to restart the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Restart when the recent learnt clauses have a much worse LBD than
    /// the average, unless the trail is unusually long.
    Adaptive,
    EveryConflict,
    Never,
}

#[derive(Clone, Debug)]
pub struct SolverOpts {
    pub var_decay: f64,
    pub clause_decay: f64,
    /// Conflict clause minimization: 0 = none, 1 = local, 2 = recursive.
    pub ccmin_mode: u32,
    /// 0 = no phase saving, 1 = limited, 2 = full.
    pub phase_saving: u32,
    /// Polarity of a variable before its first assignment.
    pub default_polarity: bool,
    pub restarts: RestartPolicy,
    /// Number of recent learnt clauses whose LBD is averaged.
    pub lbd_window: usize,
    /// Restart once `recent LBD mean * lbd_factor > global LBD mean`.
    pub lbd_factor: f64,
    /// Number of recent conflicts whose trail size is averaged.
    pub trail_window: usize,
    /// Block restarts while the trail is longer than this times its mean.
    pub trail_factor: f64,
    /// No restart blocking before that many conflicts.
    pub blocking_after: u64,
    /// Reduce (and freeze) learnt clauses at all.
    pub reduce: bool,
    /// Conflicts before the first reduction.
    pub reduce_first: u64,
    /// The gap between two reductions grows by that many conflicts.
    pub reduce_increment: u64,
    /// Upper bound of the phase deviation used to decide freezing.
    pub min_deviation: f64,
    /// A clause frozen more often than that is removed.
    pub max_freeze: u32,
    /// The fraction of wasted memory allowed before a garbage collection is triggered.
    pub garbage_frac: f64,
    /// Assume pure literals during search.
    pub pure_literals: bool,
    /// Vivify original clauses of at least this size (0 disables).
    pub vivify_min_size: u32,
    /// Keep a copy of the clauses as given, for `validate`.
    pub keep_original_clauses: bool,
    /// Words the clause arena may hold.
    pub max_arena_words: u32,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            ccmin_mode: 2,
            phase_saving: 2,
            default_polarity: false,
            restarts: RestartPolicy::Adaptive,
            lbd_window: 50,
            lbd_factor: 0.8,
            trail_window: 5000,
            trail_factor: 1.4,
            blocking_after: 10000,
            reduce: true,
            reduce_first: 500,
            reduce_increment: 100,
            min_deviation: 100.0,
            max_freeze: 7,
            garbage_frac: 0.20,
            pure_literals: true,
            vivify_min_size: 0,
            keep_original_clauses: true,
            max_arena_words: u32::MAX - 1,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && self.ccmin_mode <= 2
            && self.phase_saving <= 2
            && self.lbd_window >= 1
            && (0.0 < self.lbd_factor && self.lbd_factor < f64::INFINITY)
            && self.trail_window >= 1
            && (0.0 < self.trail_factor && self.trail_factor < f64::INFINITY)
            && self.reduce_first >= 1
            && self.reduce_increment >= 1
            && (0.0 < self.min_deviation && self.min_deviation < f64::INFINITY)
            && self.max_freeze < MAX_LBD
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && (0 < self.max_arena_words && self.max_arena_words < u32::MAX)
    }
}

/// Counters maintained during search. They never influence it.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub solves: u64,
    pub restarts: u64,
    pub blocked_restarts: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub reduces: u64,
    pub compactions: u64,
    /// Learnt clauses removed by reductions.
    pub removed_learnts: u64,
    /// Times a learnt clause was frozen.
    pub frozen: u64,
    /// Times a frozen clause was put back into the two-watch scheme.
    pub thawed: u64,
    /// LBD values lowered when a learnt clause propagated.
    pub lbd_updates: u64,
    /// Learnt literals before minimization.
    pub max_literals: u64,
    /// Learnt literals after minimization.
    pub tot_literals: u64,
    pub pure_literals: u64,
    /// Clauses removed because satisfied at level 0.
    pub removed_clauses: u64,
    /// Clauses that lost literals false at level 0.
    pub shrunk_clauses: u64,
    pub vivified_clauses: u64,
    pub vivified_lits: u64,
}

/// Handle to interrupt a running `solve` from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Ask the solver to stop. The current (or next) `solve` returns
    /// `State::Interrupted`.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Resource limits, as absolute values of the statistics.
#[derive(Debug, Clone, Default)]
struct Budget {
    conflicts: Option<u64>,
    propagations: Option<u64>,
    restarts: Option<u64>,
    time: Option<Duration>,
    deadline: Option<Instant>,
}

/// The clauses as they were added, stored contiguously.
#[derive(Debug, Default)]
struct OriginalClauses {
    lits: Vec<Lit>,
    ends: Vec<usize>,
}

impl OriginalClauses {
    fn push(&mut self, c: &[Lit]) {
        self.lits.extend_from_slice(c);
        self.ends.push(self.lits.len());
    }

    fn pop(&mut self) {
        self.ends.pop();
        self.lits.truncate(self.ends.last().copied().unwrap_or(0));
    }

    fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let mut start = 0;
        self.ends.iter().map(move |&end| {
            let c = &self.lits[start..end];
            start = end;
            c
        })
    }

    fn memory_footprint(&self) -> usize {
        self.lits.capacity() * mem::size_of::<Lit>() + self.ends.capacity() * mem::size_of::<usize>()
    }
}

/// The main solver structure.
///
/// A `Solver` object contains the whole state of the SAT solver, including
/// a clause allocator, literals, clauses, and statistics.
///
/// It is parametrized by `Callbacks`
pub struct Solver<Cb: Callbacks> {
    // Extra results: (read-only member variable)
    /// If problem is satisfiable, this vector contains the model (if any).
    model: Vec<lbool>,
    /// If problem is unsatisfiable under presumptions, this set contains the
    /// negation of the presumptions responsible.
    conflict: LSet,

    pub(crate) cb: Cb,

    /// List of problem clauses.
    pub(crate) clauses: Vec<CRef>,
    /// List of learnt clauses.
    pub(crate) learnts: Vec<CRef>,
    /// The last `recent_learnts` entries of `learnts` were learnt since
    /// the last reduction, and are not reduced before the next one.
    pub(crate) recent_learnts: usize,

    /// Presumptions of the next `solve`.
    pub(crate) presumptions: Vec<Lit>,
    /// Pure literals, assumed after the presumptions for the current `solve`.
    pub(crate) pure_lits: Vec<Lit>,
    pub(crate) pure_lits_stale: bool,

    originals: OriginalClauses,
    pub(crate) state: State,
    interrupt: Arc<AtomicBool>,
    budget: Budget,
    verbosity: u32,

    tmp_learnt: Vec<Lit>,

    pub(crate) v: SolverV,
}

/// The search state proper: everything propagation, analysis and the
/// clause database touch.
pub(crate) struct SolverV {
    pub(crate) vars: VarState,
    pub(crate) watches: Watches,
    pub(crate) ca: ClauseAllocator,
    pub(crate) opts: SolverOpts,
    pub(crate) stats: Stats,
    pub(crate) policy: Policy,

    /// If `false`, the constraints are already unsatisfiable. No part of
    /// the solver state may be used!
    pub(crate) ok: bool,
    /// Head of queue (as index into the trail)
    pub(crate) qhead: usize,
    /// Amount to bump next clause with.
    pub(crate) cla_inc: f64,
    pub(crate) next_var: Var,

    pub(crate) seen: VMap<Seen>,
    pub(crate) analyze_toclear: Vec<Lit>,
    pub(crate) minimize_stack: Vec<Lit>,
    pub(crate) lbd: LbdCounter,
    /// Number of attached or frozen learnt clauses, by LBD.
    pub(crate) lbd_values: Vec<u64>,

    pub(crate) num_clauses: u64,
    pub(crate) num_learnts: u64,
    pub(crate) num_frozen: u64,
    pub(crate) num_binary: u64,
    pub(crate) num_learnt_binary: u64,
    pub(crate) clauses_literals: u64,
    pub(crate) learnts_literals: u64,

    /// Number of top-level assignments at the last `simplify`.
    pub(crate) simp_db_assigns: i64,
}

impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn num_vars(&self) -> u32 {
        self.v.num_vars()
    }
    fn num_clauses(&self) -> u64 {
        self.v.num_clauses + self.v.num_binary
    }
    fn num_learnts(&self) -> u64 {
        self.v.num_learnts + self.v.num_learnt_binary
    }
    fn num_conflicts(&self) -> u64 {
        self.v.stats.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.v.stats.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.v.stats.decisions
    }
    fn num_restarts(&self) -> u64 {
        self.v.stats.restarts
    }
    fn num_reduces(&self) -> u64 {
        self.v.stats.reduces
    }

    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn state(&self) -> State {
        self.state
    }

    fn print_stats(&self) {
        let st = &self.v.stats;
        println!("c restarts              : {} ({} blocked)", st.restarts, st.blocked_restarts);
        println!("c conflicts             : {:<12}", st.conflicts);
        println!("c decisions             : {:<12}", st.decisions);
        println!("c propagations          : {:<12}", st.propagations);
        println!(
            "c conflict literals     : {:<12}   ({:4.2} % deleted)",
            st.tot_literals,
            (st.max_literals - st.tot_literals) as f64 * 100.0 / st.max_literals.max(1) as f64
        );
        println!("c reduces               : {:<12}", st.reduces);
        println!(
            "c learnts               : {:<12}   ({} frozen, {} binary)",
            self.v.num_learnts, self.v.num_frozen, self.v.num_learnt_binary
        );
        println!(
            "c removed learnts       : {:<12}   ({} freezes, {} thaws)",
            st.removed_learnts, st.frozen, st.thawed
        );
        println!("c lbd updates           : {:<12}", st.lbd_updates);
        println!("c compactions           : {:<12}", st.compactions);
        println!(
            "c simplified clauses    : {:<12}   ({} removed, {} shrunk)",
            st.removed_clauses + st.shrunk_clauses,
            st.removed_clauses,
            st.shrunk_clauses
        );
        println!("c pure literals         : {:<12}", st.pure_literals);
        println!(
            "c vivified clauses      : {:<12}   ({} literals)",
            st.vivified_clauses, st.vivified_lits
        );
        println!(
            "c memory footprint      : {:<12}   (bytes)",
            self.memory_footprint()
        );
    }

    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        self.v.new_var(upol, dvar)
    }

    fn new_var_default(&mut self) -> Var {
        self.v.new_var(lbool::UNDEF, true)
    }

    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> Result<bool> {
        for &lit in clause.iter() {
            self.check_lit(lit)?;
        }
        debug!("add clause {:?}", clause);
        if self.v.opts.keep_original_clauses {
            self.originals.push(clause);
        }
        if !self.v.ok {
            return Ok(false);
        }
        debug_assert_eq!(self.v.vars.decision_level(), 0);

        clause.sort_unstable();
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        // remove duplicates, true literals, etc.
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.v.vars.value_lit(lit_i);
            if value == lbool::TRUE || lit_i == !last_lit {
                // satisfied clause or tautology
                self.state = State::Unknown;
                return Ok(true);
            } else if value != lbool::FALSE && lit_i != last_lit {
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        let ok = match self.add_clause_internal(clause) {
            Ok(ok) => ok,
            Err(e) => {
                if self.v.opts.keep_original_clauses {
                    self.originals.pop();
                }
                return Err(e);
            }
        };
        self.state = if ok { State::Unknown } else { State::Unsat };
        Ok(ok)
    }

    fn add_presumption(&mut self, lit: Lit) -> Result<()> {
        self.check_lit(lit)?;
        self.presumptions.push(lit);
        Ok(())
    }

    fn simplify(&mut self) -> Result<bool> {
        self.simplify_internal()
    }

    fn solve(&mut self) -> Result<State> {
        let res = self.solve_internal();
        self.presumptions.clear();
        res
    }

    fn solve_with(&mut self, presumptions: &[Lit]) -> Result<State> {
        for &p in presumptions {
            if let Err(e) = self.add_presumption(p) {
                self.presumptions.clear();
                return Err(e);
            }
        }
        self.solve()
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        self.v.vars.proved_at_lvl_0()
    }

    fn get_model(&self) -> &[lbool] {
        &self.model
    }

    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&v| v)
    }

    fn value_lvl_0(&self, lit: Lit) -> lbool {
        if lit.is_sentinel() || lit.var().idx() >= self.v.num_vars() {
            return lbool::UNDEF;
        }
        self.v.vars.value_lvl_0(lit)
    }

    fn unsat_core(&self) -> &[Lit] {
        self.conflict.as_slice()
    }

    fn unsat_core_contains_lit(&self, lit: Lit) -> bool {
        self.conflict.has(lit)
    }

    fn validate(&self) -> bool {
        if self.state != State::Sat {
            return false;
        }
        if self.v.opts.keep_original_clauses {
            Self::check_clause_set_satisfiability(self.originals.iter(), &self.model)
        } else {
            self.check_live_clauses()
        }
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    ///
    /// Panics if `opts.check()` fails.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check(), "invalid solver options {:?}", opts);
        Self {
            model: vec![],
            conflict: LSet::new(),
            cb,
            clauses: vec![],
            learnts: vec![],
            recent_learnts: 0,
            presumptions: vec![],
            pure_lits: vec![],
            pure_lits_stale: true,
            originals: OriginalClauses::default(),
            state: State::Unknown,
            interrupt: Arc::new(AtomicBool::new(false)),
            budget: Budget::default(),
            verbosity: 0,
            tmp_learnt: vec![],
            v: SolverV::new(opts),
        }
    }

    pub fn opts(&self) -> &SolverOpts {
        &self.v.opts
    }

    /// Verbosity `> 0` enables progress reports through `Callbacks::on_progress`.
    pub fn set_verbosity(&mut self, verbosity: u32) {
        self.verbosity = verbosity;
    }

    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    /// A handle that can stop this solver from any thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.interrupt.clone())
    }

    /// Same as `StopHandle::stop`.
    pub fn stop(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Give up (with `Unknown`) after `n` more conflicts.
    pub fn set_conflict_budget(&mut self, n: u64) {
        self.budget.conflicts = Some(self.v.stats.conflicts + n);
    }

    /// Give up (with `Unknown`) after `n` more propagations.
    pub fn set_propagation_budget(&mut self, n: u64) {
        self.budget.propagations = Some(self.v.stats.propagations + n);
    }

    /// Give up (with `Unknown`) after `n` more restarts.
    pub fn set_restart_budget(&mut self, n: u64) {
        self.budget.restarts = Some(self.v.stats.restarts + n);
    }

    /// Give up (with `Unknown`) when a `solve` lasts longer than `d`.
    pub fn set_time_budget(&mut self, d: Duration) {
        self.budget.time = Some(d);
    }

    pub fn budget_off(&mut self) {
        self.budget = Budget::default();
    }

    /// Temporary access to the callbacks
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Temporary access to the callbacks
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn stats(&self) -> &Stats {
        &self.v.stats
    }

    /// Number of live binary clauses, original and learnt.
    pub fn num_binary_clauses(&self) -> u64 {
        self.v.num_binary + self.v.num_learnt_binary
    }

    /// Number of frozen learnt clauses.
    pub fn num_frozen(&self) -> u64 {
        self.v.num_frozen
    }

    pub fn num_assigns(&self) -> u32 {
        self.v.vars.num_assigns()
    }

    pub fn decision_level(&self) -> u32 {
        self.v.vars.decision_level()
    }

    /// Level at which `v` is currently assigned, if it is.
    pub fn var_level(&self, v: Var) -> Option<u32> {
        if v.idx() < self.v.num_vars() && self.v.vars.value(v) != lbool::UNDEF {
            Some(self.v.vars.level(v))
        } else {
            None
        }
    }

    /// Number of learnt clauses (of size at least 3) for each LBD value.
    pub fn lbd_distribution(&self) -> &[u64] {
        &self.v.lbd_values
    }

    /// Approximate number of bytes used by the solver.
    pub fn memory_footprint(&self) -> usize {
        self.v.memory_footprint()
            + (self.clauses.capacity() + self.learnts.capacity()) * mem::size_of::<CRef>()
            + self.originals.memory_footprint()
            + self.model.capacity() * mem::size_of::<lbool>()
    }

    /// Select whether `v` may be used for decisions.
    pub fn set_decision_var(&mut self, v: Var, dvar: bool) -> Result<()> {
        self.check_var(v)?;
        self.v.set_decision_var(v, dvar);
        Ok(())
    }

    /// Polarity to try for `v` on its next decision.
    pub fn set_polarity(&mut self, v: Var, pol: bool) -> Result<()> {
        self.check_var(v)?;
        self.v.vars.polarity[v] = pol;
        Ok(())
    }

    /// Create variables until there are at least `n_vars` of them.
    pub fn ensure_capacity(&mut self, n_vars: u32) {
        if n_vars > self.v.num_vars() {
            let v = Var::from_idx(n_vars - 1);
            self.v.vars.reserve(v);
            self.v.seen.reserve_default(v);
        }
        while self.v.num_vars() < n_vars {
            self.v.new_var(lbool::UNDEF, true);
        }
    }

    /// Presumptions registered for the next `solve`.
    pub fn presumptions(&self) -> &[Lit] {
        &self.presumptions
    }

    /// The clauses as they were added (if `keep_original_clauses`).
    pub fn original_clauses(&self) -> impl Iterator<Item = &[Lit]> {
        self.originals.iter()
    }

    /// Learnt clauses of size at least 3, frozen ones included.
    pub fn learnt_clauses(&self) -> impl Iterator<Item = &[Lit]> {
        let ca = &self.v.ca;
        self.learnts.iter().map(move |&cr| ca.get_ref(cr).lits())
    }

    /// Does `model` satisfy every clause of `clauses`?
    ///
    /// Variables beyond the end of `model` count as unassigned.
    pub fn check_clause_set_satisfiability<'a, I>(clauses: I, model: &[lbool]) -> bool
    where
        I: IntoIterator<Item = &'a [Lit]>,
    {
        clauses.into_iter().all(|c| {
            c.iter().any(|&lit| {
                model
                    .get(lit.var().idx() as usize)
                    .map_or(false, |&v| (v ^ !lit.sign()) == lbool::TRUE)
            })
        })
    }

    /// Model check against the live clause database, for when the
    /// original clauses are not kept.
    fn check_live_clauses(&self) -> bool {
        let model = &self.model;
        let sat = |lit: Lit| {
            model
                .get(lit.var().idx() as usize)
                .map_or(false, |&v| (v ^ !lit.sign()) == lbool::TRUE)
        };
        let ca = &self.v.ca;
        self.clauses
            .iter()
            .all(|&cr| ca.get_ref(cr).iter().any(|&lit| sat(lit)))
            && self
                .v
                .watches
                .bins
                .iter()
                .all(|(p, qs)| sat(!p) || qs.iter().all(|&q| sat(q)))
            && self.v.vars.proved_at_lvl_0().iter().all(|&lit| sat(lit))
    }

    fn check_var(&self, v: Var) -> Result<()> {
        if v == Var::UNDEF || v.idx() >= self.v.num_vars() {
            Err(Error::UnknownVar(v))
        } else {
            Ok(())
        }
    }

    fn check_lit(&self, lit: Lit) -> Result<()> {
        if lit.is_sentinel() {
            return Err(Error::InvalidLit(lit));
        }
        self.check_var(lit.var())
    }

    /// Add a clause of unassigned, distinct, non-complementary literals
    /// at level 0.
    pub(crate) fn add_clause_internal(&mut self, lits: &[Lit]) -> Result<bool> {
        debug_assert_eq!(self.v.vars.decision_level(), 0);
        match lits.len() {
            0 => self.v.ok = false,
            1 => {
                self.v.vars.unchecked_enqueue(lits[0], Reason::Decision);
                if self.v.propagate().is_some() {
                    self.v.ok = false;
                }
            }
            2 => {
                self.v.watches.add_binary(lits[0], lits[1]);
                self.v.num_binary += 1;
            }
            _ => {
                let cr = self.v.ca.alloc_with_learnt(lits, false)?;
                self.clauses.push(cr);
                self.v.attach_clause(cr);
                self.v.num_clauses += 1;
                self.v.clauses_literals += lits.len() as u64;
            }
        }
        Ok(self.v.ok)
    }

    fn stop_requested(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed) || self.cb.stop()
    }

    fn within_budget(&self) -> bool {
        let st = &self.v.stats;
        self.budget.conflicts.map_or(true, |n| st.conflicts < n)
            && self.budget.propagations.map_or(true, |n| st.propagations < n)
            && self.budget.restarts.map_or(true, |n| st.restarts < n)
            && self.budget.deadline.map_or(true, |d| Instant::now() < d)
    }

    /// Main solve method (assumptions given in `self.presumptions`).
    fn solve_internal(&mut self) -> Result<State> {
        self.model.clear();
        self.conflict.clear();
        if !self.v.ok {
            self.state = State::Unsat;
            return Ok(State::Unsat);
        }

        self.v.stats.solves += 1;
        self.budget.deadline = self.budget.time.map(|d| Instant::now() + d);
        self.cb.on_start();
        info!(
            "solve.start ({} vars, {} clauses, {} presumptions)",
            self.v.num_vars(),
            self.v.num_clauses + self.v.num_binary,
            self.presumptions.len()
        );

        let status = if self.stop_requested() {
            Ok(State::Interrupted)
        } else if self.presumptions_inconsistent() {
            Ok(State::Unsat)
        } else {
            self.run()
        };
        let status = match status {
            Ok(s) => s,
            Err(e) => {
                info!("solve.error {}", e);
                self.v.cancel_until(0);
                self.pure_lits.clear();
                self.state = State::Unknown;
                return Err(e);
            }
        };

        match status {
            State::Sat | State::Interrupted => {
                let vars = &self.v.vars;
                self.model
                    .extend((0..self.v.num_vars()).map(|i| vars.value(Var::from_idx(i))));
                if status == State::Interrupted {
                    // the stop request is answered
                    self.interrupt.store(false, Ordering::Relaxed);
                }
            }
            State::Unsat => {
                if self.conflict.is_empty() {
                    self.v.ok = false;
                }
            }
            State::Unknown => {}
        }

        self.v.cancel_until(0);
        self.pure_lits.clear();
        self.state = status;
        self.cb.on_result(status);
        info!(
            "solve.done {} ({} conflicts, {} decisions)",
            status, self.v.stats.conflicts, self.v.stats.decisions
        );
        Ok(status)
    }

    /// Check the presumptions against each other and the level 0
    /// facts. If they are contradictory, the core is in `self.conflict`.
    fn presumptions_inconsistent(&mut self) -> bool {
        let mut seen = LSet::new();
        for &p in &self.presumptions {
            if self.v.vars.value_lvl_0(p) == lbool::FALSE {
                self.conflict.insert(!p);
            } else if seen.has(!p) {
                self.conflict.insert(p);
                self.conflict.insert(!p);
            } else {
                seen.insert(p);
                continue;
            }
            debug!("presumptions.inconsistent core={:?}", self.conflict);
            return true;
        }
        false
    }

    /// Level-0 preprocessing, then search.
    fn run(&mut self) -> Result<State> {
        if !self.simplify_internal()? {
            return Ok(State::Unsat);
        }
        if self.v.opts.vivify_min_size > 0 && !self.vivify_internal(self.v.opts.vivify_min_size)? {
            return Ok(State::Unsat);
        }
        self.pure_lits_stale = true;
        self.search()
    }

    /// Search for a model.
    ///
    /// # Output:
    ///
    /// `Sat` if a partial assigment that is consistent with respect to the clause set is found. If
    /// all variables are decision variables, this means that the clause set is satisfiable. `Unsat`
    /// if the clause set is unsatisfiable. `Unknown` if a budget was exhausted, `Interrupted` if
    /// a stop was requested.
    fn search(&mut self) -> Result<State> {
        debug_assert!(self.v.ok);

        loop {
            if self.stop_requested() {
                return Ok(State::Interrupted);
            }

            if let Some(confl) = self.v.propagate() {
                // CONFLICT
                self.v.stats.conflicts += 1;
                if self.v.vars.decision_level() == 0 {
                    return Ok(State::Unsat);
                }
                self.handle_conflict(confl)?;
                continue;
            }

            // NO CONFLICT
            if !self.within_budget() {
                return Ok(State::Unknown);
            }
            if self.v.policy.restart_pending {
                self.restart();
            }
            if self.v.vars.decision_level() == 0 {
                // Simplify the set of problem clauses:
                if !self.simplify_internal()? {
                    return Ok(State::Unsat);
                }
                if self.v.reduce_due() {
                    self.reduce_db()?;
                    if self.v.qhead < self.v.vars.trail.len() {
                        continue; // thawed unit clauses
                    }
                }
                if self.pure_lits_stale {
                    self.search_pure_literals();
                }
            }

            let mut next = None;
            let n_presumptions = self.presumptions.len();
            while (self.v.vars.decision_level() as usize) < n_presumptions + self.pure_lits.len() {
                // Perform user provided presumption, then pure literals:
                let i = self.v.vars.decision_level() as usize;
                let p = if i < n_presumptions {
                    self.presumptions[i]
                } else {
                    self.pure_lits[i - n_presumptions]
                };
                let value = self.v.vars.value_lit(p);
                if value == lbool::UNDEF {
                    next = Some(p);
                    break;
                } else if value == lbool::FALSE && i < n_presumptions {
                    self.v.analyze_final(!p, &mut self.conflict);
                    return Ok(State::Unsat);
                } else {
                    // Dummy decision level:
                    self.v.vars.new_decision_level();
                }
            }

            let next = match next {
                Some(p) => p,
                None => {
                    // New variable decision:
                    self.v.stats.decisions += 1;
                    match self.v.pick_branch_lit() {
                        Some(p) => p,
                        // Model found:
                        None => return Ok(State::Sat),
                    }
                }
            };

            // Increase decision level and enqueue 'next'
            trace!("search.decide {:?} at level {}", next, self.v.vars.decision_level() + 1);
            self.v.vars.new_decision_level();
            self.v.vars.unchecked_enqueue(next, Reason::Decision);
        }
    }

    fn handle_conflict(&mut self, confl: Conflict) -> Result<()> {
        let trail_len = self.v.vars.trail.len();
        let learnt = self
            .v
            .analyze(confl, &self.learnts, &mut self.tmp_learnt);
        self.v.cancel_until(learnt.backtrack_lvl);
        self.add_learnt(learnt.lbd)?;

        self.v.vars.var_decay_activity();
        self.v.cla_decay_activity();
        self.v.on_conflict(learnt.lbd, trail_len);
        Ok(())
    }

    /// Store the clause in `tmp_learnt` and propagate its first literal.
    fn add_learnt(&mut self, lbd: u32) -> Result<()> {
        let learnt = &self.tmp_learnt;
        let p = learnt[0];
        match learnt.len() {
            1 => self.v.vars.unchecked_enqueue(p, Reason::Decision),
            2 => {
                self.v.watches.add_binary(p, learnt[1]);
                self.v.num_learnt_binary += 1;
                self.v.vars.unchecked_enqueue(p, Reason::Binary(learnt[1]));
            }
            _ => {
                let learnt = mem::take(&mut self.tmp_learnt);
                let res = self.store_learnt(&learnt, lbd);
                self.tmp_learnt = learnt;
                let cr = res?;
                self.v.vars.unchecked_enqueue(p, Reason::Clause(cr));
            }
        }
        Ok(())
    }

    /// Allocate and attach a learnt clause of at least 3 literals.
    pub(crate) fn store_learnt(&mut self, lits: &[Lit], lbd: u32) -> Result<CRef> {
        let cr = self.v.ca.alloc_with_learnt(lits, true)?;
        self.v.ca.get_mut(cr).set_lbd(lbd);
        self.learnts.push(cr);
        self.recent_learnts += 1;
        self.v.attach_clause(cr);
        self.v.num_learnts += 1;
        self.v.learnts_literals += lits.len() as u64;
        self.v.record_lbd(lbd);
        self.v.cla_bump_activity(&self.learnts, cr);
        Ok(cr)
    }

    fn restart(&mut self) {
        self.v.policy.restart_pending = false;
        self.v.policy.lbd_window.clear();
        self.v.stats.restarts += 1;
        info!(
            "search.restart #{} ({} conflicts)",
            self.v.stats.restarts, self.v.stats.conflicts
        );
        self.v.cancel_until(0);
        self.cb.on_restart();
        self.report_progress();
    }

    pub(crate) fn report_progress(&mut self) {
        if self.verbosity == 0 {
            return;
        }
        let status = ProgressStatus {
            conflicts: self.v.stats.conflicts,
            restarts: self.v.stats.restarts,
            reduces: self.v.stats.reduces,
            n_clauses: self.v.num_clauses,
            n_binary: self.v.num_binary + self.v.num_learnt_binary,
            n_learnts: self.v.num_learnts,
            n_frozen: self.v.num_frozen,
            lbd_mean: self.v.policy.lbd_mean.mean(),
            progress_estimate: self.v.progress_estimate(),
        };
        self.cb.on_progress(&status);
    }

    /// Debug check of the internal invariants: trail levels and reasons,
    /// watches of attached clauses, mono-watches of frozen ones.
    ///
    /// This is expensive, and meant for tests.
    pub fn check_invariants(&self) -> bool {
        let v = &self.v;
        let vars = &v.vars;

        // trail
        let mut lvl = 0;
        for (i, &lit) in vars.trail.iter().enumerate() {
            while (lvl as usize) < vars.trail_lim.len() && vars.trail_lim[lvl as usize] as usize <= i {
                lvl += 1;
            }
            if vars.value_lit(lit) != lbool::TRUE || vars.level(lit.var()) != lvl {
                debug!("invariant: bad assignment of {:?} in trail", lit);
                return false;
            }
            let lower = |q: Lit| vars.value_lit(q) == lbool::FALSE && vars.level(q.var()) <= lvl;
            let ok = match vars.reason(lit.var()) {
                Reason::Decision => true,
                Reason::Binary(q) => lower(q),
                Reason::Clause(cr) => {
                    let c = v.ca.get_ref(cr);
                    c.mark() == 0 && c[0] == lit && c.lits()[1..].iter().all(|&q| lower(q))
                }
            };
            if !ok {
                debug!("invariant: bad reason for {:?}", lit);
                return false;
            }
        }

        let propagated = v.qhead == vars.trail.len();
        let mut n_frozen = 0;
        for &cr in self.clauses.iter().chain(self.learnts.iter()) {
            let c = v.ca.get_ref(cr);
            if c.mark() != 0 {
                debug!("invariant: removed clause {:?} still listed", cr);
                return false;
            }
            if c.learnt() && c.frozen() {
                n_frozen += 1;
                let listed = c.iter().any(|&q| v.watches.mono[!q].iter().any(|w| w.cref == cr));
                if !listed {
                    debug!("invariant: frozen clause {:?} is not mono-watched", cr);
                    return false;
                }
                continue;
            }
            let (c0, c1) = (c[0], c[1]);
            if !v.watches.clauses[!c0].iter().any(|w| w.cref == cr)
                || !v.watches.clauses[!c1].iter().any(|w| w.cref == cr)
            {
                debug!("invariant: clause {:?} is not watched on {:?} {:?}", cr, c0, c1);
                return false;
            }
            let false0 = vars.value_lit(c0) == lbool::FALSE;
            let false1 = vars.value_lit(c1) == lbool::FALSE;
            let satisfied = c.iter().any(|&q| vars.value_lit(q) == lbool::TRUE);
            if propagated && (false0 || false1) && !satisfied {
                debug!("invariant: clause {:?} has a false watch", cr);
                return false;
            }
        }
        n_frozen == v.num_frozen
    }
}

impl SolverV {
    fn new(opts: SolverOpts) -> Self {
        Self {
            vars: VarState::new(opts.var_decay, opts.phase_saving),
            watches: Watches::new(),
            ca: ClauseAllocator::new(opts.max_arena_words),
            policy: Policy::new(&opts),
            stats: Stats::default(),
            opts,
            ok: true,
            qhead: 0,
            cla_inc: 1.0,
            next_var: Var::from_idx(0),
            seen: VMap::new(),
            analyze_toclear: vec![],
            minimize_stack: vec![],
            lbd: LbdCounter::default(),
            lbd_values: vec![],
            num_clauses: 0,
            num_learnts: 0,
            num_frozen: 0,
            num_binary: 0,
            num_learnt_binary: 0,
            clauses_literals: 0,
            learnts_literals: 0,
            simp_db_assigns: -1,
        }
    }

    #[inline(always)]
    pub(crate) fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }

    pub(crate) fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(v.idx() + 1);
        self.watches.init_lit(Lit::new(v, false));
        self.watches.init_lit(Lit::new(v, true));
        let polarity = upol.to_bool().unwrap_or(self.opts.default_polarity);
        self.vars.init_var(v, polarity);
        self.seen.insert_default(v, Seen::UNDEF);
        self.set_decision_var(v, dvar);
        v
    }

    pub(crate) fn set_decision_var(&mut self, v: Var, b: bool) {
        self.vars.decision[v] = b;
        self.vars.insert_var_order(v);
    }

    fn pick_branch_lit(&mut self) -> Option<Lit> {
        let v = self.vars.pick_branch_var()?;
        Some(Lit::new(v, self.vars.polarity[v]))
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond).
    pub(crate) fn cancel_until(&mut self, level: u32) {
        if self.vars.decision_level() > level {
            trace!("solver.cancel-until {}", level);
            self.vars.cancel_until(level);
            self.qhead = self.vars.trail.len();
        }
    }

    /// Watch the first two literals of `cr`.
    pub(crate) fn attach_clause(&mut self, cr: CRef) {
        let c = self.ca.get_ref(cr);
        debug_assert!(c.size() > 2);
        let (c0, c1) = (c[0], c[1]);
        self.watches.watch(cr, c0, c1);
    }

    /// Detach a clause from watcher lists.
    ///
    /// param `strict` means we remove the clause from watchers eagerly, instead
    /// of just marking the watchlist as "dirty"
    pub(crate) fn detach_clause(&mut self, cr: CRef, strict: bool) {
        let c = self.ca.get_ref(cr);
        let (c0, c1) = (c[0], c[1]);
        self.watches.unwatch(cr, c0, c1, strict);
    }

    /// Detach and free a clause.
    pub(crate) fn remove_clause(&mut self, cr: CRef) {
        let (learnt, frozen, size) = {
            let c = self.ca.get_ref(cr);
            (c.learnt(), c.learnt() && c.frozen(), c.size() as u64)
        };
        if !frozen {
            self.detach_clause(cr, false);
        }
        // Don't leave pointers to free'd memory!
        if self.locked(cr) {
            let v = self.ca.get_ref(cr)[0].var();
            debug_assert_eq!(self.vars.level(v), 0);
            self.vars.vardata[v] = VarData {
                reason: Reason::Decision,
                level: 0,
            };
        }
        if learnt {
            let lbd = self.ca.get_ref(cr).lbd();
            self.lbd_values[lbd as usize] -= 1;
            self.num_learnts -= 1;
            self.learnts_literals -= size;
            if frozen {
                self.num_frozen -= 1;
            }
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= size;
        }
        self.ca.get_mut(cr).set_mark(1);
        self.ca.free(cr);
    }

    /// Returns `true` if a clause is a reason for some implication in the current state.
    pub(crate) fn locked(&self, cr: CRef) -> bool {
        let c0 = self.ca.get_ref(cr)[0];
        self.vars.value_lit(c0) == lbool::TRUE && self.vars.reason(c0.var()) == Reason::Clause(cr)
    }

    /// Returns `true` if a clause is satisfied in the current state.
    pub(crate) fn satisfied(&self, lits: &[Lit]) -> bool {
        lits.iter().any(|&lit| self.vars.value_lit(lit) == lbool::TRUE)
    }

    pub(crate) fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.opts.clause_decay;
    }

    pub(crate) fn cla_bump_activity(&mut self, learnts: &[CRef], cr: CRef) {
        let new_activity = {
            let mut c = self.ca.get_mut(cr);
            let r = c.activity() + self.cla_inc as f32;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // Rescale:
            for &learnt in learnts.iter() {
                let mut c = self.ca.get_mut(learnt);
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    /// Count one more learnt clause with this LBD.
    pub(crate) fn record_lbd(&mut self, lbd: u32) {
        let lbd = lbd.min(MAX_LBD) as usize;
        if lbd >= self.lbd_values.len() {
            self.lbd_values.resize(lbd + 1, 0);
        }
        self.lbd_values[lbd] += 1;
    }

    fn progress_estimate(&self) -> f64 {
        let n = self.num_vars().max(1) as f64;
        let f = 1.0 / n;
        let dl = self.vars.decision_level();
        let mut progress = 0.0;
        for i in 0..=dl {
            let beg = if i == 0 { 0 } else { self.vars.trail_lim[i as usize - 1] as usize };
            let end = if i == dl {
                self.vars.trail.len()
            } else {
                self.vars.trail_lim[i as usize] as usize
            };
            progress += f64::powi(f, i as i32) * (end - beg) as f64;
        }
        progress / n
    }

    fn memory_footprint(&self) -> usize {
        let per_var = mem::size_of::<f64>()
            + mem::size_of::<lbool>()
            + mem::size_of::<VarData>()
            + 3 * mem::size_of::<bool>()
            + mem::size_of::<u32>()
            + mem::size_of::<Seen>()
            + mem::size_of::<i32>();
        self.ca.memory_footprint()
            + self.watches.memory_footprint()
            + self.num_vars() as usize * per_var
            + (self.vars.trail.capacity() + self.analyze_toclear.capacity()) * mem::size_of::<Lit>()
            + self.lbd_values.capacity() * mem::size_of::<u64>()
    }
}
