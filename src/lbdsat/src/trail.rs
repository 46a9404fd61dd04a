/***************************************************************************************[trail.rs]
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

//! Assignment, trail and variable ordering.

use {
    crate::{
        clause::{lbool, CRef, Lit, VMap, Var},
        heap::{Comparator, Heap, HeapData},
    },
    std::cmp,
};

/// Why a literal is on the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reason {
    /// Decision, presumption, or fact proved at level 0.
    Decision,
    /// Implied by the binary clause made of the implied literal and this
    /// (false) one.
    Binary(Lit),
    /// Implied by a clause of the arena, whose first literal is the
    /// implied one.
    Clause(CRef),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VarData {
    pub reason: Reason,
    pub level: u32,
}

impl Default for VarData {
    fn default() -> Self {
        VarData {
            reason: Reason::Decision,
            level: 0,
        }
    }
}

/// Heap order: highest activity first, lowest index on ties.
pub(crate) struct VarOrder<'a> {
    pub activity: &'a VMap<f64>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        let (a, b) = (self.activity[*lhs], self.activity[*rhs]);
        match b.partial_cmp(&a) {
            Some(cmp::Ordering::Equal) | None => lhs.idx().cmp(&rhs.idx()),
            Some(o) => o,
        }
    }
}

#[derive(Debug)]
pub(crate) struct VarState {
    /// A heuristic measurement of the activity of a variable.
    pub activity: VMap<f64>,
    /// Current assignment for each variable.
    pub ass: VMap<lbool>,
    /// Stores reason and level for each variable.
    pub vardata: VMap<VarData>,
    /// Amount to bump next variable with.
    pub var_inc: f64,
    pub var_decay: f64,
    /// Variables eligible for branching, by activity.
    pub order_heap_data: HeapData<Var>,
    /// Declares if a variable is eligible for selection in the decision heuristic.
    pub decision: VMap<bool>,

    /// Assignment stack; stores all assigments made in the order they were made.
    pub trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    pub trail_lim: Vec<u32>,

    /// The preferred polarity of each variable (saved phase).
    pub polarity: VMap<bool>,
    /// Saved phases as they were at the previous reduction.
    pub prev_polarity: VMap<bool>,
    /// 0 = none, 1 = limited, 2 = full.
    pub phase_saving: u32,

    /// Reduction count at which each variable was last assigned.
    pub last_reduce_seen: VMap<u32>,
    /// Number of reductions so far, for `last_reduce_seen`.
    pub reduce_epoch: u32,
    /// Distinct variables assigned since the last reduction.
    pub vars_seen: u32,
}

impl VarState {
    pub fn new(var_decay: f64, phase_saving: u32) -> Self {
        Self {
            activity: VMap::new(),
            ass: VMap::new(),
            vardata: VMap::new(),
            var_inc: 1.0,
            var_decay,
            order_heap_data: HeapData::new(),
            decision: VMap::new(),
            trail: vec![],
            trail_lim: vec![],
            polarity: VMap::new(),
            prev_polarity: VMap::new(),
            phase_saving,
            last_reduce_seen: VMap::new(),
            reduce_epoch: 0,
            vars_seen: 0,
        }
    }

    /// Allocate the per-variable data of `v`.
    pub fn init_var(&mut self, v: Var, polarity: bool) {
        self.activity.insert_default(v, 0.0);
        self.ass.insert_default(v, lbool::UNDEF);
        self.vardata.insert_default(v, VarData::default());
        self.decision.insert_default(v, false);
        self.polarity.insert_default(v, polarity);
        self.prev_polarity.insert_default(v, polarity);
        // never seen: any value but the current epoch
        self.last_reduce_seen
            .insert_default(v, self.reduce_epoch.wrapping_sub(1));
    }

    pub fn reserve(&mut self, v: Var) {
        self.activity.reserve(v, 0.0);
        self.ass.reserve(v, lbool::UNDEF);
        self.vardata.reserve_default(v);
        self.decision.reserve(v, false);
        self.polarity.reserve(v, false);
        self.prev_polarity.reserve(v, false);
        self.last_reduce_seen.reserve(v, 0);
    }

    #[inline(always)]
    pub fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    #[inline(always)]
    pub fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    /// Begins a new decision level.
    pub fn new_decision_level(&mut self) {
        let lvl = self.trail.len() as u32;
        self.trail_lim.push(lvl);
    }

    /// Literals assigned at level 0.
    pub fn proved_at_lvl_0(&self) -> &[Lit] {
        let end = self
            .trail_lim
            .first()
            .map_or(self.trail.len(), |&x| x as usize);
        &self.trail[..end]
    }

    #[inline(always)]
    pub fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    pub fn value_lit(&self, x: Lit) -> lbool {
        self.ass[x.var()] ^ !x.sign()
    }

    /// Value of `x` if it was fixed at level 0.
    pub fn value_lvl_0(&self, x: Lit) -> lbool {
        let v = self.value_lit(x);
        if v != lbool::UNDEF && self.level(x.var()) == 0 {
            v
        } else {
            lbool::UNDEF
        }
    }

    #[inline(always)]
    pub fn level(&self, x: Var) -> u32 {
        self.vardata[x].level
    }

    #[inline(always)]
    pub fn reason(&self, x: Var) -> Reason {
        self.vardata[x].reason
    }

    pub fn unchecked_enqueue(&mut self, p: Lit, from: Reason) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        let v = p.var();
        self.ass[v] = lbool::new(p.sign());
        self.vardata[v] = VarData {
            reason: from,
            level: self.decision_level(),
        };
        if self.phase_saving > 1 {
            self.polarity[v] = p.sign();
        }
        if self.last_reduce_seen[v] != self.reduce_epoch {
            self.last_reduce_seen[v] = self.reduce_epoch;
            self.vars_seen += 1;
        }
        self.trail.push(p);
    }

    /// Enqueue `p` unless it is already assigned; `false` if it is false.
    pub fn enqueue(&mut self, p: Lit, from: Reason) -> bool {
        let v = self.value_lit(p);
        if v == lbool::UNDEF {
            self.unchecked_enqueue(p, from);
            true
        } else {
            v == lbool::TRUE
        }
    }

    /// Revert to the state at given level, keeping all assignments at
    /// `level` but not beyond.
    pub fn cancel_until(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let trail_lim_last = self.trail_lim[self.trail_lim.len() - 1] as usize;
        let trail_lim_level = self.trail_lim[level as usize] as usize;
        for c in (trail_lim_level..self.trail.len()).rev() {
            let x = self.trail[c].var();
            self.ass[x] = lbool::UNDEF;
            if self.phase_saving == 1 && c >= trail_lim_last {
                self.polarity[x] = self.trail[c].sign();
            }
            self.insert_var_order(x);
        }
        self.trail.truncate(trail_lim_level);
        self.trail_lim.truncate(level as usize);
    }

    pub fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap_data.promote(VarOrder {
            activity: &self.activity,
        })
    }

    pub fn insert_var_order(&mut self, x: Var) {
        if self.decision[x] && !self.order_heap_data.in_heap(x) {
            self.order_heap().insert(x);
        }
    }

    pub fn rebuild_order_heap(&mut self) {
        let vs: Vec<Var> = self
            .ass
            .iter()
            .filter(|&(v, &val)| self.decision[v] && val == lbool::UNDEF)
            .map(|(v, _)| v)
            .collect();
        self.order_heap().build(&vs);
    }

    /// Unassigned decision variable with the highest activity, if any.
    pub fn pick_branch_var(&mut self) -> Option<Var> {
        loop {
            let next = self.order_heap().remove_min()?;
            if self.value(next) == lbool::UNDEF && self.decision[next] {
                return Some(next);
            }
        }
    }

    pub fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    /// Increase a variable with the current 'bump' value.
    pub fn var_bump_activity(&mut self, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // Rescale:
            for x in self.activity.values_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        // Update order_heap with respect to new activity:
        let mut order_heap = self.order_heap();
        if order_heap.in_heap(v) {
            order_heap.decrease(v);
        }
    }

    /// Number of variables whose saved phase moved since the previous
    /// call, which then takes the current phases as reference.
    pub fn phase_hamming_distance(&mut self) -> u32 {
        let mut dist = 0;
        for (v, p) in self.polarity.iter() {
            if self.prev_polarity[v] != *p {
                dist += 1;
            }
        }
        for (v, p) in self.polarity.iter() {
            self.prev_polarity[v] = *p;
        }
        dist
    }
}
