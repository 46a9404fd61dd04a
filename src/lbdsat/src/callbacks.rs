/***********************************************************************************[callbacks.rs]
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

use crate::core::State;

/// Basic callbacks to the solver
///
/// Typically intended for printing/statistics. None of them can change
/// the outcome of a search, except `stop`.
pub trait Callbacks {
    /// Called before starting to solve
    fn on_start(&mut self) {}

    /// Called after each restart (the trail is back at level 0)
    fn on_restart(&mut self) {}

    /// Called whenever the solver simplifies its set of clauses at level 0
    fn on_simplify(&mut self) {}

    /// Called after a reduction of the learnt clause database
    fn on_reduce(&mut self, _learnts_before: usize, _learnts_after: usize) {}

    /// Called after a clause arena compaction, with sizes in bytes
    fn on_gc(&mut self, _old_size: usize, _new_size: usize) {}

    /// Called regularly to indicate progress, if verbosity is positive
    fn on_progress(&mut self, _f: &ProgressStatus) {}

    /// Called when a result is computed
    fn on_result(&mut self, _s: State) {}

    /// Should we stop? called once per search loop iteration
    fn stop(&self) -> bool {
        false
    }
}

/// Progress indicator from the SAT solver.
///
/// This is given to `Callbacks` regularly so it can log it somehow.
#[derive(Debug, Clone, Copy)]
pub struct ProgressStatus {
    pub conflicts: u64,
    pub restarts: u64,
    pub reduces: u64,
    pub n_clauses: u64,
    pub n_binary: u64,
    pub n_learnts: u64,
    pub n_frozen: u64,
    pub lbd_mean: f64,
    pub progress_estimate: f64,
}

/// Basic set of callbacks
///
/// This doesn't do anything except storing a function to `stop`
#[derive(Default)]
pub struct Basic {
    stop: Option<Box<dyn Fn() -> bool>>,
}

impl Callbacks for Basic {
    fn stop(&self) -> bool {
        match self.stop {
            None => false,
            Some(ref f) => f(),
        }
    }
}

impl Basic {
    /// Allocate a new set of callbacks
    pub fn new() -> Self {
        Basic { stop: None }
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.stop = Some(Box::new(f));
    }
}
