/***********************************************************************************[interface.rs]
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
    clause::{lbool, Lit, Var},
    core::State,
    error::Result,
};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, and check for satisfiability
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_learnts(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;
    fn num_restarts(&self) -> u64;
    fn num_reduces(&self) -> u64;

    /// `false` once the clauses are known to be unsatisfiable.
    fn is_ok(&self) -> bool;

    /// Result of the last `solve`, or `Unknown` if clauses were added since.
    fn state(&self) -> State;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver. If 'decision' is cleared, variable will not be
    /// used as a decision variable (NOTE! This has effects on the meaning of a SATISFIABLE result).
    ///
    /// `upol` is the polarity tried first, `UNDEF` for the default one.
    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var;

    /// Create a new variable with the default polarity
    fn new_var_default(&mut self) -> Var;

    /// Add a clause to the solver. Returns `Ok(false)` if the solver is in
    /// an `UNSAT` state.
    ///
    /// The clause is used as scratch space and left in an unspecified state.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> Result<bool>;

    /// Add a clause to the solver, see `add_clause_reuse`.
    fn add_clause(&mut self, clause: &[Lit]) -> Result<bool> {
        let mut c = clause.to_vec();
        self.add_clause_reuse(&mut c)
    }

    /// Add the unit clause `lit`.
    fn add_unit(&mut self, lit: Lit) -> Result<bool> {
        self.add_clause(&[lit])
    }

    /// Assume `lit` during the next call to `solve`.
    fn add_presumption(&mut self, lit: Lit) -> Result<()>;

    /// Simplify the clause database according to the current top-level assigment.
    ///
    /// Returns `Ok(false)` if the clauses are found unsatisfiable.
    fn simplify(&mut self) -> Result<bool>;

    /// Search for a model of the clauses under the presumptions given so far.
    ///
    /// Presumptions only last for this call.
    fn solve(&mut self) -> Result<State>;

    /// `add_presumption` for each literal, then `solve`.
    fn solve_with(&mut self, presumptions: &[Lit]) -> Result<State>;

    /// Obtain the slice of literals that are proved at level 0.
    ///
    /// These literals will keep this value from now on.
    fn proved_at_lvl_0(&self) -> &[Lit];

    /// Query whole model
    ///
    /// Precondition: last result was `Sat`, or `Interrupted` for a partial one
    fn get_model(&self) -> &[lbool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat`, or `Interrupted` for a partial one
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit
    fn value_lit(&self, lit: Lit) -> lbool {
        self.value_var(lit.var()) ^ !lit.sign()
    }

    /// Value of this literal if it's assigned at level 0, or `UNDEF` otherwise
    fn value_lvl_0(&self, lit: Lit) -> lbool;

    /// Return unsat core, as the negation of a subset of the presumptions.
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core(&self) -> &[Lit];

    /// Does this literal occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_lit(&self, lit: Lit) -> bool;

    /// Does this variable occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_var(&self, v: Var) -> bool {
        let lit = Lit::new(v, true);
        self.unsat_core_contains_lit(lit) || self.unsat_core_contains_lit(!lit)
    }

    /// Check the model against the original clauses.
    ///
    /// Precondition: last result was `Sat`, and original clauses are kept
    fn validate(&self) -> bool;
}
