/*****************************************************************************************[mod.rs]
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

//! Helpers shared by the integration tests.

#![allow(dead_code)]

use lbdsat::*;

pub fn lits(c: &[i32]) -> Vec<Lit> {
    c.iter().map(|&i| Lit::from_dimacs(i)).collect()
}

/// Solver over `n_vars` variables with `clauses` added. Contradictory
/// clause sets are fine, the solver is just not `ok` anymore.
pub fn solver_with<C: AsRef<[i32]>>(opts: SolverOpts, n_vars: u32, clauses: &[C]) -> BasicSolver {
    let mut s = BasicSolver::new(opts, Default::default());
    s.ensure_capacity(n_vars);
    for c in clauses {
        s.add_clause(&lits(c.as_ref())).unwrap();
    }
    s
}

/// Is `m` (bit `i` = value of variable `i+1`) a model of `clauses`?
pub fn satisfies<C: AsRef<[i32]>>(m: u32, clauses: &[C]) -> bool {
    clauses.iter().all(|c| {
        c.as_ref().iter().any(|&l| {
            let v = (m >> (l.unsigned_abs() - 1)) & 1 == 1;
            v == (l > 0)
        })
    })
}

/// Number of models, by enumeration.
pub fn count_models<C: AsRef<[i32]>>(n_vars: u32, clauses: &[C]) -> usize {
    (0u32..1 << n_vars).filter(|&m| satisfies(m, clauses)).count()
}

pub fn brute_force<C: AsRef<[i32]>>(n_vars: u32, clauses: &[C]) -> bool {
    count_models(n_vars, clauses) > 0
}

/// `holes + 1` pigeons in `holes` holes: every pigeon in some hole, no
/// hole with two pigeons.
pub fn pigeonhole(holes: u32) -> (u32, Vec<Vec<i32>>) {
    let var = |p: u32, h: u32| (p * holes + h + 1) as i32;
    let mut clauses = vec![];
    for p in 0..=holes {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p in 0..=holes {
            for q in (p + 1)..=holes {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    ((holes + 1) * holes, clauses)
}

/// Random 3-CNF, from a xorshift generator.
pub fn random_3sat(n_vars: u32, n_clauses: usize, mut seed: u64) -> Vec<Vec<i32>> {
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };
    (0..n_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let r = next();
                    let v = (r % n_vars as u64) as i32 + 1;
                    if (r >> 32) & 1 == 0 {
                        v
                    } else {
                        -v
                    }
                })
                .collect()
        })
        .collect()
}

/// Reduce (and maybe compact) as often as allowed, restart at every conflict.
pub fn forced_reduce() -> SolverOpts {
    SolverOpts {
        reduce_first: 1,
        reduce_increment: 1,
        restarts: RestartPolicy::EveryConflict,
        garbage_frac: 0.01,
        ..SolverOpts::default()
    }
}

pub fn forced_restart() -> SolverOpts {
    SolverOpts {
        restarts: RestartPolicy::EveryConflict,
        ..SolverOpts::default()
    }
}

pub fn no_reduce() -> SolverOpts {
    SolverOpts {
        reduce: false,
        restarts: RestartPolicy::Never,
        pure_literals: false,
        ..SolverOpts::default()
    }
}

pub fn all_opts() -> Vec<SolverOpts> {
    vec![
        SolverOpts::default(),
        forced_reduce(),
        forced_restart(),
        no_reduce(),
        SolverOpts {
            ccmin_mode: 1,
            phase_saving: 1,
            vivify_min_size: 3,
            ..SolverOpts::default()
        },
        SolverOpts {
            ccmin_mode: 0,
            phase_saving: 0,
            keep_original_clauses: false,
            ..SolverOpts::default()
        },
    ]
}
