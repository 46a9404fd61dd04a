/***********************************************************************************[scenarios.rs]
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

mod common;

use {common::*, lbdsat::*};

#[test]
fn test_small_sat() {
    let mut s = solver_with(SolverOpts::default(), 2, &[vec![1, 2], vec![-1, 2], vec![1, -2]]);
    assert_eq!(s.solve().unwrap(), State::Sat);
    assert_eq!(s.value_lit(Lit::from_dimacs(1)), lbool::TRUE);
    assert_eq!(s.value_lit(Lit::from_dimacs(2)), lbool::TRUE);
    assert!(s.validate());
    assert!(Solver::<BasicCallbacks>::check_clause_set_satisfiability(
        s.original_clauses(),
        s.get_model()
    ));
}

#[test]
fn test_contradictory_units() {
    let mut s = solver_with(SolverOpts::default(), 1, &[vec![1]]);
    assert!(!s.add_clause(&lits(&[-1])).unwrap());
    assert_eq!(s.solve().unwrap(), State::Unsat);
    assert_eq!(s.decision_level(), 0);
    assert_eq!(s.num_decisions(), 0);
    assert!(!s.is_ok());
    // no core: unsat without presumptions
    assert!(s.unsat_core().is_empty());
    // stays unsat
    assert!(!s.add_clause(&lits(&[1])).unwrap());
    assert_eq!(s.solve().unwrap(), State::Unsat);
}

#[test]
fn test_pigeonhole() {
    for holes in 2..=6 {
        let (n, clauses) = pigeonhole(holes);
        let mut s = solver_with(SolverOpts::default(), n, &clauses);
        assert_eq!(s.solve().unwrap(), State::Unsat, "php({})", holes);
        assert!(!s.is_ok());
        assert!(s.num_conflicts() > 0);
    }
}

#[test]
fn test_pigeonhole_restarts() {
    let (n, clauses) = pigeonhole(5);
    let mut s = solver_with(forced_restart(), n, &clauses);
    assert_eq!(s.solve().unwrap(), State::Unsat);
    assert!(s.num_restarts() > 0);

    let mut s = solver_with(forced_reduce(), n, &clauses);
    assert_eq!(s.solve().unwrap(), State::Unsat);
    assert!(s.num_reduces() > 0);
}

#[test]
fn test_forced_reduce_terminates() {
    for holes in 5..=6 {
        let (n, clauses) = pigeonhole(holes);
        let mut s = solver_with(forced_reduce(), n, &clauses);
        s.set_conflict_budget(300_000);
        assert_eq!(s.solve().unwrap(), State::Unsat, "php({})", holes);
        assert!(s.num_reduces() > 1);
    }
}

#[test]
fn test_last_var_only_negative() {
    // the highest variable occurs negatively, in some cases only so
    let cnfs: Vec<(u32, Vec<Vec<i32>>)> = vec![
        (2, vec![vec![1, 2], vec![-1, 2], vec![1, -2]]),
        (3, vec![vec![1, -3], vec![-1, 2], vec![-2, -3]]),
        (4, vec![vec![1, 2, -4], vec![-1, -2], vec![2, 3], vec![-3, -4]]),
        (3, vec![vec![-3], vec![1, 2], vec![-1, -2]]),
    ];
    for (n, clauses) in &cnfs {
        let expected = brute_force(*n, clauses);
        for opts in all_opts() {
            let mut s = solver_with(opts, *n, clauses);
            assert_eq!(s.solve().unwrap() == State::Sat, expected, "{:?}", clauses);
            assert!(s.validate() || !expected);
        }
    }
}

#[test]
fn test_pigeonhole_minus_one_pigeon() {
    // `holes` pigeons fit
    let holes = 5;
    let (n, mut clauses) = pigeonhole(holes);
    let last = (holes * holes + 1) as i32;
    clauses.retain(|c| !c.iter().any(|&l| l.abs() >= last));
    let mut s = solver_with(SolverOpts::default(), n, &clauses);
    assert_eq!(s.solve().unwrap(), State::Sat);
    assert!(s.validate());
}

#[test]
fn test_presumption_against_unit() {
    let mut s = solver_with(SolverOpts::default(), 3, &[vec![1], vec![2, 3]]);
    assert_eq!(s.solve_with(&lits(&[-1])).unwrap(), State::Unsat);
    assert_eq!(s.num_decisions(), 0);
    assert_eq!(s.unsat_core(), &lits(&[1])[..]);
    assert!(s.is_ok());
    assert_eq!(s.solve().unwrap(), State::Sat);
}

#[test]
fn test_complementary_presumptions() {
    let mut s = solver_with(SolverOpts::default(), 3, &[vec![1, 2, 3]]);
    assert_eq!(s.solve_with(&lits(&[2, 3, -2])).unwrap(), State::Unsat);
    assert!(s.unsat_core_contains_lit(Lit::from_dimacs(2)));
    assert!(s.unsat_core_contains_lit(Lit::from_dimacs(-2)));
    assert!(!s.unsat_core_contains_var(Var::from_dimacs(3)));
    assert!(s.is_ok());
}

#[test]
fn test_unsat_core_subset() {
    // 1 & 2 -> 4, 4 -> -5: presumptions 1, 2, 3, 5 fail because of 1, 2 and 5
    let mut s = solver_with(
        SolverOpts::default(),
        6,
        &[vec![-1, -2, 4], vec![-4, -5], vec![3, 6]],
    );
    assert_eq!(s.solve_with(&lits(&[1, 3, 2, 5])).unwrap(), State::Unsat);
    assert!(s.is_ok());
    let core = s.unsat_core().to_vec();
    assert!(!core.is_empty());
    for &l in &core {
        assert!(lits(&[-1, -2, -3, -5]).contains(&l), "{:?} not a negated presumption", l);
    }
    assert!(!s.unsat_core_contains_lit(Lit::from_dimacs(-3)));
    assert_eq!(s.solve_with(&lits(&[1, 3, 2])).unwrap(), State::Sat);
    assert_eq!(s.value_lit(Lit::from_dimacs(4)), lbool::TRUE);
}

#[test]
fn test_incremental_enumeration() {
    let clauses = vec![vec![1, 2, 3], vec![-1, -2], vec![-2, -3, 4]];
    let n = 4;
    let expected = count_models(n, &clauses);
    let mut s = solver_with(SolverOpts::default(), n, &clauses);
    let mut found = 0;
    while s.solve().unwrap() == State::Sat {
        assert!(s.validate());
        found += 1;
        let block: Vec<Lit> = (0..n)
            .map(|i| {
                let v = Var::from_dimacs(i + 1);
                Lit::new(v, s.value_var(v) != lbool::TRUE)
            })
            .collect();
        s.add_clause(&block).unwrap();
        assert!(found <= expected);
    }
    assert_eq!(found, expected);
}

#[test]
fn test_simplify_keeps_verdict() {
    for seed in 1..20 {
        let clauses = random_3sat(12, 50, seed);
        let mut s = solver_with(SolverOpts::default(), 12, &clauses);
        s.add_clause(&lits(&[(seed % 12) as i32 + 1])).unwrap();
        let mut all = clauses.clone();
        all.push(vec![(seed % 12) as i32 + 1]);
        let expected = brute_force(12, &all);
        if s.simplify().unwrap() {
            assert!(s.check_invariants());
        }
        let res = s.solve().unwrap();
        assert_eq!(res == State::Sat, expected, "seed {}", seed);
    }
}

#[test]
fn test_compaction_and_restart_transparency() {
    for seed in 1..25 {
        let clauses = random_3sat(50, 213, seed * 7919);
        let verdicts: Vec<State> = all_opts()
            .into_iter()
            .map(|opts| {
                let mut s = solver_with(opts, 50, &clauses);
                let res = s.solve().unwrap();
                if res == State::Sat {
                    assert!(s.validate(), "seed {}", seed);
                }
                assert!(!s.is_ok() || s.check_invariants(), "seed {}", seed);
                res
            })
            .collect();
        assert!(verdicts.iter().all(|&v| v == verdicts[0]), "seed {}: {:?}", seed, verdicts);
    }
}

#[test]
fn test_learnt_database_maintenance() {
    let (n, clauses) = pigeonhole(7);
    let mut s = solver_with(forced_reduce(), n, &clauses);
    s.set_conflict_budget(3000);
    let res = s.solve().unwrap();
    assert!(res == State::Unknown || res == State::Unsat);
    assert!(s.num_reduces() > 0);
    assert!(!s.is_ok() || s.check_invariants());
    let learnts: u64 = s.lbd_distribution().iter().sum();
    assert_eq!(learnts, s.learnt_clauses().count() as u64);
    assert!(s.num_frozen() <= learnts);
    assert!(s.memory_footprint() > 0);
}

#[test]
fn test_non_decision_var() {
    let mut s = solver_with(SolverOpts::default(), 3, &[vec![1, 2]]);
    s.set_decision_var(Var::from_dimacs(3), false).unwrap();
    assert_eq!(s.solve().unwrap(), State::Sat);
    assert_eq!(s.value_var(Var::from_dimacs(3)), lbool::UNDEF);
    assert!(s.validate());
}
