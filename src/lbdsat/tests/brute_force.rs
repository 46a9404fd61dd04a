/*********************************************************************************[brute_force.rs]
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

//! Randomized small formulas, checked against enumeration of all
//! assignments.

mod common;

use {common::*, lbdsat::*, proptest::prelude::*};

/// Up to 8 variables, up to 40 clauses of 1 to 4 literals.
fn cnf() -> impl Strategy<Value = (u32, Vec<Vec<i32>>)> {
    (1u32..=8).prop_flat_map(|n| {
        let lit = (1..=n as i32, any::<bool>()).prop_map(|(v, pos)| if pos { v } else { -v });
        (Just(n), prop::collection::vec(prop::collection::vec(lit, 1..=4), 0..=40))
    })
}

/// Same, but sometimes with the highest variable only in negative
/// polarity.
fn cnf_maybe_last_negative() -> impl Strategy<Value = (u32, Vec<Vec<i32>>)> {
    (cnf(), any::<bool>()).prop_map(|((n, mut clauses), last_negative)| {
        if last_negative {
            let last = n as i32;
            for c in clauses.iter_mut() {
                for l in c.iter_mut() {
                    if *l == last {
                        *l = -last;
                    }
                }
            }
            clauses.push(vec![-last, 1]);
        }
        (n, clauses)
    })
}

fn cnf_with_presumptions() -> impl Strategy<Value = (u32, Vec<Vec<i32>>, Vec<i32>)> {
    cnf().prop_flat_map(|(n, clauses)| {
        let lit = (1..=n as i32, any::<bool>()).prop_map(|(v, pos)| if pos { v } else { -v });
        (Just(n), Just(clauses), prop::collection::vec(lit, 0..=4))
    })
}

/// Model of the last `solve` as a bitmask over the first `n` variables.
fn model_mask(s: &BasicSolver, n: u32) -> u32 {
    (1..=n).fold(0, |m, v| {
        if s.value_lit(Lit::from_dimacs(v as i32)) == lbool::TRUE {
            m | 1 << (v - 1)
        } else {
            m
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn verdict_matches_enumeration((n, clauses) in cnf_maybe_last_negative()) {
        let expected = brute_force(n, &clauses);
        for opts in all_opts() {
            let mut s = solver_with(opts, n, &clauses);
            let st = s.solve().unwrap();
            prop_assert_eq!(st == State::Sat, expected, "{:?}", clauses);
            if st == State::Sat {
                prop_assert!(s.validate());
                prop_assert!(satisfies(model_mask(&s, n), &clauses));
            } else {
                prop_assert_eq!(st, State::Unsat);
                prop_assert!(s.unsat_core().is_empty());
            }
            if s.is_ok() {
                prop_assert!(s.check_invariants());
            }
            prop_assert_eq!(s.decision_level(), 0);
        }
    }

    #[test]
    fn presumptions_and_cores((n, clauses, presumptions) in cnf_with_presumptions()) {
        let mut with_units = clauses.clone();
        with_units.extend(presumptions.iter().map(|&l| vec![l]));
        let expected = brute_force(n, &with_units);

        for opts in all_opts() {
            let mut s = solver_with(opts, n, &clauses);
            let st = s.solve_with(&lits(&presumptions)).unwrap();
            prop_assert_eq!(st == State::Sat, expected);
            if st == State::Sat {
                prop_assert!(satisfies(model_mask(&s, n), &with_units));
                continue;
            }
            // the core holds negations of presumptions, and those
            // presumptions alone already contradict the clauses
            let mut core_units = clauses.clone();
            for l in s.unsat_core() {
                let p = -l.to_dimacs();
                prop_assert!(presumptions.contains(&p), "core {:?}", s.unsat_core());
                core_units.push(vec![p]);
            }
            prop_assert!(!brute_force(n, &core_units));

            // presumptions are dropped after each call
            prop_assert_eq!(s.solve().unwrap() == State::Sat, brute_force(n, &clauses));
        }
    }

    #[test]
    fn blocking_clauses_count_models((n, clauses) in cnf().prop_filter("small", |(n, _)| *n <= 6)) {
        let expected = count_models(n, &clauses);
        for opts in all_opts() {
            let mut s = solver_with(opts, n, &clauses);
            let mut found = 0;
            while s.solve().unwrap() == State::Sat {
                found += 1;
                prop_assert!(found <= expected);
                let blocking: Vec<Lit> = (1..=n as i32)
                    .map(|v| {
                        let l = Lit::from_dimacs(v);
                        if s.value_lit(l) == lbool::TRUE {
                            !l
                        } else {
                            l
                        }
                    })
                    .collect();
                s.add_clause(&blocking).unwrap();
            }
            prop_assert_eq!(found, expected);
        }
    }
}
