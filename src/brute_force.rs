use crate::formula::{Formula, Variable};
use std::collections::HashMap;

// Exhaustive oracle for the property tests: tries all 2^n assignments
pub(crate) fn solve_brute_force(f: &Formula) -> bool {
    // the declared range adds no constraints, so only mentioned variables get a bit
    let bit: HashMap<Variable, usize> = f.variables().enumerate().map(|(i, &v)| (v, i)).collect();
    let num_variables = bit.len();
    assert!(num_variables <= 16); // just for safety

    'search: for assignment in 0..2u32.pow(num_variables as u32) {
        'clauses: for clause in f.clauses() {
            for literal in clause.literals() {
                let value = assignment & (1 << bit[literal.variable()]) != 0;
                if value == literal.is_positive() {
                    // this clause is satisfied, let's go to the next one
                    continue 'clauses;
                }
            }
            // if we got here, this clause was not satisfied, so this assignment is bogus
            continue 'search;
        }
        // if we got here, every clause was satisfied, so we're done and satisfiable
        return true;
    }
    // no assignment is valid
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{n, p, Clause};

    #[test]
    fn solve_bcp_sat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let f = Formula::new(vec![c1, c2]);

        assert!(solve_brute_force(&f));
    }

    #[test]
    fn solve_bcp_unsat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let c3 = Clause::new(vec![n(1)]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert!(!solve_brute_force(&f));
    }

    #[test]
    fn sparse_identifiers() {
        let c1 = Clause::new(vec![p(100), p(7)]);
        let c2 = Clause::new(vec![n(100)]);
        let c3 = Clause::new(vec![n(7), p(100)]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert!(!solve_brute_force(&f));
    }

    #[test]
    fn empty_formula_and_empty_clause() {
        assert!(solve_brute_force(&Formula::new(vec![])));
        assert!(!solve_brute_force(&Formula::new(vec![Clause::new(vec![])])));
    }
}
