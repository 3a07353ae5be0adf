use super::state::{ClauseIdx, ClauseState, Lit, Occurrence, SolverState, VarIdx, VariableState};
use crate::formula::{Formula, Variable};
use log::debug;
use std::collections::HashMap;

impl SolverState {
    /// Numbers the formula's variables densely in ascending order of their
    /// identifiers and builds the clause and occurrence tables.
    pub(crate) fn new(formula: &Formula) -> Self {
        let mut variables: Vec<VariableState> = formula.variables().map(|&v| VariableState::new(v)).collect();
        let variable_map: HashMap<Variable, VarIdx> = variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.original, VarIdx(i)))
            .collect();

        let mut clauses = Vec::with_capacity(formula.num_clauses());
        for (idx, clause) in formula.clauses().enumerate() {
            let mut literals: Vec<Lit> = Vec::with_capacity(clause.len());
            for literal in clause.literals() {
                let lit = Lit::new(variable_map[literal.variable()], literal.is_positive());
                if !literals.contains(&lit) {
                    literals.push(lit);
                }
            }
            let tautology = literals.iter().any(|l| literals.contains(&l.negated()));

            for lit in &literals {
                variables[lit.var.0].occurrences.push(Occurrence {
                    clause: ClauseIdx(idx),
                    positive: lit.positive,
                });
            }

            clauses.push(ClauseState {
                free_count: literals.len(),
                satisfied: tautology,
                tautology,
                literals,
            });
        }

        debug!(
            "indexed {} variables, {} clauses ({} tautological)",
            variables.len(),
            clauses.len(),
            clauses.iter().filter(|c| c.tautology).count()
        );

        // Variables without occurrences are never branched on; the model
        // reports them as false.
        let undecided = (0..variables.len())
            .filter(|&i| !variables[i].occurrences.is_empty())
            .map(VarIdx)
            .collect();
        Self {
            variables,
            clauses,
            undecided,
            trail: vec![],
        }
    }

    /// An empty clause can never be satisfied.
    pub(crate) fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(|c| c.literals.is_empty())
    }

    /// Current value of every variable, keyed by its external identifier.
    pub(crate) fn assignments(&self) -> impl Iterator<Item = (Variable, Option<bool>)> + '_ {
        self.variables
            .iter()
            .map(|v| (v.original, v.assignment.as_bool()))
    }

    #[cfg(test)]
    pub(crate) fn is_unassigned(&self) -> bool {
        self.variables.iter().all(|v| !v.is_assigned())
    }
}
