use super::state::{Assignment, Conflict, Lit, Origin, SolverState, VarIdx};

/// Assignments made by one call to [`SolverState::propagate`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub(crate) struct Propagated {
    pub units: usize,
    pub pure: usize,
}

impl SolverState {
    /// Assigns the remaining literal of every unsatisfied clause with one free
    /// literal, until a full pass over the clauses assigns nothing.
    pub(crate) fn unit_propagate(&mut self) -> Result<usize, Conflict> {
        let mut assigned = 0;
        let mut did_work = true;
        while did_work {
            did_work = false;
            for idx in 0..self.clauses.len() {
                let clause = &self.clauses[idx];
                if clause.satisfied || clause.free_count != 1 {
                    continue;
                }
                let unit = clause
                    .literals
                    .iter()
                    .copied()
                    .find(|&l| self.value_of(l) == Assignment::Undecided);
                debug_assert!(unit.is_some(), "free_count out of sync in clause {}", idx);
                if let Some(lit) = unit {
                    self.assign(lit, Origin::Implied)?;
                    assigned += 1;
                    did_work = true;
                }
            }
        }
        Ok(assigned)
    }

    /// Assigns every unassigned variable that appears with a single polarity
    /// across the clauses that are not yet satisfied, until a full pass
    /// assigns nothing.
    pub(crate) fn eliminate_pure_literals(&mut self) -> Result<usize, Conflict> {
        let mut assigned = 0;
        let mut did_work = true;
        while did_work {
            did_work = false;
            for idx in 0..self.variables.len() {
                if self.variables[idx].is_assigned() {
                    continue;
                }
                if let Some(lit) = self.pure_literal(VarIdx(idx)) {
                    self.assign(lit, Origin::Implied)?;
                    assigned += 1;
                    did_work = true;
                }
            }
        }
        Ok(assigned)
    }

    /// The polarity `var` takes in every live occurrence, if there is at least
    /// one and they all agree.
    fn pure_literal(&self, var: VarIdx) -> Option<Lit> {
        let mut occurrences = self.live_occurrences(var);
        let polarity = occurrences.next()?.positive;
        if occurrences.all(|o| o.positive == polarity) {
            Some(Lit::new(var, polarity))
        } else {
            None
        }
    }

    /// Runs both rules, interleaved, to a common fixpoint.
    pub(crate) fn propagate(&mut self, pure_literals: bool) -> Result<Propagated, Conflict> {
        let mut propagated = Propagated::default();
        loop {
            propagated.units += self.unit_propagate()?;
            if !pure_literals {
                return Ok(propagated);
            }
            match self.eliminate_pure_literals()? {
                0 => return Ok(propagated),
                n => propagated.pure += n,
            }
        }
    }
}
