use crate::formula::Variable;
use log::trace;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Assignment {
    True,
    False,
    Undecided,
}

impl Assignment {
    pub(crate) fn as_bool(self) -> Option<bool> {
        match self {
            Assignment::True => Some(true),
            Assignment::False => Some(false),
            Assignment::Undecided => None,
        }
    }
}

/// Dense index of a variable inside the solver, in `[0, n)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub(crate) struct VarIdx(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct ClauseIdx(pub usize);

/// A literal over a dense variable index.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Lit {
    pub positive: bool,
    pub var: VarIdx,
}

impl Lit {
    pub(crate) fn new(var: VarIdx, positive: bool) -> Self {
        Self { positive, var }
    }

    pub(crate) fn negated(self) -> Self {
        Self {
            positive: !self.positive,
            var: self.var,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", if self.positive { "" } else { "!" }, self.var.0)
    }
}

/// One appearance of a variable in a clause.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Occurrence {
    pub clause: ClauseIdx,
    pub positive: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct VariableState {
    pub original: Variable,
    pub assignment: Assignment,
    /// Filled once while indexing and never changed during search.
    pub occurrences: Vec<Occurrence>,
}

impl VariableState {
    pub(crate) fn new(original: Variable) -> Self {
        Self {
            original,
            assignment: Assignment::Undecided,
            occurrences: vec![],
        }
    }

    pub(crate) fn is_assigned(&self) -> bool {
        self.assignment != Assignment::Undecided
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ClauseState {
    /// Deduplicated: at most one literal per (variable, polarity).
    pub literals: Vec<Lit>,
    /// Number of literals whose variable is unassigned.
    pub free_count: usize,
    pub satisfied: bool,
    /// Holds some variable with both polarities, so it is satisfied under
    /// every assignment.
    pub tautology: bool,
}

impl ClauseState {
    /// True iff the clause holds under `variables`, looking only at assigned
    /// literals.
    fn evaluate(&self, variables: &[VariableState]) -> bool {
        self.tautology
            || self.literals.iter().any(|l| {
                let assignment = variables[l.var.0].assignment;
                assignment == if l.positive { Assignment::True } else { Assignment::False }
            })
    }

    pub(crate) fn is_falsified(&self) -> bool {
        !self.satisfied && self.free_count == 0
    }
}

/// How a variable got its value, which decides how it is undone.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Origin {
    /// Unit propagation or pure-literal elimination. Undoing it returns the
    /// variable to the undecided pool.
    Implied,
    /// A branch choice. Undoing it leaves the variable out of the pool until
    /// the search abandons the branch point entirely.
    Decision,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct UndoEntry {
    pub variable: VarIdx,
    pub origin: Origin,
}

/// Raised when an assignment leaves a clause with every literal false.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Conflict(pub ClauseIdx);

/// Assignments, per-clause `(free_count, satisfied)`, the undecided pool and
/// the undo log length.
#[cfg(test)]
pub(crate) type Snapshot = (Vec<Assignment>, Vec<(usize, bool)>, Vec<VarIdx>, usize);

/// The whole mutable search state: variables and clauses cross-reference
/// each other by index only.
#[derive(Debug, Clone)]
pub(crate) struct SolverState {
    pub variables: Vec<VariableState>,
    pub clauses: Vec<ClauseState>,
    /// Unassigned variables that occur in some clause and are not held by an
    /// open branch point.
    pub undecided: BTreeSet<VarIdx>,
    pub trail: Vec<UndoEntry>,
}

impl SolverState {
    pub(crate) fn value_of(&self, lit: Lit) -> Assignment {
        match self.variables[lit.var.0].assignment {
            Assignment::Undecided => Assignment::Undecided,
            Assignment::True if lit.positive => Assignment::True,
            Assignment::False if !lit.positive => Assignment::True,
            _ => Assignment::False,
        }
    }

    /// Makes `lit` true and updates every clause the variable occurs in.
    /// All clauses are updated even when one of them becomes falsified, so
    /// the bookkeeping stays exact for the undo that follows.
    pub(crate) fn assign(&mut self, lit: Lit, origin: Origin) -> Result<(), Conflict> {
        debug_assert_eq!(self.value_of(lit), Assignment::Undecided);
        trace!(
            "{} {}",
            match origin {
                Origin::Implied => "implied",
                Origin::Decision => "decision",
            },
            lit
        );

        let SolverState {
            variables,
            clauses,
            undecided,
            trail,
        } = self;

        variables[lit.var.0].assignment = if lit.positive {
            Assignment::True
        } else {
            Assignment::False
        };
        undecided.remove(&lit.var);
        trail.push(UndoEntry {
            variable: lit.var,
            origin,
        });

        let mut conflict = None;
        for occurrence in &variables[lit.var.0].occurrences {
            let clause = &mut clauses[occurrence.clause.0];
            debug_assert!(clause.free_count > 0);
            clause.free_count -= 1;
            clause.satisfied = clause.evaluate(variables);
            if conflict.is_none() && clause.is_falsified() {
                conflict = Some(Conflict(occurrence.clause));
            }
        }

        match conflict {
            Some(conflict) => Err(conflict),
            None => Ok(()),
        }
    }

    fn unassign(&mut self, entry: UndoEntry) {
        trace!("undo x{}", entry.variable.0);

        let SolverState {
            variables,
            clauses,
            undecided,
            ..
        } = self;

        variables[entry.variable.0].assignment = Assignment::Undecided;
        if entry.origin == Origin::Implied {
            undecided.insert(entry.variable);
        }
        for occurrence in &variables[entry.variable.0].occurrences {
            let clause = &mut clauses[occurrence.clause.0];
            clause.free_count += 1;
            clause.satisfied = clause.evaluate(variables);
        }
    }

    /// Pops and reverses undo entries until the trail is `mark` long.
    pub(crate) fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(entry) = self.trail.pop() {
                self.unassign(entry);
            }
        }
    }

    /// Returns a branch variable that was held out of the pool.
    pub(crate) fn release(&mut self, var: VarIdx) {
        debug_assert!(!self.variables[var.0].is_assigned());
        self.undecided.insert(var);
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Snapshot {
        (
            self.variables.iter().map(|v| v.assignment).collect(),
            self.clauses.iter().map(|c| (c.free_count, c.satisfied)).collect(),
            self.undecided.iter().copied().collect(),
            self.trail.len(),
        )
    }

    pub(crate) fn find_falsified(&self) -> Option<ClauseIdx> {
        self.clauses.iter().position(ClauseState::is_falsified).map(ClauseIdx)
    }

    pub(crate) fn all_satisfied(&self) -> bool {
        self.clauses.iter().all(|c| c.satisfied)
    }

    /// Occurrences of `var` in clauses that are not yet satisfied.
    pub(crate) fn live_occurrences(&self, var: VarIdx) -> impl Iterator<Item = &Occurrence> + '_ {
        let clauses = &self.clauses;
        self.variables[var.0]
            .occurrences
            .iter()
            .filter(move |o| !clauses[o.clause.0].satisfied)
    }

    /// The first undecided variable that still matters to some unsatisfied
    /// clause.
    pub(crate) fn pick_branch(&self) -> Option<VarIdx> {
        self.undecided
            .iter()
            .copied()
            .find(|&var| self.live_occurrences(var).next().is_some())
    }
}
