mod index;
mod propagate;
mod state;

#[cfg(test)]
use self::state::Snapshot;
use self::state::{Conflict, Lit, Origin, SolverState, VarIdx};
use crate::formula::Formula;
use crate::model::Model;
use crate::SatResult;
use log::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverOptions {
    /// Rerun pure-literal elimination alongside unit propagation at every
    /// search node.
    pub pure_literals: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { pure_literals: true }
    }
}

/// Counters for the most recent call to [`Solver::solve`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct SolveStats {
    pub decisions: usize,
    pub propagations: usize,
    pub pure_literals: usize,
    pub conflicts: usize,
    pub backtracks: usize,
}

/// An open branch point: the variable, where the undo log stood just before
/// it was assigned, and whether `false` is still left to try.
#[derive(Debug)]
struct Frame {
    variable: VarIdx,
    mark: usize,
    polarity: bool,
    #[cfg(test)]
    before: Snapshot,
}

/// A DPLL solver: unit propagation and pure-literal elimination at every
/// node, chronological backtracking over a single undo log.
pub struct Solver {
    state: SolverState,
    declared: usize,
    options: SolverOptions,
    stats: SolveStats,
    /// (depth, state before the branch, state after it was abandoned) for
    /// every branch point the search has exhausted.
    #[cfg(test)]
    unwound: Vec<(usize, Snapshot, Snapshot)>,
}

impl Solver {
    pub fn new(formula: &Formula) -> Self {
        Self::with_options(formula, SolverOptions::default())
    }

    pub fn with_options(formula: &Formula, options: SolverOptions) -> Self {
        Self {
            state: SolverState::new(formula),
            declared: formula.declared_variables(),
            options,
            stats: SolveStats::default(),
            #[cfg(test)]
            unwound: vec![],
        }
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Decides the formula. The solver is left as it was before the call,
    /// so solving again gives the same answer.
    pub fn solve(&mut self) -> SatResult {
        self.stats = SolveStats::default();

        if self.state.has_empty_clause() {
            debug!("formula contains an empty clause");
            return SatResult::Unsatisfiable;
        }

        let mut frames = vec![];
        let result = if self.search(&mut frames) {
            SatResult::Satisfiable(Model::new(self.state.assignments(), self.declared))
        } else {
            SatResult::Unsatisfiable
        };

        self.state.undo_to(0);
        for frame in frames {
            self.state.release(frame.variable);
        }

        debug!("{:?} after {:?}", result.is_satisfiable(), self.stats);
        result
    }

    /// Depth-first search with an explicit stack of branch points. Returns
    /// with the satisfying assignment still in place, or `false` once every
    /// branch point is exhausted.
    fn search(&mut self, frames: &mut Vec<Frame>) -> bool {
        loop {
            let failed = match self.state.propagate(self.options.pure_literals) {
                Err(Conflict(clause)) => {
                    trace!("conflict in clause {}", clause.0);
                    true
                }
                Ok(propagated) => {
                    self.stats.propagations += propagated.units;
                    self.stats.pure_literals += propagated.pure;

                    if let Some(clause) = self.state.find_falsified() {
                        trace!("clause {} is falsified", clause.0);
                        true
                    } else if self.state.all_satisfied() {
                        return true;
                    } else {
                        match self.state.pick_branch() {
                            None => true,
                            Some(variable) => {
                                frames.push(Frame {
                                    variable,
                                    mark: self.state.trail.len(),
                                    polarity: true,
                                    #[cfg(test)]
                                    before: self.state.snapshot(),
                                });
                                !self.decide(variable, true)
                            }
                        }
                    }
                }
            };

            if failed {
                self.stats.conflicts += 1;
                if !self.backtrack(frames) {
                    return false;
                }
            }
        }
    }

    fn decide(&mut self, variable: VarIdx, polarity: bool) -> bool {
        trace!("branch on x{} = {}", variable.0, polarity);
        self.stats.decisions += 1;
        self.state.assign(Lit::new(variable, polarity), Origin::Decision).is_ok()
    }

    /// Unwinds to the innermost branch point that still has `false` to try
    /// and takes it. Branch points with both values tried are dropped and
    /// their variable goes back to the pool. Returns `false` when no branch
    /// point is left.
    fn backtrack(&mut self, frames: &mut Vec<Frame>) -> bool {
        while let Some(frame) = frames.last_mut() {
            self.state.undo_to(frame.mark);
            self.stats.backtracks += 1;

            if frame.polarity {
                frame.polarity = false;
                let variable = frame.variable;
                if self.decide(variable, false) {
                    return true;
                }
                self.stats.conflicts += 1;
            } else if let Some(frame) = frames.pop() {
                self.state.release(frame.variable);
                #[cfg(test)]
                self.unwound.push((frames.len(), frame.before, self.state.snapshot()));
            }
        }
        false
    }
}
