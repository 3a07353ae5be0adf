pub mod formula;
mod model;
mod solver;

#[cfg(test)]
mod brute_force;

use std::fmt::{self, Display, Formatter};

#[derive(PartialEq, Clone, Debug)]
pub enum SatResult {
    Satisfiable(Model),
    Unsatisfiable,
}

impl SatResult {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SatResult::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            SatResult::Satisfiable(model) => Some(model),
            SatResult::Unsatisfiable => None,
        }
    }
}

/// The solver's printed answer.
impl Display for SatResult {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SatResult::Satisfiable(model) => write!(f, "SATISFIABLE\n{}", model),
            SatResult::Unsatisfiable => f.write_str("NOT SATISFIABLE"),
        }
    }
}

pub use formula::{Clause, Formula, Literal, Variable};
pub use model::Model;
pub use solver::{SolveStats, Solver, SolverOptions};
