pub mod dimacs;

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// An external variable identifier, as it appears in the input.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Literal {
    Positive(Variable),
    Negative(Variable),
}

impl Literal {
    pub fn new(variable: Variable, positive: bool) -> Self {
        if positive {
            Literal::Positive(variable)
        } else {
            Literal::Negative(variable)
        }
    }

    pub fn variable(&self) -> &Variable {
        match self {
            Literal::Positive(v) => v,
            Literal::Negative(v) => v,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Literal::Positive(_) => true,
            Literal::Negative(_) => false,
        }
    }

    pub fn idx(&self) -> usize {
        self.variable().0
    }

    pub fn negated(&self) -> Self {
        match self {
            Literal::Positive(v) => Literal::Negative(*v),
            Literal::Negative(v) => Literal::Positive(*v),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Literal::Positive(Variable(x)) => write!(f, "{}", x),
            Literal::Negative(Variable(x)) => write!(f, "-{}", x),
        }
    }
}

/// A disjunction of literals, kept exactly as it was read. Repeated and
/// complementary literals are only resolved when the solver indexes the
/// formula.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: disjuncts.into_iter().collect(),
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for literal in &self.literals {
            write!(f, "{} ", literal)?;
        }
        f.write_str("0")
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Formula {
    variables: BTreeSet<Variable>,
    /// Identifiers `1..=declared` belong to the formula without being stored
    /// in `variables`.
    declared: usize,
    clauses: Vec<Clause>,
}

impl Formula {
    /// Builds a formula whose variable set is exactly the variables its
    /// clauses mention.
    pub fn new(conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        Self::with_variables(std::iter::empty(), conjuncts)
    }

    /// Builds a formula over `variables` plus every variable the clauses
    /// mention. Variables that no clause mentions are unconstrained.
    pub fn with_variables(
        variables: impl IntoIterator<Item = Variable>,
        conjuncts: impl IntoIterator<Item = Clause>,
    ) -> Self {
        let clauses: Vec<Clause> = conjuncts.into_iter().collect();
        let mut variables: BTreeSet<Variable> = variables.into_iter().collect();
        for clause in &clauses {
            variables.extend(clause.literals().map(|l| *l.variable()));
        }
        Self {
            variables,
            declared: 0,
            clauses,
        }
    }

    /// Builds a formula over the identifiers `1..=declared` plus every
    /// variable the clauses mention. The declared range is kept as a count,
    /// so a large declaration costs nothing until a model is printed.
    pub fn with_declared(declared: usize, conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            declared,
            ..Self::new(conjuncts)
        }
    }

    /// Number of distinct variables, declared or mentioned.
    pub fn num_variables(&self) -> usize {
        let undeclared = self.variables.iter().filter(|v| !self.is_declared(**v)).count();
        self.declared.saturating_add(undeclared)
    }

    /// Size of the declared range `1..=n`.
    pub fn declared_variables(&self) -> usize {
        self.declared
    }

    fn is_declared(&self, variable: Variable) -> bool {
        (1..=self.declared).contains(&variable.0)
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Variables the clauses mention, plus any given explicitly to
    /// [`Formula::with_variables`], in ascending order. The declared range
    /// is not enumerated here.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }
}

/// Renders the formula in DIMACS form.
impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let max_variable = self.variables.iter().next_back().map_or(0, |v| v.0).max(self.declared);
        writeln!(f, "p cnf {} {}", max_variable, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{}", clause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn p(x: usize) -> Literal {
    Literal::Positive(Variable(x))
}

#[cfg(test)]
pub(crate) fn n(x: usize) -> Literal {
    Literal::Negative(Variable(x))
}

/// Random formulas small enough for the brute-force oracle: up to 8
/// variables, up to 20 clauses of 1 to 3 literals each.
#[cfg(test)]
pub(crate) fn formula_3sat_strategy() -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    const MAX_VARS: usize = 8;
    const MAX_CLAUSES: usize = 20;

    let literal = (1..=MAX_VARS, any::<bool>()).prop_map(|(v, positive)| Literal::new(Variable(v), positive));
    let clause = proptest::collection::vec(literal, 1..=3).prop_map(Clause::new);
    proptest::collection::vec(clause, 0..MAX_CLAUSES).prop_map(Formula::new)
}
