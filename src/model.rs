use crate::formula::{Formula, Literal, Variable};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// A satisfying assignment over the formula's external variable
/// identifiers, ordered by identifier.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Model {
    values: BTreeMap<Variable, bool>,
    /// Identifiers `1..=declared` missing from `values` are `false`.
    declared: usize,
}

impl Model {
    /// Variables the search left unassigned take `false`; no clause
    /// constrains them.
    pub(crate) fn new(assignments: impl IntoIterator<Item = (Variable, Option<bool>)>, declared: usize) -> Self {
        Self {
            values: assignments
                .into_iter()
                .map(|(variable, value)| (variable, value.unwrap_or(false)))
                .collect(),
            declared,
        }
    }

    pub fn value(&self, variable: Variable) -> Option<bool> {
        match self.values.get(&variable) {
            Some(&value) => Some(value),
            None if (1..=self.declared).contains(&variable.0) => Some(false),
            None => None,
        }
    }

    /// Every variable in ascending order. The declared range is walked
    /// lazily alongside the stored values.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        let mut declared = (1..=self.declared).map(Variable).peekable();
        let mut stored = self.values.iter().map(|(&v, &b)| (v, b)).peekable();
        std::iter::from_fn(move || match (declared.peek().copied(), stored.peek().copied()) {
            (Some(d), Some((v, _))) if d < v => declared.next().map(|d| (d, false)),
            (Some(d), Some((v, _))) if d == v => {
                declared.next();
                stored.next()
            }
            (_, Some(_)) => stored.next(),
            (Some(_), None) => declared.next().map(|d| (d, false)),
            (None, None) => None,
        })
    }

    pub fn len(&self) -> usize {
        let undeclared = self
            .values
            .keys()
            .filter(|v| !(1..=self.declared).contains(&v.0))
            .count();
        self.declared.saturating_add(undeclared)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Each variable as the literal that holds under this model.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.iter().map(|(v, b)| Literal::new(v, b))
    }

    /// Substitutes the model into every clause of `formula`.
    pub fn satisfies(&self, formula: &Formula) -> bool {
        formula.clauses().all(|clause| {
            clause
                .literals()
                .any(|l| self.value(*l.variable()) == Some(l.is_positive()))
        })
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first = true;
        for literal in self.literals() {
            if first {
                first = false;
            } else {
                f.write_str(" ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}
