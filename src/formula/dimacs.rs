use crate::formula::{Clause, Formula, Literal, Variable};
use log::debug;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimacsOptions {
    /// Reject files whose clause count differs from the problem line, or
    /// which reference more distinct variables than it declares.
    pub strict: bool,
}

impl Default for DimacsOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Error)]
pub enum DimacsParseError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("format error: {0}")]
    Format(String),
}

/// Largest variable identifier the reader accepts, in the problem line or
/// in a literal.
pub const MAX_VARIABLE: usize = i32::MAX as usize;

fn format_error<T>(msg: impl Into<String>) -> Result<T, DimacsParseError> {
    Err(DimacsParseError::Format(msg.into()))
}

pub fn parse<R: Read>(reader: R) -> Result<Formula, DimacsParseError> {
    parse_with(reader, DimacsOptions::default())
}

pub fn parse_file<P: AsRef<Path>>(path: P, options: DimacsOptions) -> Result<Formula, DimacsParseError> {
    let file = File::open(path)?;
    parse_with(file, options)
}

pub fn parse_with<R: Read>(reader: R, options: DimacsOptions) -> Result<Formula, DimacsParseError> {
    let mut lines = BufReader::new(reader).lines();

    let header = loop {
        match lines.next() {
            None => return format_error("missing 'p' line"),
            Some(line) => {
                let line = line?;
                let line = line.trim_matches(|c: char| c == ' ' || c == '\t');
                if is_comment(line) {
                    continue;
                }
                if line.starts_with('p') {
                    break parse_header(line)?;
                }
                return format_error("missing 'p' line before clauses");
            }
        }
    };

    let mut clauses = vec![];
    let mut referenced = BTreeSet::new();
    for line in lines {
        let line = line?;
        let line = line.trim_matches(|c: char| c == ' ' || c == '\t');
        if is_comment(line) {
            continue;
        }
        if line.starts_with('p') {
            return format_error("unexpected 'p' line after clauses");
        }
        if line.starts_with('%') {
            break;
        }

        let mut clause = vec![];
        for x in line.split_whitespace() {
            match parse_literal(x)? {
                Some(l) => {
                    referenced.insert(*l.variable());
                    clause.push(l);
                }
                None => break,
            }
        }
        clauses.push(Clause::new(clause));
    }

    debug!(
        "read {} clauses over {} variables (declared {} clauses, {} variables)",
        clauses.len(),
        referenced.len(),
        header.num_clauses,
        header.num_variables
    );

    if options.strict {
        if clauses.len() != header.num_clauses {
            return format_error(format!(
                "expected {} clauses, found {}",
                header.num_clauses,
                clauses.len()
            ));
        }
        if referenced.len() > header.num_variables {
            return format_error(format!(
                "expected at most {} variables, found {}",
                header.num_variables,
                referenced.len()
            ));
        }
    }

    Ok(Formula::with_declared(header.num_variables, clauses))
}

struct Header {
    num_variables: usize,
    num_clauses: usize,
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('c')
}

fn parse_header(line: &str) -> Result<Header, DimacsParseError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("p") {
        return format_error("malformed 'p' line");
    }
    if tokens.next() != Some("cnf") {
        return format_error("missing 'cnf'");
    }

    let num_variables = tokens
        .next()
        .and_then(|c| c.parse::<usize>().ok())
        .ok_or_else(|| DimacsParseError::Format("invalid num_variables".into()))?;
    let num_clauses = tokens
        .next()
        .and_then(|c| c.parse::<usize>().ok())
        .ok_or_else(|| DimacsParseError::Format("invalid num_clauses".into()))?;

    if tokens.next().is_some() {
        return format_error("trailing tokens on 'p' line");
    }
    if num_variables > MAX_VARIABLE {
        return format_error(format!("num_variables {} exceeds {}", num_variables, MAX_VARIABLE));
    }

    Ok(Header {
        num_variables,
        num_clauses,
    })
}

fn parse_literal(s: &str) -> Result<Option<Literal>, DimacsParseError> {
    let l = s
        .parse::<isize>()
        .map_err(|_| DimacsParseError::Format(format!("invalid literal '{}'", s)))?;
    if l.unsigned_abs() > MAX_VARIABLE {
        return format_error(format!("literal '{}' exceeds {}", s, MAX_VARIABLE));
    }
    if l > 0 {
        Ok(Some(Literal::Positive(Variable(l as usize))))
    } else if l < 0 {
        Ok(Some(Literal::Negative(Variable(l.unsigned_abs()))))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::formula::{n, p};
    use crate::{SatResult, Solver};

    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_env_log::test;

    fn lenient() -> DimacsOptions {
        DimacsOptions { strict: false }
    }

    #[test]
    fn parse_cnf_basic() {
        let cnf = "c  simple_v3_c2.cnf
c
p cnf 3 2
1 -3 0
2 3 -1 0";
        let f = parse(cnf.as_bytes()).expect("failed to parse");
        assert_eq!(f.clauses().count(), 2);

        assert_eq!(
            f.clauses().nth(0).unwrap().literals().cloned().collect::<Vec<_>>(),
            vec![p(1), n(3)]
        );
        assert_eq!(
            f.clauses().nth(1).unwrap().literals().cloned().collect::<Vec<_>>(),
            vec![p(2), p(3), n(1)]
        );
    }

    #[test]
    fn parse_keeps_declared_variables() {
        let f = parse("p cnf 2 0\n".as_bytes()).expect("failed to parse");
        assert_eq!(f.num_clauses(), 0);
        assert_eq!(f.num_variables(), 2);
        assert_eq!(f.declared_variables(), 2);
        assert_eq!(f.variables().count(), 0);
    }

    #[test]
    fn oversized_declarations_are_rejected() {
        for cnf in &[
            "p cnf 18446744073709551615 1\n1 0\n",
            "p cnf 2147483648 1\n1 0\n",
            "p cnf 1 1\n2147483648 0\n",
            "p cnf 1 1\n-9223372036854775808 0\n",
        ] {
            assert!(
                matches!(parse_with(cnf.as_bytes(), lenient()), Err(DimacsParseError::Format(_))),
                "accepted {:?}",
                cnf
            );
        }
    }

    #[test]
    fn largest_declaration_is_not_materialised() {
        let f = parse("p cnf 2147483647 1\n1 -2147483647 0\n".as_bytes()).expect("failed to parse");
        assert_eq!(f.variables().count(), 2);
        assert_eq!(f.num_variables(), MAX_VARIABLE);

        let result = Solver::new(&f).solve();
        let model = result.model().expect("satisfiable");
        assert!(model.satisfies(&f));
        assert_eq!(model.len(), MAX_VARIABLE);
        assert_eq!(model.value(Variable(MAX_VARIABLE - 1)), Some(false));
        assert_eq!(model.iter().take(2).count(), 2);
    }

    #[test]
    fn parse_indented_lines_and_trailer() {
        let cnf = "\tc comment\n  p cnf 2 2  \n c another\n 1 -2 0\n\n  2 0 7 8\n%\n0\n";
        let f = parse(cnf.as_bytes()).expect("failed to parse");
        assert_eq!(
            f.clauses().map(|c| c.literals().cloned().collect::<Vec<_>>()).collect::<Vec<_>>(),
            vec![vec![p(1), n(2)], vec![p(2)]]
        );
    }

    #[test]
    fn parse_empty_clause() {
        let f = parse("p cnf 1 2\n1 0\n0\n".as_bytes()).expect("failed to parse");
        assert!(f.clauses().nth(1).unwrap().is_empty());
    }

    #[test]
    fn parse_missing_header() {
        assert!(matches!(parse("1 2 0\n".as_bytes()), Err(DimacsParseError::Format(_))));
        assert!(matches!(parse("c only comments\n".as_bytes()), Err(DimacsParseError::Format(_))));
        assert!(matches!(parse("".as_bytes()), Err(DimacsParseError::Format(_))));
    }

    #[test]
    fn parse_malformed_header() {
        for header in &["p dnf 1 1", "p cnf 1", "p cnf x 1", "p cnf 1 -1", "p cnf 1 1 1", "pcnf 1 1"] {
            let cnf = format!("{}\n1 0\n", header);
            assert!(
                matches!(parse(cnf.as_bytes()), Err(DimacsParseError::Format(_))),
                "accepted {:?}",
                header
            );
        }
    }

    #[test]
    fn parse_second_header() {
        let cnf = "p cnf 2 1\n1 2 0\np cnf 2 1\n";
        assert!(matches!(parse(cnf.as_bytes()), Err(DimacsParseError::Format(_))));
        assert!(matches!(
            parse_with(cnf.as_bytes(), lenient()),
            Err(DimacsParseError::Format(_))
        ));
    }

    #[test]
    fn parse_invalid_literal() {
        assert!(matches!(
            parse("p cnf 2 1\n1 x 0\n".as_bytes()),
            Err(DimacsParseError::Format(_))
        ));
    }

    #[test]
    fn strict_counts() {
        let too_few_clauses = "p cnf 2 3\n1 2 0\n-1 0\n";
        assert!(matches!(
            parse(too_few_clauses.as_bytes()),
            Err(DimacsParseError::Format(_))
        ));
        assert_eq!(parse_with(too_few_clauses.as_bytes(), lenient()).unwrap().num_clauses(), 2);

        let too_many_variables = "p cnf 1 1\n1 2 0\n";
        assert!(matches!(
            parse(too_many_variables.as_bytes()),
            Err(DimacsParseError::Format(_))
        ));
        assert_eq!(parse_with(too_many_variables.as_bytes(), lenient()).unwrap().num_variables(), 2);
    }

    #[test]
    fn sparse_identifiers_within_declared_count() {
        let f = parse("p cnf 2 1\n7 -9 0\n".as_bytes()).expect("failed to parse");
        assert_eq!(f.variables().cloned().collect::<Vec<_>>(), vec![Variable(7), Variable(9)]);
        assert_eq!(f.num_variables(), 4);
    }

    #[test]
    fn parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "p cnf 2 2\n1 2 0\n-1 0").unwrap();
        let f = parse_file(file.path(), DimacsOptions::default()).expect("failed to parse");
        assert_eq!(f.num_clauses(), 2);
    }

    #[test]
    fn parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_file(dir.path().join("not_existing.cnf"), DimacsOptions::default());
        assert!(matches!(result, Err(DimacsParseError::Io(_))));
    }

    #[test]
    fn solve_cnf_quinn() {
        let cnf = "c  quinn.cnf
c
p cnf 16 18
  1    2  0
 -2   -4  0
  3    4  0
 -4   -5  0
  5   -6  0
  6   -7  0
  6    7  0
  7  -16  0
  8   -9  0
 -8  -14  0
  9   10  0
  9  -10  0
-10  -11  0
 10   12  0
 11   12  0
 13   14  0
 14  -15  0
 15   16  0
";

        let f = parse(cnf.as_bytes()).expect("failed to parse");

        let mut solver = Solver::new(&f);
        match solver.solve() {
            SatResult::Satisfiable(model) => {
                assert!(model.satisfies(&f));
                assert_eq!(model.len(), 16);
            }
            SatResult::Unsatisfiable => panic!("quinn.cnf is satisfiable"),
        }
    }
}
