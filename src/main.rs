use clap::{App, Arg, ErrorKind};
use dpllsat::formula::dimacs::{parse_file, DimacsOptions};
use dpllsat::{Solver, SolverOptions};
use log::{debug, info};

const FATAL_EXIT_CODE: i32 = 47;

fn fatal(message: &str) -> ! {
    println!("fatal error: {}", message);
    std::process::exit(FATAL_EXIT_CODE);
}

fn main() {
    env_logger::init();

    let matches = App::new("dpllsat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decides satisfiability of a DIMACS CNF formula")
        .arg(
            Arg::with_name("INPUT")
                .help("input file (in CNF)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("lenient")
                .long("lenient")
                .help("accept clause and variable counts that disagree with the 'p' line"),
        )
        .arg(
            Arg::with_name("no-pure-literals")
                .long("no-pure-literals")
                .help("only run unit propagation between decisions"),
        )
        .get_matches_safe();

    let matches = match matches {
        Ok(matches) => matches,
        Err(e) if e.kind == ErrorKind::HelpDisplayed || e.kind == ErrorKind::VersionDisplayed => e.exit(),
        Err(e) => {
            debug!("{}", e.message);
            fatal("no input files")
        }
    };

    let dimacs_options = DimacsOptions {
        strict: !matches.is_present("lenient"),
    };
    let solver_options = SolverOptions {
        pure_literals: !matches.is_present("no-pure-literals"),
    };

    // INPUT is required, so clap has already rejected a missing path
    let path = matches.value_of("INPUT").unwrap_or_default();
    let formula = match parse_file(path, dimacs_options) {
        Ok(formula) => formula,
        Err(e) => {
            debug!("{}: {}", path, e);
            fatal("file not existing or not satisfying DIMACS CNF format")
        }
    };
    info!(
        "{}: {} variables, {} clauses",
        path,
        formula.num_variables(),
        formula.num_clauses()
    );

    let mut solver = Solver::with_options(&formula, solver_options);
    let result = solver.solve();
    info!("{:?}", solver.stats());

    println!("{}", result);
}
