//! # Command line front end
//!
//! Reads a problem file, solves every problem in it, and either prints a short summary of each
//! solve or writes the full derivation to a LaTeX document.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use relp_num::RationalBig;

use simplex_steps::algorithm::strategy::pivot_rule::{FirstPositive, LargestCoefficient};
use simplex_steps::algorithm::trace::Trace;
use simplex_steps::algorithm::{DEFAULT_MAX_PIVOTS, SolveOptions, solve_with};
use simplex_steps::io::{ProblemStatement, import};
use simplex_steps::presentation::latex::render_document;
use simplex_steps::presentation::{DocumentOptions, summarize};

/// Solve linear programs the way they are solved on paper, step by step.
#[derive(Parser)]
#[command(version, about)]
struct Options {
    /// Problem file to solve (.lp, .txt or .json).
    problem: PathBuf,

    /// Write the full derivation as a LaTeX document to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Abandon a solve after this many basis exchanges.
    #[arg(long, default_value_t = DEFAULT_MAX_PIVOTS)]
    max_pivots: usize,

    /// Enter the first improving variable instead of the most improving one.
    #[arg(long)]
    first_positive: bool,

    /// Page margin of the generated document.
    #[arg(long, default_value = "1.5cm")]
    margin: String,
}

fn main() -> ExitCode {
    let options = Options::parse();

    let statements = match import::<RationalBig>(&options.problem) {
        Ok(statements) => statements,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let solve_options = SolveOptions { max_pivots: options.max_pivots };
    let mut traces = Vec::with_capacity(statements.len());
    for (index, statement) in statements.into_iter().enumerate() {
        let statement = with_fallback_title(statement, &options.problem);
        let program = match statement.into_program() {
            Ok(program) => program,
            Err(error) => {
                eprintln!("error: problem {}: {error}", index + 1);
                return ExitCode::FAILURE;
            }
        };

        let trace = if options.first_positive {
            solve_with::<_, FirstPositive>(program, &solve_options)
        } else {
            solve_with::<_, LargestCoefficient>(program, &solve_options)
        };
        traces.push(trace);
    }

    match &options.output {
        Some(path) => write_document(&traces, path, &options.margin, start),
        None => {
            for (index, trace) in traces.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                println!("{}", summarize(trace));
            }
            ExitCode::SUCCESS
        }
    }
}

fn write_document(
    traces: &[Trace<RationalBig>],
    path: &Path,
    margin: &str,
    start: Instant,
) -> ExitCode {
    let document_options = DocumentOptions { margin: margin.to_string() };
    let document = render_document(traces, &document_options);
    if let Err(error) = fs::write(path, document) {
        eprintln!("error: could not write {}: {error}", path.display());
        return ExitCode::FAILURE;
    }

    println!("{} written in {:.2}s", path.display(), start.elapsed().as_secs_f64());
    ExitCode::SUCCESS
}

/// An untitled problem borrows the file stem, so that its section has a heading.
fn with_fallback_title<OF>(mut statement: ProblemStatement<OF>, path: &Path) -> ProblemStatement<OF> {
    if statement.title.is_none() {
        statement.title = path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
    }
    statement
}
