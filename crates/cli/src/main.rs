// benchcmp - reconcile optimizer benchmark results into a comparison report
//
// Reads the reference CSV and the comparison log from the working directory,
// writes the markdown report and chart next to them. Configuration comes from
// an optional benchcmp.toml; there are no behaviour flags.

mod compare;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

/// Package version plus the commit it was built from.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BENCHCMP_COMMIT"), ")");

#[derive(Parser)]
#[command(name = "benchcmp")]
#[command(about = "Compare reference and comparison optimizer benchmark results")]
#[command(version = VERSION)]
#[command(after_help = "\
Inputs and outputs are read from benchcmp.toml in the working directory when present.
Defaults:
  reference   nlopt_benchmark_results.csv
  comparison  csharp_results.txt
  report      REAL_PERFORMANCE_COMPARISON.md
  chart       performance_comparison.svg

Set BENCHCMP_LOG=debug for diagnostic output.")]
struct Cli {}

pub struct CliError {
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    logging::init_logging();

    if let Err(CliError { message, hint }) = compare::cmd_compare(Path::new(".")) {
        if !message.is_empty() {
            eprintln!("error: {}", message);
        }
        if let Some(hint) = hint {
            eprintln!("hint:  {}", hint);
        }
    }

    // The report degrades instead of failing the host invocation.
    ExitCode::SUCCESS
}
