mod args;
mod logging;

use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use graph_middleware::{GraphMiddlewareError, ResultSet, run_blocking};

use crate::args::{Args, OutputFormat};

#[derive(Debug)]
enum CliError {
    Input(io::Error),
    Graph(GraphMiddlewareError),
    Output(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Input(err) => write!(f, "cannot read query: {err}"),
            CliError::Graph(err) => write!(f, "{err}"),
            CliError::Output(err) => write!(f, "cannot write results: {err}"),
        }
    }
}

impl From<GraphMiddlewareError> for CliError {
    fn from(err: GraphMiddlewareError) -> Self {
        CliError::Graph(err)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logging::init(args.log_level(), args.log.as_deref()) {
        eprintln!("error: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    match execute(&args) {
        Ok(count) => {
            tracing::info!(records = count, "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<usize, CliError> {
    let config = args.connection_config()?;
    let query = args.query().map_err(CliError::Input)?;
    tracing::info!(uri = config.uri(), database = config.database(), "running query");

    let result_set = run_blocking(&config, &query)?;
    let stdout = io::stdout();
    print_results(&mut stdout.lock(), &result_set, args.format, &args.field)?;
    Ok(result_set.len())
}

fn print_results(
    out: &mut impl Write,
    result_set: &ResultSet,
    format: OutputFormat,
    field: &str,
) -> Result<(), CliError> {
    for record in result_set {
        match format {
            OutputFormat::Lines => {
                writeln!(out, "{}", record.get_string(field)?).map_err(CliError::Output)?;
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(record)
                    .map_err(|e| CliError::Output(io::Error::other(e)))?;
                writeln!(out, "{line}").map_err(CliError::Output)?;
            }
        }
    }
    out.flush().map_err(CliError::Output)
}
