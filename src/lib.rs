//! Public API snapshots and type substitutability checks for compiled JVM
//! artifacts.
//!
//! Two tools share this library. `extract` reads class files under an
//! artifact root and renders the public shape of requested types as a stable
//! XML document. `check-substitutable` answers whether a candidate type may
//! replace a previously expected one under JVM assignment rules.

pub mod adapters;
pub mod classfile;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod loader;
pub mod logging;
pub mod model;
pub mod oracle;
pub mod ports;
pub mod render;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::error::{RunError, ToolError};

/// Run `extract` with the provided arguments and return its stdout text.
///
/// # Errors
///
/// Returns [`RunError::Usage`] when argument parsing fails or help was
/// requested, and [`RunError::Tool`] when extraction fails.
pub fn run_extract<I, T>(args: I) -> Result<String, RunError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = cli::ExtractCli::try_parse_from(args)?;
    Ok(commands::extract::run(&cli)?)
}

/// Run `check-substitutable` with the provided arguments and return its
/// stdout text.
///
/// # Errors
///
/// Returns [`RunError::Usage`] when argument parsing fails or help was
/// requested, and [`RunError::Tool`] on a fatal condition.
pub fn run_check<I, T>(args: I) -> Result<String, RunError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = cli::CheckCli::try_parse_from(args)?;
    Ok(commands::check::run(&cli)?)
}

/// Writes a result to stdout, or a one-line diagnostic prefixed by `tool`
/// to stderr, and picks the exit code.
///
/// Usage errors exit with clap's code; `--help` and `--version` print to
/// stdout and exit 0.
#[must_use]
pub fn finish(tool: &str, result: Result<String, RunError>) -> ExitCode {
    match result {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            match stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{tool}: failed to write output: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(RunError::Usage(err)) => {
            let _ = err.print();
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2))
        }
        Err(RunError::Tool(err)) => {
            if let ToolError::Serialization(detail) = &err {
                error!(tool, detail = %detail, "rendering failed");
            }
            eprintln!("{tool}: {err}");
            ExitCode::FAILURE
        }
    }
}
