//! CLI tool to lint workflow description files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use workflow_lint::{Diagnostic, lint_file};

/// Check workflow files and report every problem found.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to lint
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output format for diagnostics
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `path:line:column: severity: message [code]`
    Human,
    /// `path:line:column: code`
    Short,
}

fn render(path: &str, diagnostic: &Diagnostic, format: Format) -> String {
    // Editors expect one-based positions.
    let line = diagnostic.range.start.line + 1;
    let column = diagnostic.range.start.column + 1;
    match format {
        Format::Human => format!(
            "{path}:{line}:{column}: {}: {} [{}]",
            diagnostic.severity,
            diagnostic.message,
            diagnostic.code.as_str()
        ),
        Format::Short => format!("{path}:{line}:{column}: {}", diagnostic.code.as_str()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    log::debug!(args:?; "parsed arguments");

    let mut had_io_error = false;
    let mut had_lint_error = false;

    for path in &args.files {
        let diagnostics = match lint_file(path) {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                eprintln!("{e}");
                had_io_error = true;
                continue;
            }
        };

        let display = path.display().to_string();
        for diagnostic in &diagnostics {
            println!("{}", render(&display, diagnostic, args.format));
        }
        had_lint_error |= diagnostics.iter().any(|d| d.severity.is_error());
        log::info!(path = display.as_str(), diagnostics = diagnostics.len(); "linted");
    }

    if had_io_error {
        ExitCode::from(2)
    } else if had_lint_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
