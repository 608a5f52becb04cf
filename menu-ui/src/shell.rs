//! Line-oriented interactive session.
//!
//! Each line is one [`Action`] written the same way as on the command line,
//! e.g. `add-order --table 4 --quantity 2 --dish "Pad Thai"`. A failed action
//! prints a warning and the session carries on, the way a dialog would in
//! the windowed manager.

use std::io;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::app::RestaurantApp;
use crate::cli::{self, Action};
use crate::logging;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("unbalanced quotes or trailing backslash")]
    UnbalancedQuotes,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Action(Action),

    /// Change the log filter for the rest of the session.
    LogLevel { level: String },

    /// End the session.
    #[command(alias = "exit")]
    Quit,
}

/// Counts of what a session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellSummary {
    pub executed: usize,
    pub failed: usize,
}

/// Splits a line into words with POSIX shell quoting: single or double
/// quotes group words containing spaces, and a backslash escapes the next
/// character outside single quotes.
pub fn split_line(line: &str) -> Result<Vec<String>, ShellError> {
    shlex::split(line).ok_or(ShellError::UnbalancedQuotes)
}

/// Runs every line of `input` against `app` until end of input or `quit`.
///
/// Blank lines and lines starting with `#` are skipped.
pub async fn run_script<R>(app: &mut RestaurantApp, input: R) -> io::Result<ShellSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ShellSummary::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(line, "shell input");

        let words = match split_line(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("warning: {e}");
                summary.failed += 1;
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) if !e.use_stderr() => {
                // --help and --version
                print!("{e}");
                continue;
            }
            Err(e) => {
                eprint!("{e}");
                summary.failed += 1;
                continue;
            }
        };

        match parsed.command {
            ShellCommand::Quit => break,
            ShellCommand::LogLevel { level } => match logging::set_log_level(&level) {
                Ok(()) => {
                    println!("Log level set to {level}");
                    summary.executed += 1;
                }
                Err(e) => {
                    eprintln!("warning: {e:#}");
                    summary.failed += 1;
                }
            },
            ShellCommand::Action(action) => match cli::run_action(app, action).await {
                Ok(()) => summary.executed += 1,
                Err(e) => {
                    warn!(error = %e, "action failed");
                    eprintln!("warning: {e}");
                    summary.failed += 1;
                }
            },
        }
    }
    Ok(summary)
}
