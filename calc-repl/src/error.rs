use calc_error::Diagnostic;
use calc_history::{SnapshotError, TreeError};
use crate::command::CommandError;
use std::{fmt, io, path::PathBuf};

/// Utility enum to package errors that can occur while running a command.
#[derive(Debug)]
pub enum Error {
    /// The input could not be parsed or evaluated. `source` is the input as it was given to the
    /// parser, which the diagnostic spans refer to.
    Diagnostics { source: String, errors: Vec<Diagnostic> },

    Command(CommandError),

    Tree(TreeError),

    Snapshot(SnapshotError),

    Io { path: PathBuf, err: io::Error },

    Readline(rustyline::error::ReadlineError),
}

impl Error {
    /// Report this error to stderr.
    ///
    /// Diagnostics are rendered with their labels against the source they came from; every other
    /// error is a single line.
    pub fn report_to_stderr(&self) {
        match self {
            Self::Diagnostics { source, errors } => errors
                .iter()
                .for_each(|err| err.report_to_stderr("input", source)),
            err => eprintln!("error: {}", err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagnostics { errors, .. } => match errors.first() {
                Some(err) => write!(f, "{}", err),
                None => write!(f, "invalid input"),
            },
            Self::Command(err) => write!(f, "{}", err),
            Self::Tree(err) => write!(f, "{}", err),
            Self::Snapshot(err) => write!(f, "could not load history: {}", err),
            Self::Io { path, err } => write!(f, "{}: {}", path.display(), err),
            Self::Readline(err) => write!(f, "{}", err),
        }
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        Self::Readline(err)
    }
}
