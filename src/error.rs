//! Process-level error kinds.
//!
//! Every variant is terminal for the process: it is reported once on stderr
//! and mapped to a non-zero exit status. Resources (raw mode, open files)
//! are released by their guards on the way out; there is no retry path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No input file named and stdin is an interactive terminal.
    #[error("usage: {program} FILE  or  {program} < FILE")]
    Usage { program: String },

    /// The named input file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The terminal could not be configured, queried, or written.
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    /// The line editor failed or its input stream closed unexpectedly.
    #[error("line editor failed: {0}")]
    Editor(#[source] io::Error),
}

impl Error {
    /// Exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage { .. } => 2,
            _ => 1,
        }
    }
}
