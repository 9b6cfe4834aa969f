//! Error types for trace loading and coverage aggregation

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a coverage run
#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Failed to read trace file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed trace file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trace for '{program}' has no entries besides syscall errors; coverage is undefined")]
    EmptyTrace { program: String },

    #[error("Program '{program}' appears more than once in the input")]
    DuplicateProgram { program: String },

    #[error("Program '{program}' is not part of this run")]
    UnknownProgram { program: String },

    #[error("Cannot derive a program name from path {}", path.display())]
    InvalidProgramName { path: PathBuf },

    #[error("No trace files given")]
    NoInput,
}

/// Result type for coverage operations
pub type Result<T> = std::result::Result<T, CoverageError>;
