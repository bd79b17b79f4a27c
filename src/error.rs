//! Errors raised while scanning an input file.

use std::path::PathBuf;

use thiserror::Error;

use crate::base::LineNumber;

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Error type for scan operations
///
/// Every variant invalidates the whole scan: there is no partial result.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A line could not be parsed into a key and an integer score
    #[error("Error processing line {line_number}: {line}")]
    MalformedLine {
        /// 1-based line number in the file
        line_number: LineNumber,
        /// The raw line (without its terminator)
        line: String,
    },

    /// The input could not be opened
    #[error("Unable to open file {}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker panicked or could not be joined
    #[error("Worker failure: {0}")]
    WorkerFailure(String),

    /// I/O error once the input is open
    #[error("Error while reading input: {0}")]
    Io(#[from] std::io::Error),
}
