// Setup Errors
// Fatal problems detected before any run is scheduled

use crate::parser::ParseError;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type SetupResult<T> = Result<T, SetupError>;

/// Errors that abort a sweep before scheduling begins.
///
/// Per-run failures are never represented here; they are recorded in each
/// run's outcome and do not stop the batch.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read sweep file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    #[error("program not found: {0}")]
    ProgramNotFound(String),

    #[error("failed to discover inputs for '{pattern}': {source}")]
    Discover {
        pattern: String,
        #[source]
        source: io::Error,
    },
}
