// Utility Functions
// Program path resolution

use crate::error::SetupError;

use std::path::{Path, PathBuf};

/// Resolve the target executable for a sweep.
///
/// A program given as a path (containing a separator) must exist at that
/// path; a bare name is looked up on `PATH`. Returns the resolved path or
/// [`SetupError::ProgramNotFound`].
pub fn resolve_program(program: &str) -> Result<PathBuf, SetupError> {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = Path::new(program);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(SetupError::ProgramNotFound(program.to_string()));
    }

    which::which(program).map_err(|_| SetupError::ProgramNotFound(program.to_string()))
}
