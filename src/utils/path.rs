//! Resolve user-supplied file paths.

use crate::errors::{AppError, AppResult};
use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/").zip(dirs::home_dir()) {
        Some((rest, home)) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Path of a timesheet snapshot given on the command line; it must exist.
pub fn resolve_page(path: &str) -> AppResult<PathBuf> {
    let resolved = expand_tilde(path.trim());
    if !resolved.is_file() {
        return Err(AppError::PageNotFound(resolved.display().to_string()));
    }
    Ok(resolved)
}
