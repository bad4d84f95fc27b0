use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a path was refused before any file I/O happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathIssue {
    #[error("Path is empty")]
    Empty,

    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// Result of an import or export that may have been refused up front.
#[derive(Debug, Clone, PartialEq)]
pub enum IoOutcome<T> {
    Completed(T),
    Rejected(PathIssue),
}

impl<T> IoOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            IoOutcome::Completed(value) => Some(value),
            IoOutcome::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, IoOutcome::Rejected(_))
    }
}

/// A path is usable when it is not blank and its directory part, if any,
/// already exists. The file itself does not have to exist.
pub fn validate_path(path: &Path) -> Result<(), PathIssue> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(PathIssue::Empty);
    }

    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            Err(PathIssue::MissingDirectory(dir.to_path_buf()))
        }
        _ => Ok(()),
    }
}
