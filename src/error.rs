//! Structured error taxonomy for the accounting engine.
//!
//! The core distinguishes access/missing errors (non-fatal, logged and
//! absorbed as an [`crate::work::ErrResult`]) from everything else, which a
//! worker still absorbs per-item but which is worth surfacing at a higher
//! log level. `anyhow` is reserved for the CLI boundary (see `main.rs`),
//! where ad-hoc `.context(...)` is more useful than a matchable enum.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("access denied to directory {0}")]
    AccessDenied(PathBuf),

    #[error("could not access dir,file or file in dir {0}")]
    NotFound(PathBuf),

    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AccountError {
    /// Classifies an I/O error encountered while dispatching a directory,
    /// per the taxonomy in the error-handling design.
    pub fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => AccountError::AccessDenied(path),
            std::io::ErrorKind::NotFound => AccountError::NotFound(path),
            _ => AccountError::Io { path, source: err },
        }
    }
}
