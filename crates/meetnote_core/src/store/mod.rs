//! Collection persistence layer.
//!
//! # Responsibility
//! - Own the on-disk layout of a collection directory and of standalone
//!   project files.
//! - Commit every file through the temp-write, fsync, rename protocol.
//!
//! # Invariants
//! - No other module reads or writes collection files.
//! - A canonical `.json` path only ever holds a complete document; partial
//!   content can only exist at the `.tmp` sibling.
//! - No locks are taken: concurrent writers (a second process, hand edits)
//!   are not detected.
//!
//! # See also
//! - crate::slug for file naming.

pub mod atomic;
pub mod collection_store;
pub mod project_file;
pub mod records;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Required directory or file does not exist.
    NotFound(PathBuf),
    /// Destination exists and overwriting is not allowed.
    AlreadyExists(PathBuf),
    /// Malformed JSON on disk.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Record could not be encoded to JSON.
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Filesystem failure during read, write, fsync, copy or rename.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// Collection input rejected before touching the disk.
    InvalidCollection(String),
    /// Save failed and restoring the pre-save state failed as well.
    RollbackFailed {
        original: Box<StoreError>,
        rollback: Box<StoreError>,
        backup: Option<PathBuf>,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> StoreError {
        let path = path.to_path_buf();
        move |source| StoreError::Io { op, path, source }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Parse { .. } => "parse_error",
            Self::Encode { .. } => "encode_error",
            Self::Io { .. } => "io_error",
            Self::InvalidCollection(_) => "invalid_collection",
            Self::RollbackFailed { .. } => "rollback_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "not found: {}", path.display()),
            Self::AlreadyExists(path) => write!(f, "already exists: {}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "malformed JSON in {}: {source}", path.display())
            }
            Self::Encode { path, source } => {
                write!(f, "failed to encode {}: {source}", path.display())
            }
            Self::Io { op, path, source } => {
                write!(f, "failed to {op} {}: {source}", path.display())
            }
            Self::InvalidCollection(message) => write!(f, "invalid collection: {message}"),
            Self::RollbackFailed {
                original,
                rollback,
                backup,
            } => {
                write!(f, "{original}; rollback failed: {rollback}")?;
                if let Some(backup) = backup {
                    write!(f, " (backup kept at {})", backup.display())?;
                }
                Ok(())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. } | Self::Encode { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::RollbackFailed { original, .. } => Some(original.as_ref()),
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::InvalidCollection(_) => None,
        }
    }
}

/// Failure of an incremental save.
///
/// Notes listed in `saved_titles` were committed before the failure and stay
/// on disk; there is no collection-wide rollback for incremental saves.
#[derive(Debug)]
pub struct DirtySaveError {
    /// Note that failed, or `None` when the failure hit the index file.
    pub failed_title: Option<String>,
    pub saved_titles: Vec<String>,
    pub source: StoreError,
}

impl Display for DirtySaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.failed_title {
            Some(title) => write!(f, "failed to save note '{title}': {}", self.source)?,
            None => write!(f, "failed to write collection index: {}", self.source)?,
        }
        write!(
            f,
            " ({} note(s) saved before the failure remain saved)",
            self.saved_titles.len()
        )
    }
}

impl Error for DirtySaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
