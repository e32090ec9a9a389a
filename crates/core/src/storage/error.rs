//! Storage error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed (permissions, disk full, bad path...).
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Subdirectory would escape the media root or is otherwise unusable.
    #[error("invalid storage subdirectory: {0:?}")]
    InvalidSubdir(String),

    /// Public URL prefix cannot be used to build safe URLs.
    #[error("invalid public URL prefix: {0:?}")]
    InvalidPrefix(String),
}

impl StorageError {
    /// Create an I/O error with context.
    #[must_use]
    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an invalid subdirectory error.
    #[must_use]
    pub fn invalid_subdir(subdir: impl Into<String>) -> Self {
        Self::InvalidSubdir(subdir.into())
    }

    /// Kind of the underlying I/O error, if this is one.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = StorageError::io(
            "create directory",
            Path::new("/readonly/users"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("failed to create directory /readonly/users"));
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_invalid_subdir_has_no_io_kind() {
        let err = StorageError::invalid_subdir("../etc");
        assert_eq!(err.io_kind(), None);
        assert_eq!(err.to_string(), "invalid storage subdirectory: \"../etc\"");
    }
}
