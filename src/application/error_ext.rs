//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read catalog", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::CatalogNotFound(path.to_path_buf()),
            _ => ApplicationError::Io {
                context: format!("{}: {}", action, path.display()),
                source: e,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_not_found_when_adding_context_then_catalog_not_found() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));

        let err = result
            .with_path_context("read catalog", Path::new("/tmp/none.txt"))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::CatalogNotFound(p) if p == PathBuf::from("/tmp/none.txt")));
    }

    #[test]
    fn given_other_io_error_when_adding_context_then_keeps_action_and_path() {
        let result: io::Result<()> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));

        let err = result
            .with_path_context("append formula", Path::new("catalog.txt"))
            .unwrap_err();

        assert_eq!(err.to_string(), "append formula: catalog.txt: denied");
    }
}
