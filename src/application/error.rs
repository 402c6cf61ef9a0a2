//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add I/O and configuration context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("no catalog file given (use --file or set catalog_file in the config)")]
    NoCatalog,

    #[error("catalog file not found: {0}")]
    CatalogNotFound(PathBuf),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid formula: {0}")]
    InvalidFormula(String),
}

impl ApplicationError {
    /// The wrapped domain error, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ApplicationError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
