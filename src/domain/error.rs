//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent catalog and search rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(
        "conflicting parentage: {first_parent} + {second_parent} yields '{existing}' (line {existing_line}) and '{conflicting}' (line {line})"
    )]
    ConflictingParentage {
        first_parent: String,
        second_parent: String,
        existing: String,
        existing_line: usize,
        conflicting: String,
        line: usize,
    },

    #[error("malformed formula on line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("unknown entity name: {0}")]
    UnknownEntityName(String),

    #[error("search cancelled after {visited} states")]
    SearchCancelled { visited: usize },
}
