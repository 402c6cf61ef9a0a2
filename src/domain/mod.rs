//! Domain layer: formulas, breeding graph, path search
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod formula;
pub mod graph;
pub mod path;
pub mod search;

pub use error::DomainError;
pub use formula::{
    BreedingRecord, CollapsedDuplicate, FormulaParser, NameRegistry, ParseReport, ParsedCatalog,
    SkippedLine,
};
pub use graph::{BreedEdge, BreedingGraph, BreedingNode};
pub use path::{BreedingPath, BreedingStep, PathReconstructor};
pub use search::{
    search_shortest_paths, CancelFlag, PathSearch, SearchState, SearchTrace, DEFAULT_MAX_DEPTH,
};

/// Expand `~`, `$VAR` and `${VAR}` in a path string; returns the input unchanged on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
