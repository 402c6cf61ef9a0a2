//! Catalog service
//!
//! Loads breeding catalogs from disk, answers shortest-path queries and appends
//! new formulas. The file is authoritative: every load re-parses it in full.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    BreedingGraph, BreedingPath, BreedingRecord, CancelFlag, DomainError, FormulaParser,
    NameRegistry, ParseReport, PathReconstructor, PathSearch, DEFAULT_MAX_DEPTH,
};
use crate::infrastructure::traits::FileSystem;

/// A fully parsed catalog and the graph built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub path: PathBuf,
    pub records: Vec<BreedingRecord>,
    pub names: NameRegistry,
    pub graph: BreedingGraph,
    pub report: ParseReport,
}

/// Start and goal entity plus the depth ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub start: String,
    pub goal: String,
    pub max_depth: usize,
}

impl SearchQuery {
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Trims names and rejects empty ones.
    fn normalized(&self) -> ApplicationResult<Self> {
        let start = self.start.trim();
        let goal = self.goal.trim();
        if start.is_empty() || goal.is_empty() {
            return Err(ApplicationError::InvalidQuery(
                "both start and goal names are required".to_string(),
            ));
        }
        Ok(Self {
            start: start.to_string(),
            goal: goal.to_string(),
            max_depth: self.max_depth,
        })
    }
}

/// Every shortest path found for a query. No paths is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub query: SearchQuery,
    /// One step list per goal state, in discovery order
    pub paths: Vec<BreedingPath>,
    pub states_visited: usize,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of steps in each shortest path.
    pub fn depth(&self) -> Option<usize> {
        self.paths.first().map(Vec::len)
    }
}

/// Service for loading, querying and extending breeding catalogs.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
    parser: FormulaParser,
}

impl CatalogService {
    /// Create a new catalog service with a lenient parser.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            parser: FormulaParser::new(),
        }
    }

    /// Reject malformed lines instead of skipping them.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.parser = self.parser.with_strict(strict);
        self
    }

    /// Parse the catalog file and build its graph.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Catalog> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read catalog", path)?;
        let parsed = self.parser.parse_str(&content)?;
        let graph = BreedingGraph::build(&parsed.records);
        debug!(
            "load: {} records, {} nodes from {}",
            parsed.records.len(),
            graph.len(),
            path.display()
        );
        Ok(Catalog {
            path: path.to_path_buf(),
            records: parsed.records,
            names: parsed.names,
            graph,
            report: parsed.report,
        })
    }

    /// Re-read the catalog from disk and answer the query against it.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&self, path: &Path, query: &SearchQuery) -> ApplicationResult<SearchOutcome> {
        let query = query.normalized()?;
        let catalog = self.load(path)?;
        self.search_in(&catalog, &query, None)
    }

    /// Answer the query against an already loaded catalog.
    ///
    /// Names absent from the graph are rejected before searching.
    pub fn search_in(
        &self,
        catalog: &Catalog,
        query: &SearchQuery,
        cancel: Option<CancelFlag>,
    ) -> ApplicationResult<SearchOutcome> {
        let query = query.normalized()?;
        for name in [&query.start, &query.goal] {
            if !catalog.graph.contains(name) {
                return Err(DomainError::UnknownEntityName(name.clone()).into());
            }
        }

        let mut search = PathSearch::new(&catalog.graph).max_depth(query.max_depth);
        if let Some(flag) = cancel {
            search = search.cancel_on(flag);
        }
        let trace = search.run(&query.start, &query.goal)?;
        let paths = PathReconstructor::new(&catalog.graph, &trace).paths();
        info!(
            "search {} -> {}: {} path(s) of length {:?}",
            query.start,
            query.goal,
            paths.len(),
            trace.goal_depth()
        );

        Ok(SearchOutcome {
            query,
            paths,
            states_visited: trace.states().len(),
        })
    }

    /// Build a record from user input, rejecting names the parser would split.
    pub fn formula(
        &self,
        first_parent: &str,
        second_parent: &str,
        child: &str,
    ) -> ApplicationResult<BreedingRecord> {
        let record =
            BreedingRecord::new(first_parent.trim(), second_parent.trim(), child.trim());
        let line = record.to_string();
        match self.parser.tokenize(&line) {
            Some([p1, p2, c])
                if p1 == record.parents[0] && p2 == record.parents[1] && c == record.child =>
            {
                Ok(record)
            }
            _ => Err(ApplicationError::InvalidFormula(format!(
                "names must be non-empty and free of whitespace, '+' and '=': {line:?}"
            ))),
        }
    }

    /// Append a formula to the catalog file, then reload it.
    ///
    /// The line is written before reloading and is not rolled back: if it
    /// introduces a conflict, the file stays unloadable until corrected.
    #[instrument(level = "debug", skip(self))]
    pub fn append(&self, path: &Path, record: &BreedingRecord) -> ApplicationResult<Catalog> {
        let line = format!("\n{}", record);
        self.fs
            .append(path, &line)
            .with_path_context("append formula", path)?;
        debug!("append: wrote {} to {}", record, path.display());

        self.load(path).inspect_err(|e| {
            warn!(
                "append: {} now fails to load ({}); the line was kept",
                path.display(),
                e
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(RealFileSystem))
    }

    #[test]
    fn given_padded_names_when_building_formula_then_trims() {
        let record = service().formula(" A ", "B", " C").unwrap();
        assert_eq!(record, BreedingRecord::new("A", "B", "C"));
    }

    #[test]
    fn given_names_with_delimiters_when_building_formula_then_rejects() {
        let svc = service();
        assert!(svc.formula("A B", "C", "D").is_err());
        assert!(svc.formula("A", "C+X", "D").is_err());
        assert!(svc.formula("A", "C", "").is_err());
    }

    #[test]
    fn given_blank_goal_when_searching_then_invalid_query() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.txt");
        std::fs::write(&path, "A+B=C\n").unwrap();

        let result = service().search(&path, &SearchQuery::new("A", "  "));

        assert!(matches!(result, Err(ApplicationError::InvalidQuery(_))));
    }

    #[test]
    fn given_missing_file_when_loading_then_catalog_not_found() {
        let temp = TempDir::new().unwrap();

        let result = service().load(&temp.path().join("missing.txt"));

        assert!(matches!(result, Err(ApplicationError::CatalogNotFound(_))));
    }
}
