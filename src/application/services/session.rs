//! Catalog session: the currently loaded catalog as an explicit value.
//!
//! A session remembers one catalog path and the last catalog that loaded
//! successfully. Failed reloads leave that catalog untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::application::services::catalog::{Catalog, CatalogService, SearchOutcome, SearchQuery};
use crate::application::ApplicationResult;
use crate::domain::BreedingRecord;

#[derive(Debug, Clone)]
pub struct CatalogSession {
    path: PathBuf,
    current: Option<Catalog>,
}

impl CatalogSession {
    /// Open a session without loading anything yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    /// Open a session and load the catalog once.
    pub fn open(service: &CatalogService, path: impl Into<PathBuf>) -> ApplicationResult<Self> {
        let mut session = Self::new(path);
        session.reload(service)?;
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last successfully loaded catalog.
    pub fn current(&self) -> Option<&Catalog> {
        self.current.as_ref()
    }

    /// Re-parse the file; the loaded catalog is replaced only on success.
    #[instrument(level = "debug", skip(self, service), fields(path = %self.path.display()))]
    pub fn reload(&mut self, service: &CatalogService) -> ApplicationResult<&Catalog> {
        let catalog = service.load(&self.path)?;
        debug!("reload: {} records", catalog.records.len());
        Ok(self.current.insert(catalog))
    }

    /// Reload from disk, then search the fresh graph.
    pub fn search(
        &mut self,
        service: &CatalogService,
        query: &SearchQuery,
    ) -> ApplicationResult<SearchOutcome> {
        let catalog = self.reload(service)?;
        service.search_in(catalog, query, None)
    }

    /// Append a formula and reload. On reload failure the previous catalog stays loaded.
    pub fn append(
        &mut self,
        service: &CatalogService,
        record: &BreedingRecord,
    ) -> ApplicationResult<&Catalog> {
        let catalog = service.append(&self.path, record)?;
        Ok(self.current.insert(catalog))
    }
}
