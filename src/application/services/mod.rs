//! Application services

pub mod catalog;
pub mod session;

pub use catalog::{Catalog, CatalogService, SearchOutcome, SearchQuery};
pub use session::CatalogSession;
