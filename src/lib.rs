//! breedpath: shortest breeding paths through a catalog of formulas.
//!
//! A catalog lists `parent1+parent2=child` formulas, one per line. The pipeline
//! parses it into validated records ([`domain::FormulaParser`]), builds a graph
//! of `(spouse, child)` edges ([`domain::BreedingGraph`]), runs a depth-bounded
//! BFS that keeps every shortest path ([`domain::PathSearch`]) and turns goal
//! states back into ordered steps ([`domain::PathReconstructor`]).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
