//! Bounded breadth-first search collecting every shortest breeding path.
//!
//! Visited states live in an append-only trace addressed by index. Each state
//! points back at the state that produced it, so paths are rebuilt afterwards
//! by walking those indices (see [`crate::domain::path`]).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::error::DomainError;
use crate::domain::graph::BreedingGraph;

/// Hard ceiling on path length used when the caller does not choose one.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// One visited state. Immutable once pushed to the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    /// Position of the node in the graph
    pub node: usize,
    /// Trace index of the producing state, `None` for roots
    pub predecessor: Option<usize>,
    /// Index into the predecessor node's edge list that led here
    pub edge: Option<usize>,
    /// Breeding steps from the root
    pub depth: usize,
}

impl SearchState {
    fn root(node: usize) -> Self {
        Self {
            node,
            predecessor: None,
            edge: None,
            depth: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.predecessor.is_none()
    }
}

/// Shared flag for aborting a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Goal state indices plus the full trace they index into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTrace {
    goals: Vec<usize>,
    states: Vec<SearchState>,
}

impl SearchTrace {
    /// Goal states in discovery order.
    pub fn goals(&self) -> &[usize] {
        &self.goals
    }

    pub fn states(&self) -> &[SearchState] {
        &self.states
    }

    pub fn state(&self, idx: usize) -> Option<&SearchState> {
        self.states.get(idx)
    }

    /// True if no path was found. Not an error.
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Length of the shortest paths, if any were found.
    pub fn goal_depth(&self) -> Option<usize> {
        self.goals.first().map(|&g| self.states[g].depth)
    }
}

/// Multi-source, multi-goal BFS over a [`BreedingGraph`].
#[derive(Debug, Clone)]
pub struct PathSearch<'g> {
    graph: &'g BreedingGraph,
    max_depth: usize,
    cancel: Option<CancelFlag>,
}

impl<'g> PathSearch<'g> {
    pub fn new(graph: &'g BreedingGraph) -> Self {
        Self {
            graph,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
        }
    }

    /// States at this depth are goal-tested but never expanded.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn cancel_on(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Finds every shortest path from `start` to `goal`.
    ///
    /// Every node named `start` is seeded as a depth-0 root. Depth-0 states never
    /// match, so `start == goal` only matches through a cycle. Once the first goal
    /// is found at depth `D`, deeper states are dropped while the rest of level `D`
    /// is still drained. Matched states are not expanded.
    #[instrument(level = "debug", skip(self), fields(max_depth = self.max_depth))]
    pub fn run(&self, start: &str, goal: &str) -> Result<SearchTrace, DomainError> {
        let nodes = self.graph.nodes();
        let mut states: Vec<SearchState> = Vec::new();
        let mut frontier: VecDeque<usize> = VecDeque::new();

        for (pos, node) in nodes.iter().enumerate() {
            if node.name == start {
                states.push(SearchState::root(pos));
                frontier.push_back(states.len() - 1);
            }
        }

        let mut goals = Vec::new();
        let mut found_depth: Option<usize> = None;

        while let Some(current) = frontier.pop_front() {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                debug!("search cancelled with {} states", states.len());
                return Err(DomainError::SearchCancelled {
                    visited: states.len(),
                });
            }

            let state = states[current];
            if found_depth.is_some_and(|d| state.depth > d) {
                continue;
            }

            let node = &nodes[state.node];
            if state.depth > 0 && node.name == goal {
                trace!("goal state {} at depth {}", current, state.depth);
                found_depth.get_or_insert(state.depth);
                goals.push(current);
                continue;
            }
            if state.depth >= self.max_depth {
                continue;
            }

            for (edge_idx, edge) in node.edges.iter().enumerate() {
                let Some(next) = self.graph.position(&edge.child) else {
                    trace!("dropping edge to unknown child {}", edge.child);
                    continue;
                };
                states.push(SearchState {
                    node: next,
                    predecessor: Some(current),
                    edge: Some(edge_idx),
                    depth: state.depth + 1,
                });
                frontier.push_back(states.len() - 1);
            }
        }

        debug!(
            "search {} -> {}: {} goals, {} states",
            start,
            goal,
            goals.len(),
            states.len()
        );
        Ok(SearchTrace { goals, states })
    }
}

/// Uncancellable search with an explicit depth ceiling.
pub fn search_shortest_paths(
    graph: &BreedingGraph,
    start: &str,
    goal: &str,
    max_depth: usize,
) -> SearchTrace {
    let search = PathSearch::new(graph).max_depth(max_depth);
    // Without a cancel flag the search has no failure path.
    search.run(start, goal).unwrap_or_default()
}
