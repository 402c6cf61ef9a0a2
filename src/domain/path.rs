//! Path reconstruction: goal states back into ordered breeding steps.

use std::fmt;

use itertools::Itertools;

use crate::domain::graph::BreedingGraph;
use crate::domain::search::SearchTrace;

/// One breeding step: `parent + spouse = child`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingStep {
    pub parent: String,
    pub spouse: String,
    pub child: String,
}

impl BreedingStep {
    pub fn new(
        parent: impl Into<String>,
        spouse: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            parent: parent.into(),
            spouse: spouse.into(),
            child: child.into(),
        }
    }
}

impl fmt::Display for BreedingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" + \"{}\" = \"{}\"", self.parent, self.spouse, self.child)
    }
}

/// Ordered steps from the search root to one goal.
pub type BreedingPath = Vec<BreedingStep>;

/// Rebuilds paths from a trace produced over `graph`.
///
/// The trace must come from a search over the same graph; indices are not
/// revalidated.
#[derive(Debug, Clone, Copy)]
pub struct PathReconstructor<'a> {
    graph: &'a BreedingGraph,
    trace: &'a SearchTrace,
}

impl<'a> PathReconstructor<'a> {
    pub fn new(graph: &'a BreedingGraph, trace: &'a SearchTrace) -> Self {
        Self { graph, trace }
    }

    /// Steps from the root to the goal state at trace index `goal`.
    ///
    /// # Panics
    /// If `goal` or any back-pointer is out of range for the trace or graph.
    pub fn path(&self, goal: usize) -> BreedingPath {
        let states = self.trace.states();
        let nodes = self.graph.nodes();

        let mut chain = vec![states[goal]];
        while let Some(prev) = chain.last().and_then(|s| s.predecessor) {
            chain.push(states[prev]);
        }
        chain.reverse();

        chain
            .iter()
            .tuple_windows()
            .map(|(prev, cur)| {
                let parent = &nodes[prev.node];
                let spouse = cur
                    .edge
                    .map(|e| parent.edges[e].spouse.clone())
                    .unwrap_or_default();
                BreedingStep::new(parent.name.as_str(), spouse, nodes[cur.node].name.as_str())
            })
            .collect()
    }

    /// One path per goal, in goal discovery order.
    pub fn paths(&self) -> Vec<BreedingPath> {
        self.trace.goals().iter().map(|&g| self.path(g)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formula::BreedingRecord;
    use crate::domain::search::search_shortest_paths;

    fn build(records: &[(&str, &str, &str)]) -> BreedingGraph {
        let records: Vec<BreedingRecord> = records
            .iter()
            .map(|(a, b, c)| BreedingRecord::new(*a, *b, *c))
            .collect();
        BreedingGraph::build(&records)
    }

    #[test]
    fn given_chain_when_reconstructing_then_steps_root_to_goal() {
        let graph = build(&[("A", "B", "C"), ("C", "D", "E")]);
        let trace = search_shortest_paths(&graph, "A", "E", 5);

        let paths = PathReconstructor::new(&graph, &trace).paths();

        assert_eq!(
            paths,
            vec![vec![
                BreedingStep::new("A", "B", "C"),
                BreedingStep::new("C", "D", "E"),
            ]]
        );
    }

    #[test]
    fn given_second_parent_start_when_reconstructing_then_spouse_is_first_parent() {
        let graph = build(&[("A", "B", "C")]);
        let trace = search_shortest_paths(&graph, "B", "C", 5);

        let paths = PathReconstructor::new(&graph, &trace).paths();

        assert_eq!(paths, vec![vec![BreedingStep::new("B", "A", "C")]]);
    }

    #[test]
    fn given_self_breeding_when_reconstructing_then_spouse_is_self() {
        let graph = build(&[("A", "A", "B")]);
        let trace = search_shortest_paths(&graph, "A", "B", 5);

        let paths = PathReconstructor::new(&graph, &trace).paths();

        assert_eq!(paths, vec![vec![BreedingStep::new("A", "A", "B")]]);
    }

    #[test]
    fn given_no_goals_when_reconstructing_then_no_paths() {
        let graph = build(&[("A", "B", "C")]);
        let trace = search_shortest_paths(&graph, "C", "A", 5);

        assert!(PathReconstructor::new(&graph, &trace).paths().is_empty());
    }

    #[test]
    fn given_step_when_displayed_then_quotes_names() {
        let step = BreedingStep::new("A", "B", "C");
        assert_eq!(step.to_string(), r#""A" + "B" = "C""#);
    }
}
