//! Breeding graph: one node per entity, edges are `(spouse, child)` recipes.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::formula::BreedingRecord;

/// "This node, paired with `spouse`, yields `child`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedEdge {
    pub spouse: String,
    pub child: String,
}

impl BreedEdge {
    pub fn new(spouse: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            spouse: spouse.into(),
            child: child.into(),
        }
    }
}

/// Graph vertex owning every recipe where `name` is one of the parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingNode {
    pub name: String,
    /// Outgoing recipes in record-processing order
    pub edges: Vec<BreedEdge>,
}

impl BreedingNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edges: Vec::new(),
        }
    }

    pub fn with_edges(name: impl Into<String>, edges: Vec<BreedEdge>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }

    /// True if the entity never appears as a parent.
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Nodes in creation order plus a `name -> position` index.
///
/// The index points at the first node carrying a name; hand-built graphs may
/// hold several nodes with the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedingGraph {
    nodes: Vec<BreedingNode>,
    index: HashMap<String, usize>,
}

impl BreedingGraph {
    /// Builds the graph from already validated records.
    ///
    /// Each record contributes one edge per distinct parent role: `(p0, spouse p1)`
    /// and `(p1, spouse p0)`, or a single `(p0, spouse p0)` for self-breeding.
    /// The child gets a node too, created after the parent roles.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn build(records: &[BreedingRecord]) -> Self {
        let mut graph = Self::default();

        for record in records {
            let [p0, p1] = &record.parents;
            graph
                .node_entry(p0)
                .edges
                .push(BreedEdge::new(p1.as_str(), record.child.as_str()));
            if !record.is_self_breeding() {
                graph
                    .node_entry(p1)
                    .edges
                    .push(BreedEdge::new(p0.as_str(), record.child.as_str()));
            }
            graph.node_entry(&record.child);
        }

        debug!(
            "built graph: {} nodes, {} edges",
            graph.len(),
            graph.edge_count()
        );
        graph
    }

    /// Wraps nodes as given, without merging same-named nodes.
    pub fn from_nodes(nodes: Vec<BreedingNode>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            index.entry(node.name.clone()).or_insert(pos);
        }
        Self { nodes, index }
    }

    fn node_entry(&mut self, name: &str) -> &mut BreedingNode {
        let pos = match self.index.get(name) {
            Some(&pos) => pos,
            None => {
                let pos = self.nodes.len();
                self.nodes.push(BreedingNode::new(name));
                self.index.insert(name.to_string(), pos);
                pos
            }
        };
        &mut self.nodes[pos]
    }

    pub fn nodes(&self) -> &[BreedingNode] {
        &self.nodes
    }

    pub fn node(&self, pos: usize) -> Option<&BreedingNode> {
        self.nodes.get(pos)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&BreedingNode> {
        self.position(name).and_then(|pos| self.nodes.get(pos))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }
}
