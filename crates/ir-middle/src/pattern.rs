//! Subgraph patterns
//!
//! A [`Pattern`] is a small set of labelled node matchers plus labelled
//! edges. [`Pattern::find_matches`] enumerates every injective assignment of
//! graph nodes to labels that satisfies the matchers and edges.

use crate::error::PassError;
use crate::graph::{Graph, Node, NodeKind};
use petgraph::stable_graph::NodeIndex;
use std::collections::HashMap;

/// Predicate over a single node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMatcher {
    kind: Option<NodeKind>,
    op: Option<String>,
}

impl NodeMatcher {
    /// Any node
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Op node of the given type
    #[must_use]
    pub fn op(op: impl Into<String>) -> Self {
        Self {
            kind: Some(NodeKind::Op),
            op: Some(op.into()),
        }
    }

    /// Any data node
    #[must_use]
    pub fn data() -> Self {
        Self {
            kind: Some(NodeKind::Data),
            op: None,
        }
    }

    /// Check a node against this matcher
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        self.kind.map_or(true, |kind| kind == node.kind)
            && self
                .op
                .as_deref()
                .map_or(true, |op| node.op.as_deref() == Some(op))
    }
}

/// Labelled subgraph shape
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    nodes: Vec<(&'static str, NodeMatcher)>,
    edges: Vec<(&'static str, &'static str)>,
}

impl Pattern {
    /// Create empty pattern
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a labelled node
    #[must_use]
    pub fn node(mut self, label: &'static str, matcher: NodeMatcher) -> Self {
        self.nodes.push((label, matcher));
        self
    }

    /// Add a directed edge between two labels
    ///
    /// An edge naming an unknown label makes the pattern unmatchable.
    #[must_use]
    pub fn edge(mut self, from: &'static str, to: &'static str) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.iter().map(|(label, _)| *label)
    }

    /// All matches, in ascending node-index order of the first label
    #[must_use]
    pub fn find_matches(&self, graph: &Graph) -> Vec<Match> {
        let mut found = Vec::new();
        if self.nodes.is_empty() || !self.edges_are_labelled() {
            return found;
        }
        let mut assigned = Vec::with_capacity(self.nodes.len());
        self.extend(graph, &mut assigned, &mut found);
        found
    }

    fn extend(&self, graph: &Graph, assigned: &mut Vec<NodeIndex>, found: &mut Vec<Match>) {
        let depth = assigned.len();
        if depth == self.nodes.len() {
            let nodes = self
                .labels()
                .zip(assigned.iter().copied())
                .collect::<HashMap<_, _>>();
            found.push(Match { nodes });
            return;
        }

        let matcher = &self.nodes[depth].1;
        for candidate in graph.node_indices() {
            if assigned.contains(&candidate) {
                continue;
            }
            let Some(node) = graph.node(candidate) else {
                continue;
            };
            if !matcher.matches(node) {
                continue;
            }

            assigned.push(candidate);
            if self.edges_hold(graph, assigned) {
                self.extend(graph, assigned, found);
            }
            assigned.pop();
        }
    }

    /// Every edge whose endpoints are both assigned exists in the graph
    fn edges_hold(&self, graph: &Graph, assigned: &[NodeIndex]) -> bool {
        self.edges.iter().all(|(from, to)| {
            match (self.position(from), self.position(to)) {
                (Some(from), Some(to)) if from < assigned.len() && to < assigned.len() => {
                    graph.has_edge(assigned[from], assigned[to])
                }
                _ => true,
            }
        })
    }

    fn edges_are_labelled(&self) -> bool {
        self.edges
            .iter()
            .all(|(from, to)| self.position(from).is_some() && self.position(to).is_some())
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.nodes.iter().position(|(name, _)| *name == label)
    }
}

/// Assignment of graph nodes to pattern labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    nodes: HashMap<&'static str, NodeIndex>,
}

impl Match {
    /// Node bound to `label`
    #[must_use]
    pub fn get(&self, label: &str) -> Option<NodeIndex> {
        self.nodes.get(label).copied()
    }

    /// Node bound to `label`, as a pass error when missing
    ///
    /// # Errors
    /// Returns [`PassError::UnboundLabel`] if the label is not in the match.
    pub fn node(&self, label: &'static str) -> Result<NodeIndex, PassError> {
        self.get(label).ok_or(PassError::UnboundLabel(label))
    }

    /// Check that every matched node is still in the graph
    #[must_use]
    pub fn is_live(&self, graph: &Graph) -> bool {
        self.nodes.values().all(|index| graph.contains(*index))
    }
}
