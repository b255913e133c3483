//! Model graph
//!
//! A bipartite directed graph of op nodes and data nodes. Edges carry the
//! port on the op side: `op -> data` edges hold the op's output port,
//! `data -> op` edges hold the op's input port.

use crate::error::GraphError;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Op type of model inputs
pub const PARAMETER: &str = "Parameter";
/// Op type of constant tensors
pub const CONST: &str = "Const";
/// Op type of elementwise multiplication
pub const MUL: &str = "Mul";
/// Op type of elementwise addition
pub const ADD: &str = "Add";
/// Op type of model outputs
pub const RESULT: &str = "Result";

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Operation
    Op,
    /// Tensor flowing between operations
    Data,
}

/// Graph node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique name
    pub name: String,
    /// Op or data
    pub kind: NodeKind,
    /// Op type (op nodes only)
    pub op: Option<String>,
    /// Constant value, if known
    pub value: Option<Vec<f64>>,
    /// Tensor shape, if known
    pub shape: Option<Vec<usize>>,
}

impl Node {
    /// Create an op node
    #[must_use]
    pub fn op(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Op,
            op: Some(op.into()),
            value: None,
            shape: None,
        }
    }

    /// Create a data node
    #[must_use]
    pub fn data(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Data,
            op: None,
            value: None,
            shape: None,
        }
    }

    /// With a tensor shape
    #[must_use]
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Check if this is an op of the given type
    #[inline]
    #[must_use]
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == NodeKind::Op && self.op.as_deref() == Some(op)
    }
}

/// Port on the op side of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(pub usize);

/// Model graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: StableDiGraph<Node, Port>,
    names: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Create empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of live edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Check if node is live
    #[must_use]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.inner.contains_node(index)
    }

    /// Get node by index
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.inner.node_weight(index)
    }

    /// Get mutable node by index
    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.inner.node_weight_mut(index)
    }

    /// Look up node by name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    /// Live node indices in ascending order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    /// All op nodes of the given type
    #[must_use]
    pub fn ops_of_type(&self, op: &str) -> Vec<NodeIndex> {
        self.inner
            .node_indices()
            .filter(|index| self.inner[*index].is_op(op))
            .collect()
    }

    /// Add a node; names must be unique
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateName`] if the name is taken.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, GraphError> {
        if self.names.contains_key(&node.name) {
            return Err(GraphError::DuplicateName(node.name));
        }
        let name = node.name.clone();
        let index = self.inner.add_node(node);
        self.names.insert(name, index);
        Ok(index)
    }

    /// Add an op node
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateName`] if the name is taken.
    pub fn add_op(&mut self, name: &str, op: &str) -> Result<NodeIndex, GraphError> {
        self.add_node(Node::op(name, op))
    }

    /// Add a data node
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateName`] if the name is taken.
    pub fn add_data(&mut self, name: &str) -> Result<NodeIndex, GraphError> {
        self.add_node(Node::data(name))
    }

    /// Add a `Const` op and its output data node holding `values`
    ///
    /// Returns `(op, data)`.
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateName`] if either name is taken.
    pub fn add_const(
        &mut self,
        name: &str,
        values: Vec<f64>,
    ) -> Result<(NodeIndex, NodeIndex), GraphError> {
        let shape = vec![values.len()];
        let mut op = Node::op(name, CONST);
        op.value = Some(values.clone());

        let data_name = self.unique_name(&format!("{name}/data"));
        let mut data = Node::data(data_name).with_shape(shape);
        data.value = Some(values);

        let op = self.add_node(op)?;
        let data = self.add_node(data)?;
        self.connect(op, data, Port(0))?;
        Ok((op, data))
    }

    /// Remove a node and all its edges
    pub fn remove_node(&mut self, index: NodeIndex) -> Option<Node> {
        let node = self.inner.remove_node(index)?;
        self.names.remove(&node.name);
        Some(node)
    }

    /// First free name derived from `base`
    #[must_use]
    pub fn unique_name(&self, base: &str) -> String {
        if !self.names.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Connect two nodes; `port` is the port on the op side
    ///
    /// # Errors
    /// Returns [`GraphError::NodeNotFound`] for dead indices and
    /// [`GraphError::InvalidEdge`] unless the edge joins an op and a data node.
    pub fn connect(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        port: Port,
    ) -> Result<(), GraphError> {
        let source = self.node(from).ok_or(GraphError::NodeNotFound(from))?;
        let target = self.node(to).ok_or(GraphError::NodeNotFound(to))?;
        if source.kind == target.kind {
            return Err(GraphError::InvalidEdge {
                from: source.name.clone(),
                to: target.name.clone(),
                reason: "edges must join an op and a data node",
            });
        }
        self.inner.add_edge(from, to, port);
        Ok(())
    }

    /// Check for a direct edge
    #[must_use]
    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.inner.find_edge(from, to).is_some()
    }

    /// Data nodes written by an op, ordered by output port
    #[must_use]
    pub fn out_nodes(&self, op: NodeIndex) -> Vec<NodeIndex> {
        self.out_edges(op).into_iter().map(|(node, _)| node).collect()
    }

    /// Data nodes read by an op, ordered by input port
    #[must_use]
    pub fn in_nodes(&self, op: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(op, Direction::Incoming)
            .map(|edge| (*edge.weight(), edge.source()))
            .collect();
        edges.sort();
        edges.into_iter().map(|(_, node)| node).collect()
    }

    /// Op that writes a data node
    #[must_use]
    pub fn producer(&self, data: NodeIndex) -> Option<NodeIndex> {
        self.inner
            .edges_directed(data, Direction::Incoming)
            .map(|edge| edge.source())
            .next()
    }

    /// Ops reading a data node, with the input port they read it on
    #[must_use]
    pub fn consumers(&self, data: NodeIndex) -> Vec<(NodeIndex, Port)> {
        self.out_edges(data)
    }

    /// Move every consumer of `from` over to `to`, keeping input ports
    ///
    /// # Errors
    /// Returns [`GraphError::NodeNotFound`] for dead indices.
    pub fn reroute_consumers(&mut self, from: NodeIndex, to: NodeIndex) -> Result<(), GraphError> {
        if !self.contains(from) {
            return Err(GraphError::NodeNotFound(from));
        }
        if !self.contains(to) {
            return Err(GraphError::NodeNotFound(to));
        }

        let edges: Vec<_> = self
            .inner
            .edges_directed(from, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target(), *edge.weight()))
            .collect();

        for (edge, consumer, port) in edges {
            self.inner.remove_edge(edge);
            self.inner.add_edge(to, consumer, port);
        }
        Ok(())
    }

    /// Check structural invariants
    ///
    /// Every data node has at most one producer and every op input port is
    /// fed by at most one data node.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), GraphError> {
        for index in self.inner.node_indices() {
            let node = &self.inner[index];
            match node.kind {
                NodeKind::Data => {
                    let producers = self
                        .inner
                        .edges_directed(index, Direction::Incoming)
                        .count();
                    if producers > 1 {
                        return Err(GraphError::MultipleProducers {
                            node: node.name.clone(),
                            producers,
                        });
                    }
                }
                NodeKind::Op => {
                    let mut seen = HashSet::new();
                    for edge in self.inner.edges_directed(index, Direction::Incoming) {
                        if !seen.insert(edge.weight().0) {
                            return Err(GraphError::DuplicateInputPort {
                                node: node.name.clone(),
                                port: edge.weight().0,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn out_edges(&self, index: NodeIndex) -> Vec<(NodeIndex, Port)> {
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();
        edges.sort_by_key(|(node, port)| (*port, node.index()));
        edges
    }
}
