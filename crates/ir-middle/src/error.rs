//! Error types for the middle-stage pipeline
//!
//! Provides error handling for:
//! - Graph mutation (node/edge bookkeeping)
//! - Individual pass failures
//! - Pipeline ordering and execution
//! - Run configuration loading

use petgraph::stable_graph::NodeIndex;
use std::path::PathBuf;

/// Errors raised by graph mutation and consistency checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node index does not refer to a live node
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeIndex),

    /// Node names are unique within a graph
    #[error("duplicate node name: '{0}'")]
    DuplicateName(String),

    /// Edge does not alternate between op and data nodes
    #[error("invalid edge '{from}' -> '{to}': {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: &'static str,
    },

    /// Data node written by more than one op
    #[error("data node '{node}' has {producers} producers")]
    MultipleProducers { node: String, producers: usize },

    /// Two data nodes feed the same input port
    #[error("op '{node}' has more than one input on port {port}")]
    DuplicateInputPort { node: String, port: usize },
}

/// Errors raised while a single pass rewrites the graph
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// Upstream invariant violated; the graph cannot be rewritten safely
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// Pattern label missing from a match
    #[error("pattern label '{0}' is not bound in the match")]
    UnboundLabel(&'static str),

    /// Configuration names an input the graph does not have
    #[error("input '{0}' was not found among the graph parameters")]
    UnknownInput(String),

    /// Graph mutation failed
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl PassError {
    /// Create malformed graph error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedGraph(message.into())
    }
}

/// Errors raised by the pass pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Two passes registered under one name
    #[error("duplicate pass: '{0}'")]
    DuplicatePass(&'static str),

    /// `run_after` / `run_before` constraints cannot be satisfied
    #[error("pass ordering contains a cycle through '{0}'")]
    OrderingCycle(&'static str),

    /// A pass failed; the run is aborted
    #[error("pass '{pass}' failed: {source}")]
    PassFailed {
        pass: &'static str,
        #[source]
        source: PassError,
    },

    /// A pass left the graph in an inconsistent state
    #[error("graph inconsistent after pass '{pass}': {source}")]
    InconsistentGraph {
        pass: &'static str,
        #[source]
        source: GraphError,
    },
}

/// Errors loading a run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for [`RunConfig`](crate::RunConfig)
    #[error("invalid run configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
