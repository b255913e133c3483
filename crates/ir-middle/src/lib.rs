//! IR Middle - graph rewrites between model loading and IR emission
//!
//! Provides:
//! - A bipartite op/data model graph with port-annotated edges
//! - Declarative subgraph patterns
//! - A pass pipeline ordered by named `run_after` / `run_before` constraints
//! - Input preprocessing passes (`ScaleInput`, `AddMeanScaleValues`)
//!
//! # Example
//!
//! ```rust,ignore
//! use ir_middle::prelude::*;
//!
//! let mut graph = Graph::new();
//! let input = graph.add_op("data", PARAMETER)?;
//! let out = graph.add_data("data/out")?;
//! let conv = graph.add_op("conv", "Convolution")?;
//! graph.connect(input, out, Port(0))?;
//! graph.connect(out, conv, Port(0))?;
//!
//! let config = RunConfig::new().with_scale(255.0);
//! let report = PassPipeline::with_defaults().run(&mut graph, &config)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod graph;
pub mod passes;
pub mod pattern;
pub mod pipeline;

// Re-exports for convenience
pub use config::{MeanScaleValues, RunConfig};
pub use error::{ConfigError, GraphError, PassError, PipelineError};
pub use graph::{Graph, Node, NodeKind, Port};
pub use pattern::{Match, NodeMatcher, Pattern};
pub use petgraph::stable_graph::NodeIndex;
pub use pipeline::{MiddleReplacement, PassContext, PassPipeline, PipelineReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and rewriting graphs
    pub use crate::config::{MeanScaleValues, RunConfig};
    pub use crate::graph::{Graph, Node, NodeKind, Port, ADD, CONST, MUL, PARAMETER, RESULT};
    pub use crate::passes::{AddMeanScaleValues, MiddleFinish, MiddleStart, PreMiddleStart, ScaleInput};
    pub use crate::pattern::{Match, NodeMatcher, Pattern};
    pub use crate::pipeline::{MiddleReplacement, PassContext, PassPipeline};
    pub use crate::NodeIndex;
}
