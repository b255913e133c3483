//! Pass pipeline
//!
//! Passes declare ordering constraints by name (`run_after`, `run_before`).
//! [`PassPipeline`] resolves them with a topological sort, then runs every
//! enabled pass once against the graph, checking graph consistency after
//! each pass.

use crate::config::RunConfig;
use crate::error::{PassError, PipelineError};
use crate::graph::Graph;
use crate::pattern::{Match, Pattern};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

/// Per-run state handed to every pass
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// Global run configuration
    pub config: &'a RunConfig,
}

impl<'a> PassContext<'a> {
    /// Create context for a run
    #[must_use]
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }
}

/// A middle-stage graph rewrite
///
/// Pattern-based passes implement [`pattern`](Self::pattern) and
/// [`replace_pattern`](Self::replace_pattern); whole-graph passes override
/// [`find_and_replace_pattern`](Self::find_and_replace_pattern) instead.
pub trait MiddleReplacement {
    /// Unique pass name used in ordering constraints
    fn name(&self) -> &'static str;

    /// Disabled passes keep their place in the order but are skipped
    fn enabled(&self) -> bool {
        true
    }

    /// Passes that must run before this one
    fn run_after(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Passes that must run after this one
    fn run_before(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Subgraph this pass rewrites
    fn pattern(&self) -> Option<Pattern> {
        None
    }

    /// Rewrite one match
    ///
    /// # Errors
    /// A pass error aborts the whole pipeline run.
    fn replace_pattern(
        &self,
        _graph: &mut Graph,
        _matched: &Match,
        _ctx: &PassContext<'_>,
    ) -> Result<(), PassError> {
        Ok(())
    }

    /// Apply the pass to the whole graph
    ///
    /// Matches are collected before the first rewrite; matches whose nodes
    /// were removed by an earlier rewrite are skipped.
    ///
    /// # Errors
    /// Propagates the first error from [`replace_pattern`](Self::replace_pattern).
    fn find_and_replace_pattern(
        &self,
        graph: &mut Graph,
        ctx: &PassContext<'_>,
    ) -> Result<(), PassError> {
        let Some(pattern) = self.pattern() else {
            return Ok(());
        };
        for matched in pattern.find_matches(graph) {
            if !matched.is_live(graph) {
                continue;
            }
            self.replace_pattern(graph, &matched, ctx)?;
        }
        Ok(())
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Passes executed, in order
    pub passes_run: Vec<&'static str>,
    /// Passes skipped because they were disabled
    pub passes_skipped: Vec<&'static str>,
    /// Node count before the first pass
    pub nodes_before: usize,
    /// Node count after the last pass
    pub nodes_after: usize,
}

/// Ordered collection of passes
#[derive(Default)]
pub struct PassPipeline {
    passes: Vec<Box<dyn MiddleReplacement>>,
}

impl std::fmt::Debug for PassPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassPipeline")
            .field("passes", &self.names())
            .finish()
    }
}

impl PassPipeline {
    /// Create empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with the built-in middle passes and stage markers
    #[must_use]
    pub fn with_defaults() -> Self {
        use crate::passes::{AddMeanScaleValues, MiddleFinish, MiddleStart, PreMiddleStart, ScaleInput};

        let passes: Vec<Box<dyn MiddleReplacement>> = vec![
            Box::new(PreMiddleStart),
            Box::new(ScaleInput),
            Box::new(AddMeanScaleValues),
            Box::new(MiddleStart),
            Box::new(MiddleFinish),
        ];
        Self { passes }
    }

    /// Register a pass
    ///
    /// # Errors
    /// Returns [`PipelineError::DuplicatePass`] if the name is taken.
    pub fn register(
        &mut self,
        pass: impl MiddleReplacement + 'static,
    ) -> Result<&mut Self, PipelineError> {
        if self.contains(pass.name()) {
            return Err(PipelineError::DuplicatePass(pass.name()));
        }
        self.passes.push(Box::new(pass));
        Ok(self)
    }

    /// Check if a pass is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.passes.iter().any(|pass| pass.name() == name)
    }

    /// Registered pass names, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Number of registered passes
    #[must_use]
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if no pass is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Execution order satisfying every constraint
    ///
    /// Constraints naming unregistered passes are ignored.
    ///
    /// # Errors
    /// Returns [`PipelineError::OrderingCycle`] if the constraints conflict.
    pub fn order(&self) -> Result<Vec<&'static str>, PipelineError> {
        let mut dependencies = DiGraphMap::<&'static str, ()>::new();
        for pass in &self.passes {
            dependencies.add_node(pass.name());
        }

        for pass in &self.passes {
            let name = pass.name();
            for after in pass.run_after() {
                if self.contains(after) {
                    dependencies.add_edge(after, name, ());
                } else {
                    tracing::warn!("Pass {} runs after unregistered pass {}", name, after);
                }
            }
            for before in pass.run_before() {
                if self.contains(before) {
                    dependencies.add_edge(name, before, ());
                } else {
                    tracing::warn!("Pass {} runs before unregistered pass {}", name, before);
                }
            }
        }

        toposort(&dependencies, None).map_err(|cycle| PipelineError::OrderingCycle(cycle.node_id()))
    }

    /// Run every enabled pass once, in dependency order
    ///
    /// # Errors
    /// Returns the first pass failure or consistency violation; passes after
    /// it do not run.
    pub fn run(&self, graph: &mut Graph, config: &RunConfig) -> Result<PipelineReport, PipelineError> {
        let order = self.order()?;
        let ctx = PassContext::new(config);
        let mut report = PipelineReport {
            passes_run: Vec::with_capacity(order.len()),
            passes_skipped: Vec::new(),
            nodes_before: graph.node_count(),
            nodes_after: graph.node_count(),
        };

        for name in order {
            let Some(pass) = self.passes.iter().find(|pass| pass.name() == name) else {
                continue;
            };
            if !pass.enabled() {
                tracing::debug!("Skipping disabled pass {}", name);
                report.passes_skipped.push(name);
                continue;
            }

            tracing::debug!("Running pass {}", name);
            pass.find_and_replace_pattern(graph, &ctx)
                .map_err(|source| PipelineError::PassFailed { pass: name, source })?;
            graph
                .validate()
                .map_err(|source| PipelineError::InconsistentGraph { pass: name, source })?;
            report.passes_run.push(name);
        }

        report.nodes_after = graph.node_count();
        tracing::info!(
            "Pipeline finished: {} passes, {} -> {} nodes",
            report.passes_run.len(),
            report.nodes_before,
            report.nodes_after
        );
        Ok(report)
    }
}
