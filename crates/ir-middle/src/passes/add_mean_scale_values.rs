//! Per-input mean and scale preprocessing
//!
//! Owns the helpers that splice a binary op with a constant operand between
//! an input and its consumers. [`ScaleInput`](super::ScaleInput) reuses
//! [`AddMeanScaleValues::apply_scale`] for the global scale.

use super::MiddleStart;
use crate::error::PassError;
use crate::graph::{Graph, Port, ADD, MUL, PARAMETER};
use crate::pipeline::{MiddleReplacement, PassContext};
use petgraph::stable_graph::NodeIndex;

/// Applies `mean_scale_values` from the run configuration.
///
/// For each configured input the graph becomes
/// `Parameter -> Add(-mean) -> Mul(scale) -> consumers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddMeanScaleValues;

impl AddMeanScaleValues {
    /// Pass name
    pub const NAME: &'static str = "AddMeanScaleValues";

    /// Insert `Mul(scale)` right after `input`.
    ///
    /// All-ones (or empty) `scale` is a no-op and returns `Ok(None)`;
    /// otherwise returns the new `Mul` node.
    ///
    /// # Errors
    /// Returns [`PassError::MalformedGraph`] if `input` is not a live op with
    /// an output data node.
    #[allow(clippy::float_cmp)]
    pub fn apply_scale(
        graph: &mut Graph,
        input: NodeIndex,
        scale: &[f64],
    ) -> Result<Option<NodeIndex>, PassError> {
        if scale.iter().all(|value| *value == 1.0) {
            return Ok(None);
        }
        insert_after(graph, input, MUL, "scale", scale.to_vec()).map(Some)
    }

    /// Insert `Add(-mean)` right after `input`.
    ///
    /// All-zeros (or empty) `mean` is a no-op and returns `Ok(None)`;
    /// otherwise returns the new `Add` node.
    ///
    /// # Errors
    /// Returns [`PassError::MalformedGraph`] if `input` is not a live op with
    /// an output data node.
    #[allow(clippy::float_cmp)]
    pub fn apply_mean(
        graph: &mut Graph,
        input: NodeIndex,
        mean: &[f64],
    ) -> Result<Option<NodeIndex>, PassError> {
        if mean.iter().all(|value| *value == 0.0) {
            return Ok(None);
        }
        let negated = mean.iter().map(|value| -value).collect();
        insert_after(graph, input, ADD, "mean", negated).map(Some)
    }
}

impl MiddleReplacement for AddMeanScaleValues {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run_before(&self) -> Vec<&'static str> {
        vec![MiddleStart::NAME]
    }

    fn find_and_replace_pattern(
        &self,
        graph: &mut Graph,
        ctx: &PassContext<'_>,
    ) -> Result<(), PassError> {
        for (input_name, values) in &ctx.config.mean_scale_values {
            let input = graph
                .find(input_name)
                .filter(|index| graph.node(*index).is_some_and(|node| node.is_op(PARAMETER)))
                .ok_or_else(|| PassError::UnknownInput(input_name.clone()))?;

            if let Some(scale) = &values.scale {
                Self::apply_scale(graph, input, scale)?;
            }
            if let Some(mean) = &values.mean {
                Self::apply_mean(graph, input, mean)?;
            }
        }
        Ok(())
    }
}

/// Splice `op_type(input_data, const)` between `input` and its consumers
fn insert_after(
    graph: &mut Graph,
    input: NodeIndex,
    op_type: &str,
    suffix: &str,
    values: Vec<f64>,
) -> Result<NodeIndex, PassError> {
    let input_name = graph
        .node(input)
        .map(|node| node.name.clone())
        .ok_or_else(|| PassError::malformed(format!("input {input:?} is not in the graph")))?;
    let data = graph
        .out_nodes(input)
        .first()
        .copied()
        .ok_or_else(|| PassError::malformed(format!("input '{input_name}' has no output data")))?;

    let op_name = graph.unique_name(&format!("{input_name}/{suffix}"));
    let const_name = graph.unique_name(&format!("{op_name}/value"));
    let (_, const_data) = graph.add_const(&const_name, values)?;
    let op = graph.add_op(&op_name, op_type)?;
    let out_name = graph.unique_name(&format!("{op_name}/out"));
    let out = graph.add_data(&out_name)?;

    let shape = graph.node(data).and_then(|node| node.shape.clone());
    if let Some(node) = graph.node_mut(out) {
        node.shape = shape;
    }

    graph.reroute_consumers(data, out)?;
    graph.connect(data, op, Port(0))?;
    graph.connect(const_data, op, Port(1))?;
    graph.connect(op, out, Port(0))?;

    tracing::debug!("Inserted {} '{}' after input '{}'", op_type, op_name, input_name);
    Ok(op)
}
