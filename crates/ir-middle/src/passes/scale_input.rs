//! Global input scaling

use super::{AddMeanScaleValues, PreMiddleStart};
use crate::error::PassError;
use crate::graph::{Graph, PARAMETER};
use crate::pattern::{Match, NodeMatcher, Pattern};
use crate::pipeline::{MiddleReplacement, PassContext};

/// Scales every model input by the run's `scale` value.
///
/// Matches `Parameter -> data` and inserts a `Mul` by `scale` between the
/// data node and its consumers. A missing scale or a scale of exactly `1`
/// leaves the graph untouched; a scale of `0` is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleInput;

impl ScaleInput {
    /// Pass name
    pub const NAME: &'static str = "ScaleInput";
}

impl MiddleReplacement for ScaleInput {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run_after(&self) -> Vec<&'static str> {
        vec![PreMiddleStart::NAME]
    }

    fn run_before(&self) -> Vec<&'static str> {
        vec![AddMeanScaleValues::NAME]
    }

    fn pattern(&self) -> Option<Pattern> {
        Some(
            Pattern::new()
                .node("placeholder", NodeMatcher::op(PARAMETER))
                .node("data", NodeMatcher::data())
                .edge("placeholder", "data"),
        )
    }

    fn replace_pattern(
        &self,
        graph: &mut Graph,
        matched: &Match,
        ctx: &PassContext<'_>,
    ) -> Result<(), PassError> {
        let Some(scale) = ctx.config.effective_scale() else {
            return Ok(());
        };

        let placeholder = matched.node("placeholder")?;
        let data = matched.node("data")?;
        if graph.consumers(data).is_empty() {
            let name = graph
                .node(placeholder)
                .map_or_else(|| format!("{placeholder:?}"), |node| node.name.clone());
            return Err(PassError::malformed(format!(
                "input '{name}' has no consumers"
            )));
        }

        AddMeanScaleValues::apply_scale(graph, placeholder, &[scale])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::graph::{Port, MUL};

    fn single_input() -> Graph {
        let mut graph = Graph::new();
        let input = graph.add_op("input", PARAMETER).unwrap();
        let data = graph.add_data("input/out").unwrap();
        let relu = graph.add_op("relu", "ReLU").unwrap();
        graph.connect(input, data, Port(0)).unwrap();
        graph.connect(data, relu, Port(0)).unwrap();
        graph
    }

    fn run(graph: &mut Graph, config: &RunConfig) -> Result<(), PassError> {
        ScaleInput.find_and_replace_pattern(graph, &PassContext::new(config))
    }

    #[test]
    fn no_scale_is_noop() {
        let mut graph = single_input();
        run(&mut graph, &RunConfig::new()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn unit_scale_is_noop() {
        let mut graph = single_input();
        run(&mut graph, &RunConfig::new().with_scale(1.0)).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn inserts_mul() {
        let mut graph = single_input();
        run(&mut graph, &RunConfig::new().with_scale(2.0)).unwrap();
        assert_eq!(graph.ops_of_type(MUL).len(), 1);
    }

    #[test]
    fn declares_ordering() {
        assert_eq!(ScaleInput.run_after(), vec!["PreMiddleStart"]);
        assert_eq!(ScaleInput.run_before(), vec!["AddMeanScaleValues"]);
    }
}
