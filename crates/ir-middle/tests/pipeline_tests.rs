//! Pass ordering, mean/scale preprocessing and run configuration loading

use ir_middle::graph::{ADD, MUL};
use ir_middle::prelude::*;
use ir_middle::{ConfigError, PassError, PipelineError};
use ir_test_utils::single_input_graph;
use pretty_assertions::assert_eq;

#[test]
fn default_order_respects_constraints() {
    let order = PassPipeline::with_defaults().order().unwrap();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();

    assert!(position("PreMiddleStart") < position("ScaleInput"));
    assert!(position("ScaleInput") < position("AddMeanScaleValues"));
    assert!(position("AddMeanScaleValues") < position("MiddleStart"));
    assert!(position("MiddleStart") < position("MiddleFinish"));
}

#[test]
fn report_lists_every_pass() {
    let mut fixture = single_input_graph("data");
    let report = PassPipeline::with_defaults()
        .run(&mut fixture.graph, &RunConfig::new())
        .unwrap();

    assert_eq!(report.passes_run.len(), 5);
    assert!(report.passes_skipped.is_empty());
    assert_eq!(report.nodes_before, report.nodes_after);
}

struct Pinned {
    name: &'static str,
    after: Vec<&'static str>,
}

impl MiddleReplacement for Pinned {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run_after(&self) -> Vec<&'static str> {
        self.after.clone()
    }
}

#[test]
fn cyclic_constraints_are_rejected() {
    let mut pipeline = PassPipeline::new();
    pipeline
        .register(Pinned { name: "a", after: vec!["b"] })
        .unwrap()
        .register(Pinned { name: "b", after: vec!["a"] })
        .unwrap();

    let mut graph = Graph::new();
    let err = pipeline.run(&mut graph, &RunConfig::new()).unwrap_err();
    assert!(matches!(err, PipelineError::OrderingCycle(_)));
}

#[test]
fn custom_pass_joins_default_order() {
    let mut pipeline = PassPipeline::with_defaults();
    pipeline
        .register(Pinned {
            name: "Custom",
            after: vec![MiddleFinish::NAME, "NotRegistered"],
        })
        .unwrap();

    let order = pipeline.order().unwrap();
    assert_eq!(order.last(), Some(&"Custom"));
}

#[test]
fn mean_and_scale_chain() {
    let mut fixture = single_input_graph("data");
    let config = RunConfig::new().with_mean_scale_values(
        "data",
        MeanScaleValues::mean(vec![104.0, 117.0, 123.0]).with_scale(vec![0.5, 0.5, 0.5]),
    );

    PassPipeline::with_defaults()
        .run(&mut fixture.graph, &config)
        .unwrap();
    let graph = &fixture.graph;

    let (add, _) = graph.consumers(fixture.data)[0];
    assert!(graph.node(add).unwrap().is_op(ADD));
    let add_out = graph.out_nodes(add)[0];
    let (mul, _) = graph.consumers(add_out)[0];
    assert!(graph.node(mul).unwrap().is_op(MUL));
    let mul_out = graph.out_nodes(mul)[0];
    assert_eq!(graph.consumers(mul_out), vec![(fixture.consumer, Port(0))]);

    let mean = graph.node(graph.in_nodes(add)[1]).unwrap().value.clone();
    assert_eq!(mean, Some(vec![-104.0, -117.0, -123.0]));
}

#[test]
fn global_and_per_input_scale_stack() {
    let mut fixture = single_input_graph("data");
    let config = RunConfig::new()
        .with_scale(255.0)
        .with_mean_scale_values("data", MeanScaleValues::scale(vec![2.0]));

    PassPipeline::with_defaults()
        .run(&mut fixture.graph, &config)
        .unwrap();

    assert_eq!(fixture.graph.ops_of_type(MUL).len(), 2);
}

#[test]
fn unknown_input_fails_pipeline() {
    let mut fixture = single_input_graph("data");
    let config = RunConfig::new().with_mean_scale_values("image", MeanScaleValues::mean(vec![1.0]));

    let err = PassPipeline::with_defaults()
        .run(&mut fixture.graph, &config)
        .unwrap_err();

    match err {
        PipelineError::PassFailed { pass, source } => {
            assert_eq!(pass, "AddMeanScaleValues");
            assert!(matches!(source, PassError::UnknownInput(ref name) if name == "image"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn run_config_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    std::fs::write(
        &path,
        r#"{ "scale": 255.0, "mean_scale_values": { "data": { "mean": [1.0, 2.0, 3.0] } } }"#,
    )
    .unwrap();

    let config = RunConfig::from_json_file(&path).unwrap();

    assert_eq!(config.scale, Some(255.0));
    assert_eq!(
        config.mean_scale_values["data"],
        MeanScaleValues::mean(vec![1.0, 2.0, 3.0])
    );
}

#[test]
fn run_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = RunConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ \"scale\": \"big\" }").unwrap();
    let bad = RunConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(bad, ConfigError::Parse { .. }));
}
