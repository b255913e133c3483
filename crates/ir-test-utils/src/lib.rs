//! Testing utilities for IR tools workspace
//!
//! Shared fixtures: scratch IR caches, sample config documents and small
//! model graphs.

#![allow(missing_docs)]

use ir_middle::graph::{Graph, Port, PARAMETER};
use ir_middle::NodeIndex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xmltree::{Element, XMLNode};

/// Scratch IR cache laid out like converter output
pub struct IrCache {
    dir: TempDir,
}

impl IrCache {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Cache rooted under `parent`, for tests that depend on path depth
    pub fn new_in(parent: impl AsRef<Path>) -> Self {
        Self {
            dir: tempfile::tempdir_in(parent).unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `{name}/{framework}/{name}/{precision}/b1/ir/{name}.xml` plus its `.bin`
    pub fn add_plain(&self, name: &str, framework: &str, precision: &str) -> PathBuf {
        let dir = format!("{name}/{framework}/{name}/{precision}/b1/ir");
        self.add_file(&format!("{dir}/{name}.bin"));
        self.add_file(&format!("{dir}/{name}.xml"))
    }

    /// `{name}/{framework}/{name}/omz/{precision}/b1/ir/optimized/{name}.xml`
    pub fn add_optimized(&self, name: &str, framework: &str, precision: &str) -> PathBuf {
        self.add_file(&format!(
            "{name}/{framework}/{name}/omz/{precision}/b1/ir/optimized/{name}.xml"
        ))
    }

    /// Create an empty IR at `relative`
    pub fn add_file(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<net/>").unwrap();
        path
    }
}

impl Default for IrCache {
    fn default() -> Self {
        Self::new()
    }
}

pub const TEST_CONFIG: &str = r#"<?xml version="1.0"?>
<attributes>
    <irs_path>
        <value>ir_cache</value>
    </irs_path>
    <models>
    </models>
</attributes>
"#;

pub const LEGACY_TEST_CONFIG: &str = r#"<?xml version="1.0"?>
<attributes>
    <device name="CPU">
        <model name="existing.xml"/>
    </device>
    <device name="GPU">
    </device>
</attributes>
"#;

pub const REFS_CONFIG: &str = r#"<?xml version="1.0"?>
<attributes>
    <models>
    </models>
</attributes>
"#;

pub fn write_test_config(dir: &Path) -> PathBuf {
    write(dir, "test_config.xml", TEST_CONFIG)
}

pub fn write_legacy_test_config(dir: &Path) -> PathBuf {
    write(dir, "legacy_test_config.xml", LEGACY_TEST_CONFIG)
}

pub fn write_refs_config(dir: &Path) -> PathBuf {
    write(dir, "references_config.xml", REFS_CONFIG)
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn parse(path: &Path) -> Element {
    Element::parse(fs::read(path).unwrap().as_slice()).unwrap()
}

fn model_children(container: &Element) -> Vec<Element> {
    container
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(e) if e.name == "model" => Some(e.clone()),
            _ => None,
        })
        .collect()
}

/// `model` elements of the `models` container
pub fn model_elements(path: &Path) -> Vec<Element> {
    let root = parse(path);
    root.get_child("models").map(model_children).unwrap_or_default()
}

/// `model` elements per `device` section, in document order
pub fn device_model_elements(path: &Path) -> Vec<Vec<Element>> {
    let root = parse(path);
    root.children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(e) if e.name == "device" => Some(model_children(e)),
            _ => None,
        })
        .collect()
}

pub fn attribute<'a>(element: &'a Element, name: &str) -> &'a str {
    element.attributes.get(name).map_or("", String::as_str)
}

/// A single input feeding one consumer
pub struct InputGraph {
    pub graph: Graph,
    pub parameter: NodeIndex,
    pub data: NodeIndex,
    pub consumer: NodeIndex,
}

/// `Parameter(name) -> data -> Convolution`
pub fn single_input_graph(name: &str) -> InputGraph {
    let mut graph = Graph::new();
    let parameter = add_input(&mut graph, name);
    let data = graph.out_nodes(parameter)[0];
    let consumer = graph.add_op(&format!("{name}/conv"), "Convolution").unwrap();
    graph.connect(data, consumer, Port(0)).unwrap();
    InputGraph {
        graph,
        parameter,
        data,
        consumer,
    }
}

/// Add `Parameter(name) -> data` with a 4D shape and return the parameter
pub fn add_input(graph: &mut Graph, name: &str) -> NodeIndex {
    let parameter = graph.add_op(name, PARAMETER).unwrap();
    let data = graph.add_data(&format!("{name}/out")).unwrap();
    graph.node_mut(data).unwrap().shape = Some(vec![1, 3, 224, 224]);
    graph.connect(parameter, data, Port(0)).unwrap();
    parameter
}

/// `Mul` ops in the graph
pub fn mul_ops(graph: &Graph) -> Vec<NodeIndex> {
    graph.ops_of_type(ir_middle::graph::MUL)
}
