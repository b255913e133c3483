//! End-to-end manifest generation over scratch IR caches

use ir_test_utils::{
    attribute, device_model_elements, model_elements, write_legacy_test_config,
    write_refs_config, write_test_config, IrCache,
};
use ir_testdata::{run_with_rng, GeneratorConfig, ManifestError, ModelFilter};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

struct Workspace {
    _docs: tempfile::TempDir,
    cache: IrCache,
    test_conf: PathBuf,
    refs_conf: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let docs = tempfile::tempdir().unwrap();
        let test_conf = write_test_config(docs.path());
        let refs_conf = write_refs_config(docs.path());
        Self {
            _docs: docs,
            cache: IrCache::new(),
            test_conf,
            refs_conf,
        }
    }

    fn config(&self, filter: ModelFilter) -> GeneratorConfig {
        GeneratorConfig::new(&self.test_conf)
            .with_refs_conf(&self.refs_conf)
            .with_ir_cache_dir(self.cache.root())
            .with_filter(filter)
    }

    fn run(&self, filter: ModelFilter) -> Result<ir_testdata::GenerationReport, ManifestError> {
        run_with_rng(&self.config(filter), &mut StdRng::seed_from_u64(1))
    }
}

fn names(path: &Path) -> Vec<String> {
    model_elements(path)
        .iter()
        .map(|e| attribute(e, "name").to_string())
        .collect()
}

#[test]
fn non_xml_files_add_nothing() {
    let ws = Workspace::new();
    ws.cache.add_file("alexnet/onnx/alexnet/FP32/b1/ir/alexnet.bin");
    ws.cache.add_file("readme.txt");

    let report = ws.run(ModelFilter::new()).unwrap();

    assert_eq!(report.files_visited, 2);
    assert_eq!(report.models, 0);
    assert!(model_elements(&ws.test_conf).is_empty());
    assert!(model_elements(&ws.refs_conf).is_empty());
}

#[test]
fn single_topology_yields_one_model_and_three_references() {
    let ws = Workspace::new();
    let path = ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_plain("resnet", "tf", "FP16");

    let report = ws.run(ModelFilter::new().with_topology(["alexnet"])).unwrap();
    assert_eq!(report.model_records, 1);
    assert_eq!(report.reference_records, 3);

    let models = model_elements(&ws.test_conf);
    assert_eq!(models.len(), 1);
    let model = &models[0];
    assert_eq!(attribute(model, "name"), "alexnet.xml");
    assert_eq!(attribute(model, "framework"), "onnx");
    assert_eq!(attribute(model, "precision"), "FP32");
    assert_eq!(attribute(model, "path"), path.to_string_lossy());
    assert_eq!(attribute(model, "full_path"), path.to_string_lossy());

    let refs = model_elements(&ws.refs_conf);
    let tests: Vec<_> = refs.iter().map(|e| attribute(e, "test")).collect();
    assert_eq!(
        tests,
        vec!["create_exenetwork", "inference_with_streams", "infer_request_inference"]
    );
    for reference in &refs {
        assert_eq!(attribute(reference, "device"), "CPU");
        assert_eq!(attribute(reference, "precision"), "FP32");
        let vmsize: u64 = attribute(reference, "vmsize").parse().unwrap();
        let vmhwm: u64 = attribute(reference, "vmhwm").parse().unwrap();
        assert!((1..=1_103_949).contains(&vmsize));
        assert!((1..=129_329).contains(&vmhwm));
    }
}

#[test]
fn block_list_wins_over_allow_list() {
    let ws = Workspace::new();
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_plain("resnet", "onnx", "FP32");

    let filter = ModelFilter::new()
        .with_topology(["alexnet", "resnet"])
        .with_not_topology(["alexnet"]);
    ws.run(filter).unwrap();

    assert_eq!(names(&ws.test_conf), vec!["resnet.xml"]);
    assert_eq!(model_elements(&ws.refs_conf).len(), 3);
}

#[test]
fn framework_and_precision_filters() {
    let ws = Workspace::new();
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_plain("resnet", "tf", "FP16");
    ws.cache.add_plain("vgg", "tf", "FP32");

    let filter = ModelFilter::new().with_framework(["tf"]).with_precision(["FP32"]);
    let report = ws.run(filter).unwrap();

    assert_eq!(report.models, 1);
    assert_eq!(names(&ws.test_conf), vec!["vgg.xml"]);
}

#[test]
fn optimized_layout_uses_shifted_slots() {
    let ws = Workspace::new();
    ws.cache.add_optimized("mobilenet", "tf", "INT8");

    ws.run(ModelFilter::new()).unwrap();

    let models = model_elements(&ws.test_conf);
    assert_eq!(models.len(), 1);
    assert_eq!(attribute(&models[0], "framework"), "tf");
    assert_eq!(attribute(&models[0], "precision"), "INT8");
}

#[test]
fn records_follow_walk_order() {
    let ws = Workspace::new();
    ws.cache.add_plain("vgg", "onnx", "FP32");
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_plain("resnet", "onnx", "FP32");

    ws.run(ModelFilter::new()).unwrap();

    assert_eq!(
        names(&ws.test_conf),
        vec!["alexnet.xml", "resnet.xml", "vgg.xml"]
    );
}

#[test]
fn rerun_doubles_records() {
    let ws = Workspace::new();
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_plain("resnet", "onnx", "FP16");

    ws.run(ModelFilter::new()).unwrap();
    assert_eq!(model_elements(&ws.test_conf).len(), 2);
    assert_eq!(model_elements(&ws.refs_conf).len(), 6);

    ws.run(ModelFilter::new()).unwrap();
    assert_eq!(model_elements(&ws.test_conf).len(), 4);
    assert_eq!(model_elements(&ws.refs_conf).len(), 12);
}

#[test]
fn missing_cache_dir_leaves_documents_untouched() {
    let ws = Workspace::new();
    let before = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());

    let config = ws
        .config(ModelFilter::new())
        .with_ir_cache_dir(ws.cache.root().join("absent"));
    let err = run_with_rng(&config, &mut StdRng::seed_from_u64(1)).unwrap_err();

    assert!(matches!(err, ManifestError::ScanDirNotFound(_)));
    assert!(err.to_string().starts_with("directory 'ir_cache_dir' was not found"));
    let after = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());
    assert_eq!(before, after);
}

#[cfg(unix)]
#[test]
fn shallow_ir_aborts_before_any_write() {
    let mut ws = Workspace::new();
    ws.cache = IrCache::new_in("/tmp");
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    ws.cache.add_file("stray.xml");
    let before = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());

    let err = ws.run(ModelFilter::new()).unwrap_err();

    assert!(matches!(
        err,
        ManifestError::UnexpectedLayout { layout: "plain", required: 6, .. }
    ));
    let after = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());
    assert_eq!(before, after);
}

#[test]
fn malformed_xml_leaves_documents_untouched() {
    let ws = Workspace::new();
    ws.cache.add_plain("alexnet", "onnx", "FP32");
    fs::write(&ws.refs_conf, "<attributes><models>").unwrap();
    let before = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());

    let err = ws.run(ModelFilter::new()).unwrap_err();

    assert!(matches!(err, ManifestError::Xml { .. }));
    let after = (fs::read(&ws.test_conf).unwrap(), fs::read(&ws.refs_conf).unwrap());
    assert_eq!(before, after);
}

#[test]
fn missing_container_is_reported() {
    let ws = Workspace::new();
    fs::write(&ws.test_conf, "<attributes/>").unwrap();

    let err = ws.run(ModelFilter::new()).unwrap_err();
    assert!(matches!(err, ManifestError::MissingContainer { .. }));
}

#[test]
fn legacy_device_sections_each_gain_the_model() {
    let ws = Workspace::new();
    let legacy = write_legacy_test_config(ws.test_conf.parent().unwrap());
    ws.cache.add_plain("alexnet", "onnx", "FP32");

    let config = ws.config(ModelFilter::new());
    let config = GeneratorConfig {
        test_conf: legacy.clone(),
        ..config
    };
    run_with_rng(&config, &mut StdRng::seed_from_u64(1)).unwrap();

    let devices = device_model_elements(&legacy);
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].len(), 2);
    assert_eq!(devices[1].len(), 1);
    assert_eq!(attribute(&devices[1][0], "name"), "alexnet.xml");
    assert_eq!(model_elements(&ws.refs_conf).len(), 3);
}

#[test]
fn output_starts_with_declaration() {
    let ws = Workspace::new();
    ws.cache.add_plain("alexnet", "onnx", "FP32");

    ws.run(ModelFilter::new()).unwrap();

    for path in [&ws.test_conf, &ws.refs_conf] {
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("<?xml"), "{text}");
        assert!(text.contains('\n'));
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let a = Workspace::new();
    let b = Workspace::new();
    for ws in [&a, &b] {
        ws.cache.add_plain("alexnet", "onnx", "FP32");
        ws.run(ModelFilter::new()).unwrap();
    }

    let metrics = |ws: &Workspace| -> Vec<String> {
        model_elements(&ws.refs_conf)
            .iter()
            .map(|e| attribute(e, "vmsize").to_string())
            .collect()
    };
    assert_eq!(metrics(&a), metrics(&b));
}
