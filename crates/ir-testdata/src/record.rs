//! Manifest records
//!
//! [`ModelRecord`] goes into the test configuration; three
//! [`ReferenceRecord`]s per model go into the reference configuration.

use crate::layout::IrModel;
use rand::Rng;
use std::ops::RangeInclusive;
use xmltree::Element;

/// Element name of every record
pub const MODEL_ELEMENT: &str = "model";

/// Device written to reference records
pub const REFERENCE_DEVICE: &str = "CPU";

/// Range of placeholder `vmsize` / `vmpeak` values
pub const VIRTUAL_MEMORY_RANGE: RangeInclusive<u64> = 1..=1_103_949;

/// Range of placeholder `vmrss` / `vmhwm` values
pub const RESIDENT_MEMORY_RANGE: RangeInclusive<u64> = 1..=129_329;

/// Stress test a reference value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    /// Compile the model into an executable network
    CreateExeNetwork,
    /// Run inference with multiple streams
    InferenceWithStreams,
    /// Run inference through an infer request
    InferRequestInference,
}

impl TestKind {
    /// Every kind, in the order records are written
    pub const ALL: [Self; 3] = [
        Self::CreateExeNetwork,
        Self::InferenceWithStreams,
        Self::InferRequestInference,
    ];

    /// Label stored in the `test` attribute
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateExeNetwork => "create_exenetwork",
            Self::InferenceWithStreams => "inference_with_streams",
            Self::InferRequestInference => "infer_request_inference",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder memory metrics (kB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryFootprint {
    /// Virtual memory size
    pub vmsize: u64,
    /// Peak virtual memory size
    pub vmpeak: u64,
    /// Resident set size
    pub vmrss: u64,
    /// Peak resident set size
    pub vmhwm: u64,
}

impl MemoryFootprint {
    /// Draw fresh values from the placeholder ranges
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            vmsize: rng.random_range(VIRTUAL_MEMORY_RANGE),
            vmpeak: rng.random_range(VIRTUAL_MEMORY_RANGE),
            vmrss: rng.random_range(RESIDENT_MEMORY_RANGE),
            vmhwm: rng.random_range(RESIDENT_MEMORY_RANGE),
        }
    }
}

/// Test configuration entry for one IR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    /// File name
    pub name: String,
    /// Weight precision
    pub precision: String,
    /// Originating framework
    pub framework: String,
    /// Path to the IR
    pub path: String,
    /// Path to the IR
    pub full_path: String,
}

impl ModelRecord {
    /// Record for a decomposed IR file
    #[must_use]
    pub fn from_model(model: &IrModel) -> Self {
        let path = model.path_string();
        Self {
            name: model.file_name.clone(),
            precision: model.precision.clone(),
            framework: model.framework.clone(),
            full_path: path.clone(),
            path,
        }
    }

    /// XML element with attributes in document order
    #[must_use]
    pub fn to_element(&self) -> Element {
        element([
            ("name", self.name.clone()),
            ("precision", self.precision.clone()),
            ("framework", self.framework.clone()),
            ("path", self.path.clone()),
            ("full_path", self.full_path.clone()),
        ])
    }
}

/// Reference configuration entry for one IR and one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Path to the IR
    pub path: String,
    /// Weight precision
    pub precision: String,
    /// Test the values belong to
    pub test: TestKind,
    /// Target device
    pub device: &'static str,
    /// Memory metrics
    pub memory: MemoryFootprint,
}

impl ReferenceRecord {
    /// Record for one test with freshly drawn metrics
    pub fn for_test<R: Rng>(model: &IrModel, test: TestKind, rng: &mut R) -> Self {
        Self {
            path: model.path_string(),
            precision: model.precision.clone(),
            test,
            device: REFERENCE_DEVICE,
            memory: MemoryFootprint::random(rng),
        }
    }

    /// One record per [`TestKind`], in [`TestKind::ALL`] order
    pub fn for_all_tests<R: Rng>(model: &IrModel, rng: &mut R) -> Vec<Self> {
        TestKind::ALL
            .iter()
            .map(|test| Self::for_test(model, *test, rng))
            .collect()
    }

    /// XML element with attributes in document order
    #[must_use]
    pub fn to_element(&self) -> Element {
        element([
            ("path", self.path.clone()),
            ("precision", self.precision.clone()),
            ("test", self.test.as_str().to_string()),
            ("device", self.device.to_string()),
            ("vmsize", self.memory.vmsize.to_string()),
            ("vmpeak", self.memory.vmpeak.to_string()),
            ("vmrss", self.memory.vmrss.to_string()),
            ("vmhwm", self.memory.vmhwm.to_string()),
        ])
    }
}

fn element<const N: usize>(attributes: [(&str, String); N]) -> Element {
    let mut element = Element::new(MODEL_ELEMENT);
    for (name, value) in attributes {
        element.attributes.insert(name.to_string(), value);
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::IrLayout;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn model() -> IrModel {
        IrModel {
            file_name: "alexnet.xml".to_string(),
            path: PathBuf::from("/cache/alexnet/onnx/alexnet/FP16/b1/ir/alexnet.xml"),
            layout: IrLayout::Plain,
            framework: "onnx".to_string(),
            precision: "FP16".to_string(),
        }
    }

    fn attribute_names(element: &Element) -> Vec<&str> {
        element.attributes.keys().map(String::as_str).collect()
    }

    #[test]
    fn model_record_attributes() {
        let element = ModelRecord::from_model(&model()).to_element();

        assert_eq!(element.name, "model");
        assert_eq!(
            attribute_names(&element),
            vec!["name", "precision", "framework", "path", "full_path"]
        );
        assert_eq!(element.attributes["name"], "alexnet.xml");
        assert_eq!(element.attributes["framework"], "onnx");
        assert_eq!(element.attributes["path"], element.attributes["full_path"]);
    }

    #[test]
    fn reference_records_cover_every_test() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = ReferenceRecord::for_all_tests(&model(), &mut rng);

        let tests: Vec<_> = records.iter().map(|r| r.test.as_str()).collect();
        assert_eq!(
            tests,
            vec!["create_exenetwork", "inference_with_streams", "infer_request_inference"]
        );
        assert!(records.iter().all(|r| r.device == "CPU" && r.precision == "FP16"));
    }

    #[test]
    fn reference_record_attributes() {
        let mut rng = StdRng::seed_from_u64(7);
        let record = ReferenceRecord::for_test(&model(), TestKind::CreateExeNetwork, &mut rng);
        let element = record.to_element();

        assert_eq!(
            attribute_names(&element),
            vec!["path", "precision", "test", "device", "vmsize", "vmpeak", "vmrss", "vmhwm"]
        );
        assert_eq!(element.attributes["vmsize"], record.memory.vmsize.to_string());
        assert!(!element.attributes["vmrss"].starts_with('0'));
    }

    #[test]
    fn seeded_metrics_are_reproducible() {
        let a = MemoryFootprint::random(&mut StdRng::seed_from_u64(42));
        let b = MemoryFootprint::random(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_metrics_in_range(seed in any::<u64>()) {
            let memory = MemoryFootprint::random(&mut StdRng::seed_from_u64(seed));
            prop_assert!(VIRTUAL_MEMORY_RANGE.contains(&memory.vmsize));
            prop_assert!(VIRTUAL_MEMORY_RANGE.contains(&memory.vmpeak));
            prop_assert!(RESIDENT_MEMORY_RANGE.contains(&memory.vmrss));
            prop_assert!(RESIDENT_MEMORY_RANGE.contains(&memory.vmhwm));
        }
    }
}
