//! IR Test Data - stress test manifests from an IR cache
//!
//! Walks a directory of converted models and extends two XML documents:
//! - the test config gains one `model` record per IR
//! - the reference config gains three `model` records per IR, one per stress
//!   test, carrying placeholder memory metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use ir_testdata::{run, GeneratorConfig, ModelFilter};
//!
//! let config = GeneratorConfig::new("desktop_test_config.xml")
//!     .with_refs_conf("desktop_references_config.xml")
//!     .with_ir_cache_dir("/data/ir_cache")
//!     .with_filter(ModelFilter::new().with_precision(["FP16"]));
//! let report = run(&config)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod generator;
pub mod layout;
pub mod record;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use document::{ConfigDocument, DocumentKind, ModelContainer};
pub use error::{ManifestError, ManifestResult};
pub use filter::ModelFilter;
pub use generator::{run, run_with_rng, GenerationReport, ManifestGenerator, ScanResult};
pub use layout::{IrLayout, IrModel};
pub use record::{MemoryFootprint, ModelRecord, ReferenceRecord, TestKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
