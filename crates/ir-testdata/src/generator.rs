//! Manifest generation
//!
//! Walks an IR cache directory, selects IR files and appends one
//! [`ModelRecord`] and three [`ReferenceRecord`]s per file.

use crate::config::GeneratorConfig;
use crate::document::{ConfigDocument, DocumentKind};
use crate::error::{ManifestError, ManifestResult};
use crate::filter::ModelFilter;
use crate::layout::{base_name, IrModel};
use crate::record::{ModelRecord, ReferenceRecord};
use rand::Rng;
use std::path::Path;
use walkdir::WalkDir;

/// IR file extension
pub const IR_EXTENSION: &str = ".xml";

/// Outcome of one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Regular files visited during the walk
    pub files_visited: usize,
    /// Files that passed every filter
    pub models: usize,
    /// Records appended to the test config
    pub model_records: usize,
    /// Records appended to the reference config
    pub reference_records: usize,
}

/// Result of walking the IR cache
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Qualifying models, in walk order
    pub models: Vec<IrModel>,
    /// Regular files visited
    pub files_visited: usize,
}

/// Selects IR files and turns them into records
#[derive(Debug, Clone, Default)]
pub struct ManifestGenerator {
    filter: ModelFilter,
}

impl ManifestGenerator {
    /// Create generator with the given filter
    #[must_use]
    pub fn new(filter: ModelFilter) -> Self {
        Self { filter }
    }

    /// Active filter
    #[must_use]
    pub fn filter(&self) -> &ModelFilter {
        &self.filter
    }

    /// Walk `dir` and collect qualifying models
    ///
    /// Entries are visited depth first, sorted by file name. Symbolic links
    /// are not followed. A `dir` that exists but is not a directory yields
    /// no models.
    ///
    /// # Errors
    /// Returns [`ManifestError::ScanDirNotFound`] if `dir` does not exist, [`ManifestError::Walk`] if the walk fails and
    /// [`ManifestError::UnexpectedLayout`] for an admitted file that is too
    /// shallow for its layout.
    pub fn scan(&self, dir: &Path) -> ManifestResult<ScanResult> {
        if !dir.exists() {
            return Err(ManifestError::ScanDirNotFound(dir.to_path_buf()));
        }

        let mut result = ScanResult::default();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            result.files_visited += 1;

            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(IR_EXTENSION) {
                continue;
            }
            if !self.filter.admits_topology(base_name(&file_name)) {
                continue;
            }
            let model = IrModel::from_path(entry.path())?;
            if !self.filter.admits_model(&model) {
                continue;
            }

            tracing::debug!(
                "Selected {} IR {} ({}, {})",
                model.layout.as_str(),
                entry.path().display(),
                model.framework,
                model.precision
            );
            result.models.push(model);
        }
        Ok(result)
    }

    /// Append the records for `models` to both documents
    pub fn append_records<R: Rng>(
        models: &[IrModel],
        test_conf: &mut ConfigDocument,
        refs_conf: &mut ConfigDocument,
        rng: &mut R,
    ) -> GenerationReport {
        let mut report = GenerationReport {
            models: models.len(),
            ..GenerationReport::default()
        };
        for model in models {
            test_conf.append(ModelRecord::from_model(model).to_element());
            report.model_records += 1;

            for record in ReferenceRecord::for_all_tests(model, rng) {
                refs_conf.append(record.to_element());
                report.reference_records += 1;
            }
        }
        report
    }

    /// Scan `dir` and append records to the loaded documents
    ///
    /// Documents are only changed in memory; the caller saves them.
    ///
    /// # Errors
    /// See [`ManifestGenerator::scan`].
    pub fn generate<R: Rng>(
        &self,
        dir: &Path,
        test_conf: &mut ConfigDocument,
        refs_conf: &mut ConfigDocument,
        rng: &mut R,
    ) -> ManifestResult<GenerationReport> {
        let scan = self.scan(dir)?;
        let mut report = Self::append_records(&scan.models, test_conf, refs_conf, rng);
        report.files_visited = scan.files_visited;
        Ok(report)
    }
}

/// Run a full generation: load, scan, append, save
///
/// Both documents are loaded and the scan finishes before anything is
/// written, so a failure up to that point leaves both files untouched.
///
/// # Errors
/// Returns the first [`ManifestError`] encountered.
pub fn run(config: &GeneratorConfig) -> ManifestResult<GenerationReport> {
    run_with_rng(config, &mut rand::rng())
}

/// [`run`] with a caller supplied random source
///
/// # Errors
/// Returns the first [`ManifestError`] encountered.
pub fn run_with_rng<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> ManifestResult<GenerationReport> {
    let mut test_conf = ConfigDocument::load(&config.test_conf, DocumentKind::TestConfig)?;
    let mut refs_conf = ConfigDocument::load(&config.refs_conf, DocumentKind::References)?;

    let generator = ManifestGenerator::new(config.filter.clone());
    let report = generator.generate(&config.ir_cache_dir, &mut test_conf, &mut refs_conf, rng)?;

    test_conf.save()?;
    refs_conf.save()?;

    tracing::info!(
        "Generated test data: {} files visited, {} models, {} model records, {} reference records",
        report.files_visited,
        report.models,
        report.model_records,
        report.reference_records
    );
    Ok(report)
}
