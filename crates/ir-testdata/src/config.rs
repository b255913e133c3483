//! Generator configuration

use crate::filter::ModelFilter;
use std::path::{Path, PathBuf};

/// Default reference config, relative to the working directory
pub const DEFAULT_REFS_CONF: &str = "references_config.xml";

/// Default IR cache, relative to the executable's directory
pub const DEFAULT_IR_CACHE_DIR: &str = "../ir_cache";

/// Inputs of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Test config to extend
    pub test_conf: PathBuf,
    /// Reference config to extend
    pub refs_conf: PathBuf,
    /// Directory to scan for IRs
    pub ir_cache_dir: PathBuf,
    /// Model selection
    pub filter: ModelFilter,
}

impl GeneratorConfig {
    /// Config for `test_conf` with default reference config and IR cache
    #[must_use]
    pub fn new(test_conf: impl Into<PathBuf>) -> Self {
        Self {
            test_conf: test_conf.into(),
            refs_conf: PathBuf::from(DEFAULT_REFS_CONF),
            ir_cache_dir: default_ir_cache_dir(),
            filter: ModelFilter::default(),
        }
    }

    /// With reference config path
    #[must_use]
    pub fn with_refs_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.refs_conf = path.into();
        self
    }

    /// With IR cache directory
    #[must_use]
    pub fn with_ir_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.ir_cache_dir = path.into();
        self
    }

    /// With model filter
    #[must_use]
    pub fn with_filter(mut self, filter: ModelFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// [`DEFAULT_IR_CACHE_DIR`] next to the running executable
///
/// Falls back to the working directory if the executable path is unknown.
#[must_use]
pub fn default_ir_cache_dir() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    base.join(DEFAULT_IR_CACHE_DIR)
}

/// Split a comma separated list, trimming items and dropping empty ones
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
