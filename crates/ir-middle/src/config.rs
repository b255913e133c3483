//! Run configuration passed to every pass
//!
//! Carries the command-line style preprocessing parameters (`scale`,
//! per-input mean/scale values). Passes receive it through
//! [`PassContext`](crate::pipeline::PassContext) instead of reading it from
//! the graph.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-input preprocessing values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanScaleValues {
    /// Values subtracted from the input, one per channel
    pub mean: Option<Vec<f64>>,
    /// Multiplicative factors applied to the input, one per channel
    pub scale: Option<Vec<f64>>,
}

impl MeanScaleValues {
    /// Only a mean
    #[must_use]
    pub fn mean(values: Vec<f64>) -> Self {
        Self {
            mean: Some(values),
            scale: None,
        }
    }

    /// Only a scale
    #[must_use]
    pub fn scale(values: Vec<f64>) -> Self {
        Self {
            mean: None,
            scale: Some(values),
        }
    }

    /// Add a scale to existing values
    #[must_use]
    pub fn with_scale(mut self, values: Vec<f64>) -> Self {
        self.scale = Some(values);
        self
    }
}

/// Global parameters of a conversion run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scale applied to every model input
    pub scale: Option<f64>,
    /// Preprocessing keyed by input (parameter node) name
    pub mean_scale_values: BTreeMap<String, MeanScaleValues>,
}

impl RunConfig {
    /// Create default configuration (no preprocessing)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a global input scale
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// With preprocessing for one input
    #[must_use]
    pub fn with_mean_scale_values(
        mut self,
        input: impl Into<String>,
        values: MeanScaleValues,
    ) -> Self {
        self.mean_scale_values.insert(input.into(), values);
        self
    }

    /// Scale that actually changes the graph.
    ///
    /// `None` and exactly `1` both mean "no scaling requested"; `0` is kept.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn effective_scale(&self) -> Option<f64> {
        self.scale.filter(|scale| *scale != 1.0)
    }

    /// Parse configuration from a JSON string
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
