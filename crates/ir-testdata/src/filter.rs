//! Model selection filters
//!
//! Every list is inactive when empty. `not_topology` is checked after
//! `topology`, so a name in both lists is excluded.

use crate::layout::IrModel;

/// Allow/block lists applied to IR files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFilter {
    /// Allowed model names
    pub topology: Vec<String>,
    /// Excluded model names
    pub not_topology: Vec<String>,
    /// Allowed frameworks
    pub framework: Vec<String>,
    /// Allowed precisions
    pub precision: Vec<String>,
}

impl ModelFilter {
    /// Filter that admits everything
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With allowed model names
    #[must_use]
    pub fn with_topology<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.topology = names.into_iter().map(Into::into).collect();
        self
    }

    /// With excluded model names
    #[must_use]
    pub fn with_not_topology<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.not_topology = names.into_iter().map(Into::into).collect();
        self
    }

    /// With allowed frameworks
    #[must_use]
    pub fn with_framework<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.framework = names.into_iter().map(Into::into).collect();
        self
    }

    /// With allowed precisions
    #[must_use]
    pub fn with_precision<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.precision = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check a model name against `topology` and `not_topology`
    #[must_use]
    pub fn admits_topology(&self, name: &str) -> bool {
        if !self.topology.is_empty() && !contains(&self.topology, name) {
            return false;
        }
        !contains(&self.not_topology, name)
    }

    /// Check a decomposed model against `framework` and `precision`
    #[must_use]
    pub fn admits_model(&self, model: &IrModel) -> bool {
        if !self.framework.is_empty() && !contains(&self.framework, &model.framework) {
            return false;
        }
        self.precision.is_empty() || contains(&self.precision, &model.precision)
    }

    /// Check if no list is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topology.is_empty()
            && self.not_topology.is_empty()
            && self.framework.is_empty()
            && self.precision.is_empty()
    }
}

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item == value)
}
