//! IR cache path layout
//!
//! Converted models live at fixed depths below their framework and precision
//! directories. Counting path segments from the end (the file is 1):
//!
//! ```text
//! plain:     .../{framework}/_/{precision}/_/_/{file}.xml
//!                  6          5  4         3 2  1
//! optimized: .../{framework}/_/_/{precision}/_/_/optimized/{file}.xml
//!                  8          7 6  5         4 3  2         1
//! ```
//!
//! The depths are fixed; a directory layout change that keeps paths deep
//! enough is not detected.

use crate::error::{ManifestError, ManifestResult};
use std::path::{Component, Path, PathBuf};

/// Directory name marking optimized IRs
pub const OPTIMIZED_MARKER: &str = "optimized";

/// Layout variant of one IR file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrLayout {
    /// Regular conversion output
    Plain,
    /// IR placed in an `optimized` directory next to the regular output
    Optimized,
}

impl IrLayout {
    /// Detect the variant from normalized path segments
    #[must_use]
    pub fn detect(segments: &[String]) -> Self {
        match segments.len().checked_sub(2).map(|index| segments[index].as_str()) {
            Some(OPTIMIZED_MARKER) => Self::Optimized,
            _ => Self::Plain,
        }
    }

    /// Position of the framework directory, counted from the end
    #[must_use]
    pub const fn framework_slot(self) -> usize {
        match self {
            Self::Plain => 6,
            Self::Optimized => 8,
        }
    }

    /// Position of the precision directory, counted from the end
    #[must_use]
    pub const fn precision_slot(self) -> usize {
        match self {
            Self::Plain => 4,
            Self::Optimized => 5,
        }
    }

    /// Minimum number of segments a path needs
    #[must_use]
    pub const fn depth(self) -> usize {
        self.framework_slot()
    }

    /// Layout name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Optimized => "optimized",
        }
    }
}

/// An IR file decomposed against its layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrModel {
    /// File name including extension
    pub file_name: String,
    /// Path as walked
    pub path: PathBuf,
    /// Layout variant
    pub layout: IrLayout,
    /// Originating framework
    pub framework: String,
    /// Weight precision
    pub precision: String,
}

impl IrModel {
    /// Decompose an IR file path
    ///
    /// # Errors
    /// Returns [`ManifestError::UnexpectedLayout`] if the path has fewer
    /// segments than its layout requires.
    pub fn from_path(path: &Path) -> ManifestResult<Self> {
        let segments = path_segments(path);
        let layout = IrLayout::detect(&segments);
        if segments.len() < layout.depth() {
            return Err(ManifestError::UnexpectedLayout {
                path: path.to_path_buf(),
                layout: layout.as_str(),
                depth: segments.len(),
                required: layout.depth(),
            });
        }

        let slot = |position: usize| segments[segments.len() - position].clone();
        Ok(Self {
            file_name: slot(1),
            path: path.to_path_buf(),
            layout,
            framework: slot(layout.framework_slot()),
            precision: slot(layout.precision_slot()),
        })
    }

    /// Model (topology) name
    #[must_use]
    pub fn topology(&self) -> &str {
        base_name(&self.file_name)
    }

    /// Path as a string, as written to the documents
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// File name up to the first `.`
#[must_use]
pub fn base_name(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map_or(file_name, |(base, _)| base)
}

/// Lexically normalized path segments
///
/// `.` is dropped, `..` cancels the preceding segment, and the root and
/// prefix components are not segments.
#[must_use]
pub fn path_segments(path: &Path) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if segments.last().is_some_and(|last| last != "..") {
                    segments.pop();
                } else {
                    segments.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    segments
}
