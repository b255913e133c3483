//! Error types for manifest generation
//!
//! Every variant is fatal: the run aborts before either document is written,
//! except [`ManifestError::Write`], which can leave the two documents at
//! different generations.

use std::path::PathBuf;

/// Manifest generation errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IR cache directory does not exist
    #[error("directory 'ir_cache_dir' was not found: {0}")]
    ScanDirNotFound(PathBuf),

    /// IO error during file read or write
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config document is not well-formed XML
    #[error("malformed xml in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: xmltree::ParseError,
    },

    /// Serializing a config document failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: xmltree::Error,
    },

    /// Config document has no element to hold model records
    #[error("{path} has no '{element}' element")]
    MissingContainer {
        path: PathBuf,
        element: &'static str,
    },

    /// File path is too shallow for the IR cache layout
    #[error("{path} has {depth} path segments, the {layout} layout needs at least {required}")]
    UnexpectedLayout {
        path: PathBuf,
        layout: &'static str,
        depth: usize,
        required: usize,
    },

    /// Directory walk failed
    #[error("failed to walk ir cache: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
