//! Config documents
//!
//! Both documents are parsed once, mutated in memory and written back in
//! full. Nothing touches the disk until [`ConfigDocument::save`].

use crate::error::{ManifestError, ManifestResult};
use crate::record::MODEL_ELEMENT;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use xmltree::{Element, EmitterConfig, XMLNode};

/// Name of the flat model container
pub const MODELS_ELEMENT: &str = "models";

/// Name of a per-device section in the legacy test config format
pub const DEVICE_ELEMENT: &str = "device";

/// Which of the two documents is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Stress test configuration
    TestConfig,
    /// Reference values configuration
    References,
}

/// Where model records go inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelContainer {
    /// The `models` child of the root
    Models,
    /// Every `device` section of the root (legacy test config format)
    Devices,
}

/// A parsed config document
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    root: Element,
    container: ModelContainer,
}

impl ConfigDocument {
    /// Read and parse a document
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file cannot be opened,
    /// [`ManifestError::Xml`] if it is not well-formed, and
    /// [`ManifestError::MissingContainer`] if it has no element to hold
    /// model records.
    pub fn load(path: impl AsRef<Path>, kind: DocumentKind) -> ManifestResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ManifestError::io_error(path, e))?;
        let root = Element::parse(BufReader::new(file)).map_err(|source| ManifestError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_element(path, root, kind)
    }

    /// Wrap an already parsed root element
    ///
    /// # Errors
    /// Returns [`ManifestError::MissingContainer`] if the root has no
    /// element to hold model records.
    pub fn from_element(
        path: impl Into<PathBuf>,
        root: Element,
        kind: DocumentKind,
    ) -> ManifestResult<Self> {
        let path = path.into();
        let container = if root.get_child(MODELS_ELEMENT).is_some() {
            ModelContainer::Models
        } else if kind == DocumentKind::TestConfig && device_sections(&root).next().is_some() {
            ModelContainer::Devices
        } else {
            return Err(ManifestError::MissingContainer {
                path,
                element: MODELS_ELEMENT,
            });
        };
        Ok(Self {
            path,
            root,
            container,
        })
    }

    /// Document path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root element
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Resolved model container
    #[must_use]
    pub fn container(&self) -> ModelContainer {
        self.container
    }

    /// Append a record to the model container
    ///
    /// In the legacy format every device section receives its own copy.
    pub fn append(&mut self, record: Element) {
        match self.container {
            ModelContainer::Models => {
                if let Some(models) = self.root.get_mut_child(MODELS_ELEMENT) {
                    models.children.push(XMLNode::Element(record));
                }
            }
            ModelContainer::Devices => {
                for device in self.root.children.iter_mut().filter_map(|node| match node {
                    XMLNode::Element(e) if e.name == DEVICE_ELEMENT => Some(e),
                    _ => None,
                }) {
                    device.children.push(XMLNode::Element(record.clone()));
                }
            }
        }
    }

    /// Number of model records in the container
    ///
    /// For the legacy format this counts across every device section.
    #[must_use]
    pub fn model_count(&self) -> usize {
        match self.container {
            ModelContainer::Models => self
                .root
                .get_child(MODELS_ELEMENT)
                .map_or(0, count_models),
            ModelContainer::Devices => device_sections(&self.root).map(count_models).sum(),
        }
    }

    /// Write the document back to its path
    ///
    /// The output starts with an XML declaration and is indented.
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file cannot be created or
    /// flushed and [`ManifestError::Write`] if serialization fails.
    pub fn save(&self) -> ManifestResult<()> {
        let file = File::create(&self.path).map_err(|e| ManifestError::io_error(&self.path, e))?;
        let config = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(true);
        let mut writer = BufWriter::new(file);
        self.root
            .write_with_config(&mut writer, config)
            .map_err(|source| ManifestError::Write {
                path: self.path.clone(),
                source,
            })?;
        writer
            .flush()
            .map_err(|e| ManifestError::io_error(&self.path, e))
    }
}

fn device_sections(root: &Element) -> impl Iterator<Item = &Element> {
    root.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) if e.name == DEVICE_ELEMENT => Some(e),
        _ => None,
    })
}

fn count_models(container: &Element) -> usize {
    container
        .children
        .iter()
        .filter(|node| matches!(node, XMLNode::Element(e) if e.name == MODEL_ELEMENT))
        .count()
}
