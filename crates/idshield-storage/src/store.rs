//! Attribute tree persistence

use std::io::Write;
use std::path::{Path, PathBuf};

use idshield_core::Attribute;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, StorageError};

/// The persisted form of a snapshot: an ordered list of top-level attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTree {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl AttributeTree {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Reads and writes attribute trees as JSON files
#[derive(Debug, Clone, Default)]
pub struct AttributeStore;

impl AttributeStore {
    pub fn new() -> Self {
        Self
    }

    /// Load the tree at `path`, or `None` if no file exists there
    pub fn load(&self, path: &Path) -> Result<Option<AttributeTree>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no attribute file");
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let tree: AttributeTree =
            serde_json::from_str(&content).map_err(|source| StorageError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), attributes = tree.len(), "loaded attribute file");
        Ok(Some(tree))
    }

    /// Write the tree to `path`, replacing any existing file atomically
    pub fn save(&self, tree: &AttributeTree, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(tree)?;
        let dir = parent_dir(path);
        let io_err = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), attributes = tree.len(), "saved attribute file");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
