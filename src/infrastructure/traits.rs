//! I/O boundary traits for testability
//!
//! These traits abstract the model repository and the filesystem, allowing
//! services to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use crate::domain::stereotype::join_element_path;
use crate::domain::{DomainResult, ObjectRecord, RelationshipRecord};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Repository holding the flat object/relationship set of a model.
///
/// Reads take `&self`; every write takes `&mut self` and stays pending until
/// [`ModelStore::persist`] is called for the element.
pub trait ModelStore {
    /// The scope element (reported without parent) followed by all its
    /// descendants, in store order.
    fn list_objects(&self, scope_id: &str) -> DomainResult<Vec<ObjectRecord>>;

    /// Relationships whose source lies inside the scope, in store order.
    fn list_relationships(&self, scope_id: &str) -> DomainResult<Vec<RelationshipRecord>>;

    fn object(&self, id: &str) -> DomainResult<&ObjectRecord>;

    fn set_name(&mut self, id: &str, name: &str) -> DomainResult<()>;

    fn set_alias(&mut self, id: &str, alias: &str) -> DomainResult<()>;

    fn set_notes(&mut self, id: &str, notes: &str) -> DomainResult<()>;

    fn tagged_value(&self, id: &str, tag: &str) -> DomainResult<Option<String>>;

    /// Tagged value, or `default` if the element does not carry the tag.
    fn tagged_value_or(&self, id: &str, tag: &str, default: &str) -> DomainResult<String> {
        Ok(self
            .tagged_value(id, tag)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn set_tagged_value(&mut self, id: &str, tag: &str, value: &str) -> DomainResult<()>;

    fn remove_tagged_value(&mut self, id: &str, tag: &str) -> DomainResult<()>;

    /// Target of the single generalization edge leaving `id`.
    ///
    /// Zero or several such edges are errors.
    fn resolve_generalization_base(&self, id: &str) -> DomainResult<String>;

    /// Commit pending writes of one element.
    fn persist(&mut self, id: &str) -> DomainResult<()>;

    /// Add a new element. Its parent, if any, must already exist.
    fn insert_object(&mut self, object: ObjectRecord) -> DomainResult<()>;

    /// Add a new relationship. Its source must already exist.
    fn insert_relationship(&mut self, relationship: RelationshipRecord) -> DomainResult<()>;

    /// Display path of an element, walking parent ids up to the model root.
    fn element_path(&self, id: &str) -> DomainResult<String> {
        let mut upward: Vec<&ObjectRecord> = vec![self.object(id)?];
        // Stop at unknown parents and at cycles
        while let Some(parent_id) = upward.last().and_then(|o| o.parent_id.as_deref()) {
            match self.object(parent_id) {
                Ok(parent) if !upward.iter().any(|o| o.id == parent.id) => upward.push(parent),
                _ => break,
            }
        }
        Ok(join_element_path(
            upward
                .iter()
                .map(|o| (o.name.as_str(), o.stereotype.as_str())),
        ))
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
