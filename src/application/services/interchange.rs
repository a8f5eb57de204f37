//! Interchange file I/O
//!
//! A model document (`exportDate`, `objects`, `relationships`) is rendered as
//! TOML. The same format serves as the store file of the command line tool.

use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Model;
use crate::infrastructure::traits::FileSystem;

/// Reads and writes interchange documents.
pub struct InterchangeService {
    fs: Arc<dyn FileSystem>,
}

impl InterchangeService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a model document from `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn read(&self, path: &Path) -> ApplicationResult<Model> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read interchange file", path)?;
        let model: Model = toml::from_str(&content).map_err(|e| ApplicationError::Interchange {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(
            "read {} objects, {} relationships",
            model.objects.len(),
            model.relationships.len()
        );
        Ok(model)
    }

    /// Write `model` to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, model))]
    pub fn write(&self, path: &Path, model: &Model) -> ApplicationResult<()> {
        let content = toml::to_string_pretty(model).map_err(|e| ApplicationError::Interchange {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory of", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write interchange file", path)
    }

    /// Canonical TOML rendering of a model.
    pub fn render(model: &Model) -> ApplicationResult<String> {
        toml::to_string_pretty(model).map_err(|e| ApplicationError::OperationFailed {
            context: "render model".to_string(),
            source: Box::new(e),
        })
    }

    /// Hex SHA-256 of the canonical rendering.
    pub fn digest(model: &Model) -> ApplicationResult<String> {
        let rendered = Self::render(model)?;
        Ok(hex::encode(Sha256::digest(rendered.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObjectRecord, RelationshipRecord};

    #[test]
    fn given_equal_models_when_digesting_then_same_hash() {
        let model = Model::new(
            vec![ObjectRecord::new("a", "Section", "A").with_notes("$OV$x$EX$$AC$")],
            vec![RelationshipRecord::generalization("a", "b")],
        );
        let first = InterchangeService::digest(&model).unwrap();
        let second = InterchangeService::digest(&model.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn given_different_models_when_digesting_then_hashes_differ() {
        let a = Model::new(vec![ObjectRecord::new("a", "Section", "A")], vec![]);
        let b = Model::new(vec![ObjectRecord::new("a", "Section", "B")], vec![]);
        assert_ne!(
            InterchangeService::digest(&a).unwrap(),
            InterchangeService::digest(&b).unwrap()
        );
    }
}
