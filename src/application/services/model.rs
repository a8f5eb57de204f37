//! Model service: scope loading, export, import and the round-trip harness

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::catalog::CatalogEntry;
use crate::application::services::InterchangeService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Model, ObjectRecord, RelationshipRecord, TreeArena, TreeBuilder};
use crate::infrastructure::traits::ModelStore;

/// Tree of store objects with their outgoing relationships.
pub type ModelTree = TreeArena<ObjectRecord, RelationshipRecord>;

const FIRST_EXPORT: &str = "roundtrip-1.toml";
const SECOND_EXPORT: &str = "roundtrip-2.toml";

/// Outcome of export → import → export.
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub first_path: PathBuf,
    pub second_path: PathBuf,
    pub first_digest: String,
    pub second_digest: String,
    /// Scratch scope the first export was imported into
    pub scratch_scope: String,
    pub objects: usize,
    pub relationships: usize,
    /// Both exports are equal after stripping volatile fields
    pub structural_match: bool,
}

impl RoundTripReport {
    pub fn is_identical(&self) -> bool {
        self.structural_match && self.first_digest == self.second_digest
    }
}

/// Loads scopes as trees and moves them in and out of a model store.
pub struct ModelService {
    interchange: Arc<InterchangeService>,
    settings: Arc<Settings>,
}

impl ModelService {
    pub fn new(interchange: Arc<InterchangeService>, settings: Arc<Settings>) -> Self {
        Self {
            interchange,
            settings,
        }
    }

    fn builder(&self) -> TreeBuilder {
        TreeBuilder::with_root_policy(self.settings.root_policy)
    }

    /// Build the tree of one scope.
    #[instrument(level = "debug", skip(self, store))]
    pub fn load_tree(&self, store: &dyn ModelStore, scope: &str) -> ApplicationResult<ModelTree> {
        let objects = store.list_objects(scope)?;
        let relationships = store.list_relationships(scope)?;
        let tree = self.builder().build(objects, relationships)?;
        for id in tree.unattached() {
            warn!("{id} is not reachable from {scope}");
        }
        Ok(tree)
    }

    /// Flatten a scope into an interchange document stamped with the export time.
    #[instrument(level = "debug", skip(self, store))]
    pub fn export(&self, store: &dyn ModelStore, scope: &str) -> ApplicationResult<Model> {
        let tree = self.load_tree(store, scope)?;
        let (objects, relationships) = tree.flatten();
        let mut model = Model::new(objects, relationships);
        model.export_date = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        info!(
            "exported {} objects, {} relationships from {scope}",
            model.objects.len(),
            model.relationships.len()
        );
        Ok(model)
    }

    /// Insert a document below `target_scope` and return the id of its root.
    ///
    /// The document is rebuilt as a tree first; elements not reachable from
    /// its root are skipped.
    #[instrument(level = "debug", skip(self, store, model))]
    pub fn import(
        &self,
        store: &mut dyn ModelStore,
        target_scope: &str,
        model: &Model,
    ) -> ApplicationResult<String> {
        store.object(target_scope)?;
        let tree = self
            .builder()
            .build(model.objects.clone(), model.relationships.clone())?;
        let root_id = tree
            .root()
            .and_then(|idx| tree.get_node(idx))
            .map(|node| node.id.clone())
            .ok_or_else(|| ApplicationError::EmptyModel(target_scope.to_string()))?;
        if !tree.unattached().is_empty() {
            warn!("skipping {} unattached elements", tree.unattached().len());
        }

        let (objects, relationships) = tree.flatten();
        let count = objects.len();
        for mut object in objects {
            if object.id == root_id {
                object.parent_id = Some(target_scope.to_string());
            }
            let id = object.id.clone();
            store.insert_object(object)?;
            store.persist(&id)?;
        }
        for relationship in relationships {
            store.insert_relationship(relationship)?;
        }
        info!("imported {count} objects below {target_scope}");
        Ok(root_id)
    }

    /// Catalog entries of a tree in pre-order; other elements are skipped.
    #[instrument(level = "debug", skip_all)]
    pub fn classify_tree(
        &self,
        store: &dyn ModelStore,
        tree: &ModelTree,
    ) -> ApplicationResult<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for (_, node) in tree.iter() {
            match CatalogEntry::classify_with_cap(store, &node.id, self.settings.note_tag_cap)? {
                Some(entry) => entries.push(entry),
                None => debug!("{} is not a catalog element", node.id),
            }
        }
        Ok(entries)
    }

    /// Export `scope`, import it into a fresh scratch scope, export again and
    /// compare both files with volatile fields stripped.
    #[instrument(level = "debug", skip(self, source, scratch))]
    pub fn roundtrip(
        &self,
        source: &dyn ModelStore,
        scope: &str,
        scratch: &mut dyn ModelStore,
        dir: &Path,
    ) -> ApplicationResult<RoundTripReport> {
        let first_path = dir.join(FIRST_EXPORT);
        let second_path = dir.join(SECOND_EXPORT);

        let exported = self.export(source, scope)?;
        self.interchange.write(&first_path, &exported)?;

        let scratch_scope = format!("scratch-{}", Uuid::new_v4());
        scratch.insert_object(ObjectRecord::new(&scratch_scope, "", "round trip scratch"))?;
        scratch.persist(&scratch_scope)?;

        let imported_root = self.import(scratch, &scratch_scope, &self.interchange.read(&first_path)?)?;
        let reexported = self.export(scratch, &imported_root)?;
        self.interchange.write(&second_path, &reexported)?;

        let mut first = self.interchange.read(&first_path)?;
        let mut second = self.interchange.read(&second_path)?;
        first.strip_volatile();
        second.strip_volatile();

        let report = RoundTripReport {
            first_digest: InterchangeService::digest(&first)?,
            second_digest: InterchangeService::digest(&second)?,
            structural_match: first == second,
            objects: first.objects.len(),
            relationships: first.relationships.len(),
            scratch_scope,
            first_path,
            second_path,
        };
        info!("round trip of {scope}: identical={}", report.is_identical());
        Ok(report)
    }
}
