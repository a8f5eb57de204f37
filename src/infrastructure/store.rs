//! In-memory model store backed by a flat object list.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use crate::domain::{DomainError, DomainResult, Model, ObjectRecord, RelationshipRecord};
use crate::infrastructure::traits::ModelStore;

/// Model store keeping objects in insertion order with an id index.
///
/// Writes mark the element as pending; [`ModelStore::persist`] stamps its
/// `modified` timestamp and clears the mark.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Vec<ObjectRecord>,
    index: HashMap<String, usize>,
    relationships: Vec<RelationshipRecord>,
    pending: BTreeSet<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a model document, keeping object order.
    #[instrument(level = "debug", skip_all, fields(objects = model.objects.len()))]
    pub fn from_model(model: Model) -> DomainResult<Self> {
        let mut store = Self::new();
        for object in model.objects {
            if store.index.contains_key(&object.id) {
                return Err(DomainError::DuplicateObject(object.id));
            }
            store.index.insert(object.id.clone(), store.objects.len());
            store.objects.push(object);
        }
        store.relationships = model.relationships;
        Ok(store)
    }

    /// Snapshot of the whole store as a model document.
    pub fn to_model(&self) -> Model {
        Model::new(self.objects.clone(), self.relationships.clone())
    }

    /// Ids of parentless objects, in store order.
    pub fn root_ids(&self) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|o| o.parent_id.as_deref().map_or(true, str::is_empty))
            .map(|o| o.id.as_str())
            .collect()
    }

    /// Ids with writes not yet persisted.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn object_mut(&mut self, id: &str) -> DomainResult<&mut ObjectRecord> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| DomainError::ElementNotFound(id.to_string()))?;
        self.pending.insert(id.to_string());
        Ok(&mut self.objects[pos])
    }

    /// Scope element plus all descendants.
    fn scope_ids<'a>(&'a self, scope_id: &'a str) -> DomainResult<HashSet<&'a str>> {
        self.object(scope_id)?;
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for object in &self.objects {
            if let Some(parent) = object.parent_id.as_deref() {
                children.entry(parent).or_default().push(&object.id);
            }
        }

        let mut scope = HashSet::new();
        let mut stack = vec![scope_id];
        while let Some(current) = stack.pop() {
            if scope.insert(current) {
                if let Some(kids) = children.get(current) {
                    stack.extend(kids.iter().copied());
                }
            }
        }
        Ok(scope)
    }
}

impl ModelStore for InMemoryStore {
    #[instrument(level = "debug", skip(self))]
    fn list_objects(&self, scope_id: &str) -> DomainResult<Vec<ObjectRecord>> {
        let scope = self.scope_ids(scope_id)?;
        let objects: Vec<ObjectRecord> = self
            .objects
            .iter()
            .filter(|o| scope.contains(o.id.as_str()))
            .map(|o| {
                let mut object = o.clone();
                if object.id == scope_id {
                    object.parent_id = None;
                }
                object
            })
            .collect();
        debug!("{} objects in scope", objects.len());
        Ok(objects)
    }

    fn list_relationships(&self, scope_id: &str) -> DomainResult<Vec<RelationshipRecord>> {
        let scope = self.scope_ids(scope_id)?;
        Ok(self
            .relationships
            .iter()
            .filter(|r| scope.contains(r.source_id.as_str()))
            .cloned()
            .collect())
    }

    fn object(&self, id: &str) -> DomainResult<&ObjectRecord> {
        self.index
            .get(id)
            .map(|&pos| &self.objects[pos])
            .ok_or_else(|| DomainError::ElementNotFound(id.to_string()))
    }

    fn set_name(&mut self, id: &str, name: &str) -> DomainResult<()> {
        self.object_mut(id)?.name = name.to_string();
        Ok(())
    }

    fn set_alias(&mut self, id: &str, alias: &str) -> DomainResult<()> {
        self.object_mut(id)?.alias = alias.to_string();
        Ok(())
    }

    fn set_notes(&mut self, id: &str, notes: &str) -> DomainResult<()> {
        self.object_mut(id)?.notes = notes.to_string();
        Ok(())
    }

    fn tagged_value(&self, id: &str, tag: &str) -> DomainResult<Option<String>> {
        Ok(self.object(id)?.tagged_values.get(tag).cloned())
    }

    fn set_tagged_value(&mut self, id: &str, tag: &str, value: &str) -> DomainResult<()> {
        self.object_mut(id)?
            .tagged_values
            .insert(tag.to_string(), value.to_string());
        Ok(())
    }

    fn remove_tagged_value(&mut self, id: &str, tag: &str) -> DomainResult<()> {
        self.object_mut(id)?.tagged_values.remove(tag);
        Ok(())
    }

    fn resolve_generalization_base(&self, id: &str) -> DomainResult<String> {
        self.object(id)?;
        let targets: Vec<&str> = self
            .relationships
            .iter()
            .filter(|r| r.source_id == id && r.is_generalization())
            .map(|r| r.target_id.as_str())
            .collect();
        match targets.as_slice() {
            [] => Err(DomainError::MissingGeneralization(id.to_string())),
            [target] => Ok(target.to_string()),
            many => Err(DomainError::AmbiguousGeneralization {
                id: id.to_string(),
                count: many.len(),
            }),
        }
    }

    fn persist(&mut self, id: &str) -> DomainResult<()> {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.object_mut(id)?.modified = Some(stamp);
        self.pending.remove(id);
        debug!("persisted {id}");
        Ok(())
    }

    fn insert_object(&mut self, object: ObjectRecord) -> DomainResult<()> {
        if self.index.contains_key(&object.id) {
            return Err(DomainError::DuplicateObject(object.id));
        }
        if let Some(parent) = object.parent_id.as_deref().filter(|p| !p.is_empty()) {
            self.object(parent)?;
        }
        self.index.insert(object.id.clone(), self.objects.len());
        self.pending.insert(object.id.clone());
        self.objects.push(object);
        Ok(())
    }

    fn insert_relationship(&mut self, relationship: RelationshipRecord) -> DomainResult<()> {
        if !self.index.contains_key(&relationship.source_id) {
            return Err(DomainError::RelationshipSourceNotFound {
                source_id: relationship.source_id,
                target_id: relationship.target_id,
            });
        }
        self.relationships.push(relationship);
        Ok(())
    }
}
