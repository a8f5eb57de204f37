//! Domain entities: core data structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::arena::{TreeLink, TreeObject};

/// Connector kind used for compiler-instruction inheritance.
pub const KIND_GENERALIZATION: &str = "Generalization";

/// Connector kind assigned when an interchange file does not name one.
pub const KIND_ASSOCIATION: &str = "Association";

/// A model element as stored in the model store and exchanged in interchange files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: String,
    /// Owning element; `None` (or empty) marks a root candidate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub stereotype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub notes: String,
    /// Last-modified timestamp (volatile, stripped before comparisons)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tagged_values: BTreeMap<String, String>,
}

impl ObjectRecord {
    pub fn new(id: impl Into<String>, stereotype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            stereotype: stereotype.into(),
            name: name.into(),
            alias: String::new(),
            notes: String::new(),
            modified: None,
            tagged_values: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_tagged_value(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tagged_values.insert(tag.into(), value.into());
        self
    }
}

impl TreeObject for ObjectRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stereotype(&self) -> &str {
        &self.stereotype
    }
}

/// A typed, directed relationship between two model elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub source_id: String,
    pub target_id: String,
    /// Connector kind, e.g. `Generalization` or `Dependency`
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Free-form classification tag, e.g. `ConsequenceLink`
    #[serde(default)]
    pub stereotype: String,
}

fn default_kind() -> String {
    KIND_ASSOCIATION.to_string()
}

impl RelationshipRecord {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: impl Into<String>,
        stereotype: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind: kind.into(),
            stereotype: stereotype.into(),
        }
    }

    /// Generalization edge from a compiler instruction to its base element.
    pub fn generalization(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::new(source_id, target_id, KIND_GENERALIZATION, "")
    }

    pub fn is_generalization(&self) -> bool {
        self.kind == KIND_GENERALIZATION
    }
}

impl TreeLink for RelationshipRecord {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn stereotype(&self) -> &str {
        &self.stereotype
    }
}

/// Interchange document: the flat objects and relationships of one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Export timestamp (volatile, stripped before comparisons)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl Model {
    pub fn new(objects: Vec<ObjectRecord>, relationships: Vec<RelationshipRecord>) -> Self {
        Self {
            export_date: None,
            objects,
            relationships,
        }
    }

    /// Drop the fields that legitimately differ between two exports of the same content.
    pub fn strip_volatile(&mut self) {
        self.export_date = None;
        for object in &mut self.objects {
            object.modified = None;
        }
    }

    /// Ids of parentless objects, in input order.
    pub fn root_ids(&self) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|o| o.parent_id().is_none())
            .map(|o| o.id.as_str())
            .collect()
    }
}
