//! Tree builder: flat objects and relationships to a rooted tree.

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::arena::{TreeArena, TreeLink, TreeObject};
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// What to do when more than one object has no parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// The last parentless object in input order becomes the root
    #[default]
    LastWins,
    /// A second parentless object is an error
    Strict,
}

impl RootPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootPolicy::LastWins => "last-wins",
            RootPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-wins" => Ok(RootPolicy::LastWins),
            "strict" => Ok(RootPolicy::Strict),
            other => Err(format!("unknown root policy '{other}' (expected last-wins or strict)")),
        }
    }
}

/// Constructs a rooted tree from a flat object/relationship set.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    root_policy: RootPolicy,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_policy(root_policy: RootPolicy) -> Self {
        Self { root_policy }
    }

    pub fn root_policy(&self) -> RootPolicy {
        self.root_policy
    }

    /// Build a tree; children keep input order, relationships attach to their source.
    ///
    /// Objects whose parent is unknown, or whose parent link would close a cycle,
    /// are left unattached with a warning.
    /// Duplicate object ids and relationships with an unknown source are errors.
    #[instrument(level = "debug", skip_all, fields(objects = objects.len(), relationships = relationships.len()))]
    pub fn build<O, R>(&self, objects: Vec<O>, relationships: Vec<R>) -> TreeResult<TreeArena<O, R>>
    where
        O: TreeObject,
        R: TreeLink,
    {
        let mut tree = TreeArena::new();

        // Create nodes lookup map
        let mut links = Vec::with_capacity(objects.len());
        for object in objects {
            let id = object.id().to_string();
            let parent_id = object.parent_id().map(str::to_string);
            let idx = tree
                .insert_node(id.clone(), Some(object))
                .ok_or_else(|| DomainError::DuplicateObject(id.clone()))?;
            links.push((idx, id, parent_id));
        }

        // Now create tree
        let mut root: Option<(Index, String)> = None;
        for (idx, id, parent_id) in links {
            match parent_id {
                None => {
                    if let Some((_, previous)) = root.take() {
                        match self.root_policy {
                            RootPolicy::Strict => {
                                return Err(DomainError::MultipleRoots {
                                    first: previous,
                                    second: id,
                                });
                            }
                            RootPolicy::LastWins => {
                                warn!("multiple root objects: {previous} replaced by {id}");
                                tree.mark_unattached(previous);
                            }
                        }
                    }
                    root = Some((idx, id));
                }
                Some(parent_id) => match tree.find(&parent_id) {
                    // Attached links form a forest, so the ancestor walk terminates
                    Some(parent_idx) if tree.ancestors(parent_idx).any(|(i, _)| i == idx) => {
                        warn!("parent cycle: {id} below {parent_id} closes a loop");
                        tree.mark_unattached(id);
                    }
                    Some(parent_idx) => tree.attach(idx, parent_idx),
                    None => {
                        warn!("parent not found: {parent_id} (referenced from {id})");
                        tree.mark_unattached(id);
                    }
                },
            }
        }

        match root {
            Some((root_idx, root_id)) => {
                debug!("root: {root_id}");
                tree.set_root(root_idx);
            }
            None => warn!("no root object found"),
        }

        // Add relationships
        for relationship in relationships {
            let source_idx = tree.find(relationship.source_id()).ok_or_else(|| {
                DomainError::RelationshipSourceNotFound {
                    source_id: relationship.source_id().to_string(),
                    target_id: relationship.target_id().to_string(),
                }
            })?;
            tree.push_relationship(source_idx, relationship);
        }

        Ok(tree)
    }
}
