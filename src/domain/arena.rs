//! Arena-based tree over flat model objects.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::stereotype::{join_element_path, ST_CONSEQUENCE_LINK};

/// An object that can be placed in a tree by id and parent id.
pub trait TreeObject {
    fn id(&self) -> &str;

    /// Parent id; `None` marks a root candidate.
    fn parent_id(&self) -> Option<&str>;

    /// Display name used for element paths.
    fn name(&self) -> &str {
        ""
    }

    fn stereotype(&self) -> &str {
        ""
    }
}

/// A relationship that attaches to the node carrying its source id.
pub trait TreeLink {
    fn source_id(&self) -> &str;

    fn target_id(&self) -> &str {
        ""
    }

    fn stereotype(&self) -> &str {
        ""
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode<O, R> {
    pub id: String,
    /// Object carried by this node, `None` for structural placeholders
    pub payload: Option<O>,
    /// Index of parent node in the arena, navigation only
    pub parent: Option<Index>,
    /// Indices of child nodes in discovery order
    pub children: Vec<Index>,
    /// Relationships whose source is this node, in input order
    pub relationships: Vec<R>,
}

/// Arena-based tree built from a flat object/relationship set.
///
/// Nodes that could not be attached (unknown parent, discarded extra roots)
/// stay in the arena but are unreachable from the root; their ids are kept
/// in `unattached` for diagnostics.
#[derive(Debug)]
pub struct TreeArena<O, R> {
    arena: Arena<TreeNode<O, R>>,
    root: Option<Index>,
    ids: HashMap<String, Index>,
    unattached: Vec<String>,
}

impl<O, R> Default for TreeArena<O, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, R> TreeArena<O, R> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            ids: HashMap::new(),
            unattached: Vec::new(),
        }
    }

    /// Insert a detached node. Returns `None` if the id is already taken.
    pub fn insert_node(&mut self, id: impl Into<String>, payload: Option<O>) -> Option<Index> {
        let id = id.into();
        if self.ids.contains_key(&id) {
            return None;
        }
        let node_idx = self.arena.insert(TreeNode {
            id: id.clone(),
            payload,
            parent: None,
            children: Vec::new(),
            relationships: Vec::new(),
        });
        self.ids.insert(id, node_idx);
        Some(node_idx)
    }

    /// Append `child` to `parent`'s children and set the back-reference.
    pub fn attach(&mut self, child: Index, parent: Index) {
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.arena.get_mut(child) {
            child_node.parent = Some(parent);
        }
    }

    pub fn set_root(&mut self, idx: Index) {
        self.root = Some(idx);
    }

    pub fn mark_unattached(&mut self, id: impl Into<String>) {
        self.unattached.push(id.into());
    }

    pub fn push_relationship(&mut self, idx: Index, relationship: R) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.relationships.push(relationship);
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<O, R>> {
        self.arena.get(idx)
    }

    pub fn find(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Ids of nodes left out of the rooted tree, in the order they were discarded.
    pub fn unattached(&self) -> &[String] {
        &self.unattached
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent_of(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator<'_, O, R> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal from an arbitrary node.
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_, O, R> {
        TreeIterator::new(self, Some(start))
    }

    /// Walk upward from `idx` (inclusive) following parent back-references.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_, O, R> {
        Ancestors {
            arena: self,
            next: Some(idx),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of all leaf nodes reachable from the root, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id.clone())
            .collect()
    }
}

impl<O: TreeObject, R> TreeArena<O, R> {
    /// Names from the functional-model root boundary down to `idx`, joined with `" / "`.
    pub fn element_path(&self, idx: Index) -> String {
        join_element_path(
            self.ancestors(idx)
                .filter_map(|(_, node)| node.payload.as_ref())
                .map(|payload| (payload.name(), payload.stereotype())),
        )
    }
}

impl<O, R: TreeLink> TreeArena<O, R> {
    /// Relationships of `idx` stereotyped as consequence links.
    pub fn consequence_links(&self, idx: Index) -> Vec<&R> {
        self.get_node(idx)
            .map(|node| {
                node.relationships
                    .iter()
                    .filter(|r| r.stereotype() == ST_CONSEQUENCE_LINK)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<O: Clone, R: Clone> TreeArena<O, R> {
    /// Convert the rooted tree back to flat objects and relationships.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten(&self) -> (Vec<O>, Vec<R>) {
        match self.root {
            Some(root) => self.flatten_from(root),
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Pre-order collection of payloads and relationships below `start` (inclusive).
    pub fn flatten_from(&self, start: Index) -> (Vec<O>, Vec<R>) {
        let mut objects = Vec::new();
        let mut relationships = Vec::new();
        for (_, node) in self.iter_from(start) {
            if let Some(payload) = &node.payload {
                objects.push(payload.clone());
            }
            relationships.extend(node.relationships.iter().cloned());
        }
        (objects, relationships)
    }
}

pub struct TreeIterator<'a, O, R> {
    arena: &'a TreeArena<O, R>,
    stack: Vec<Index>,
}

impl<'a, O, R> TreeIterator<'a, O, R> {
    fn new(arena: &'a TreeArena<O, R>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, O, R> Iterator for TreeIterator<'a, O, R> {
    type Item = (Index, &'a TreeNode<O, R>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct Ancestors<'a, O, R> {
    arena: &'a TreeArena<O, R>,
    next: Option<Index>,
}

impl<'a, O, R> Iterator for Ancestors<'a, O, R> {
    type Item = (Index, &'a TreeNode<O, R>);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let node = self.arena.get_node(current)?;
        self.next = node.parent;
        Some((current, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    fn sample() -> (TreeArena<Item, &'static str>, Index, Index, Index) {
        // root
        // ├── a
        // │   └── c
        // └── b
        let mut tree = TreeArena::new();
        let root = tree.insert_node("root", Some(Item("root"))).unwrap();
        let a = tree.insert_node("a", Some(Item("a"))).unwrap();
        let b = tree.insert_node("b", Some(Item("b"))).unwrap();
        let c = tree.insert_node("c", Some(Item("c"))).unwrap();
        tree.set_root(root);
        tree.attach(a, root);
        tree.attach(b, root);
        tree.attach(c, a);
        tree.push_relationship(a, "a->b");
        tree.push_relationship(root, "root->c");
        (tree, root, a, c)
    }

    #[test]
    fn given_tree_when_flattening_then_preorder_payloads_and_relationships() {
        let (tree, _, _, _) = sample();
        let (objects, relationships) = tree.flatten();
        assert_eq!(objects, vec![Item("root"), Item("a"), Item("c"), Item("b")]);
        assert_eq!(relationships, vec!["root->c", "a->b"]);
    }

    #[test]
    fn given_placeholder_node_when_flattening_then_children_still_visited() {
        let mut tree: TreeArena<Item, &str> = TreeArena::new();
        let root = tree.insert_node("root", Some(Item("root"))).unwrap();
        let hole = tree.insert_node("hole", None).unwrap();
        let leaf = tree.insert_node("leaf", Some(Item("leaf"))).unwrap();
        tree.set_root(root);
        tree.attach(hole, root);
        tree.attach(leaf, hole);

        let (objects, _) = tree.flatten();
        assert_eq!(objects, vec![Item("root"), Item("leaf")]);
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_rejected() {
        let mut tree: TreeArena<Item, &str> = TreeArena::new();
        assert!(tree.insert_node("x", Some(Item("x"))).is_some());
        assert!(tree.insert_node("x", Some(Item("y"))).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_tree_when_walking_ancestors_then_reaches_root() {
        let (tree, root, a, c) = sample();
        let chain: Vec<Index> = tree.ancestors(c).map(|(idx, _)| idx).collect();
        assert_eq!(chain, vec![c, a, root]);
        assert_eq!(tree.parent_of(root), None);
    }

    #[test]
    fn given_tree_when_measuring_then_depth_and_leaves_match() {
        let (tree, _, _, _) = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_ids(), vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn given_empty_tree_when_flattening_then_nothing_returned() {
        let tree: TreeArena<Item, &str> = TreeArena::new();
        let (objects, relationships) = tree.flatten();
        assert!(objects.is_empty());
        assert!(relationships.is_empty());
        assert_eq!(tree.depth(), 0);
    }
}
