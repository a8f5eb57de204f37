//! Property tests: note codec round trip and build/flatten laws

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;

use fmodel::domain::notes::{pack, unpack, unpack_with_cap, DEFAULT_TAG_CAP};
use fmodel::domain::stereotype::{ST_FUNCTION, ST_SECTION};
use fmodel::domain::{ObjectRecord, RelationshipRecord, TreeBuilder};

/// Up to five distinct tags with values free of `$`.
fn note_fields() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[A-Z]{2}", "[a-zA-Z0-9 .,;:()#-]{0,24}", 0..=DEFAULT_TAG_CAP)
}

/// Objects `n0..nN` where `n{i}` hangs below some `n{j}`, `j < i`, plus relationships.
fn connected_tree() -> impl Strategy<Value = (Vec<ObjectRecord>, Vec<RelationshipRecord>)> {
    (1usize..24)
        .prop_flat_map(|n| {
            let parents: Vec<BoxedStrategy<usize>> =
                (1..n).map(|i| (0..i).boxed()).collect();
            let relationships = prop::collection::vec((0..n, 0..n), 0..12);
            (Just(n), parents, relationships)
        })
        .prop_map(|(n, parents, edges)| {
            let mut objects = vec![ObjectRecord::new("n0", ST_SECTION, "root")];
            for i in 1..n {
                objects.push(
                    ObjectRecord::new(format!("n{i}"), ST_FUNCTION, format!("node {i}"))
                        .with_parent(format!("n{}", parents[i - 1])),
                );
            }
            let relationships = edges
                .into_iter()
                .enumerate()
                .map(|(k, (s, t))| {
                    RelationshipRecord::new(format!("n{s}"), format!("n{t}"), "Dependency", format!("r{k}"))
                })
                .collect();
            (objects, relationships)
        })
}

fn children_by_parent(objects: &[ObjectRecord]) -> HashMap<Option<String>, Vec<String>> {
    let mut children: HashMap<Option<String>, Vec<String>> = HashMap::new();
    for object in objects {
        children
            .entry(object.parent_id.clone())
            .or_default()
            .push(object.id.clone());
    }
    children
}

fn relationships_by_source(relationships: &[RelationshipRecord]) -> HashMap<String, Vec<RelationshipRecord>> {
    let mut by_source: HashMap<String, Vec<RelationshipRecord>> = HashMap::new();
    for relationship in relationships {
        by_source
            .entry(relationship.source_id.clone())
            .or_default()
            .push(relationship.clone());
    }
    by_source
}

proptest! {
    #[test]
    fn unpack_reproduces_packed_fields(fields in note_fields()) {
        let ordered: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let unpacked = unpack(&pack(&ordered));

        prop_assert_eq!(unpacked.len(), fields.len());
        for (tag, value) in &fields {
            prop_assert_eq!(unpacked.get(tag), value.as_str());
        }
    }

    #[test]
    fn text_without_tags_unpacks_to_nothing(text in "[a-z0-9 $]{0,40}") {
        prop_assert!(unpack(&text).is_empty());
    }

    #[test]
    fn cap_limits_number_of_tags(fields in note_fields(), cap in 1usize..=DEFAULT_TAG_CAP) {
        let ordered: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let unpacked = unpack_with_cap(&pack(&ordered), cap);

        prop_assert_eq!(unpacked.len(), fields.len().min(cap));
    }

    #[test]
    fn flatten_reproduces_connected_input((objects, relationships) in connected_tree()) {
        let tree = TreeBuilder::new().build(objects.clone(), relationships.clone()).unwrap();
        let (flat_objects, flat_relationships) = tree.flatten();

        // Same elements
        let mut expected_ids: Vec<&str> = objects.iter().map(|o| o.id.as_str()).collect();
        let mut actual_ids: Vec<&str> = flat_objects.iter().map(|o| o.id.as_str()).collect();
        expected_ids.sort_unstable();
        actual_ids.sort_unstable();
        prop_assert_eq!(actual_ids, expected_ids);

        // Same relative order of children and of relationships per source
        prop_assert_eq!(children_by_parent(&flat_objects), children_by_parent(&objects));
        prop_assert_eq!(
            relationships_by_source(&flat_relationships),
            relationships_by_source(&relationships)
        );
        prop_assert!(tree.unattached().is_empty());
    }

    #[test]
    fn flatten_output_is_a_fixed_point((objects, relationships) in connected_tree()) {
        let builder = TreeBuilder::new();
        let (once_objects, once_relationships) = builder.build(objects, relationships).unwrap().flatten();

        let (twice_objects, twice_relationships) = builder
            .build(once_objects.clone(), once_relationships.clone())
            .unwrap()
            .flatten();

        prop_assert_eq!(twice_objects, once_objects);
        prop_assert_eq!(twice_relationships, once_relationships);
    }
}
