mod common;

use common::{arb_json_value, arb_object, node};
use proptest::{
    collection::btree_map, prelude::Strategy, prop_assert_eq, prop_assert_ne,
    string::string_regex,
};
use structdiff_core::{
    combine_with, diff::PathSegment, hash_bytes, DiffOptions, Fnv1a, Node, Object,
};

fn keyed(json: &str, keys: &[&str]) -> Node {
    let options = DiffOptions::default().with_id_keys(keys.iter().copied()).unwrap();
    Node::from_json_str_with(json, &options).unwrap()
}

#[test]
fn identity_ignores_non_key_properties() {
    let before = keyed("{\"id\":\"1\",\"name\":\"Bob\"}", &["id"]);
    let after = keyed("{\"id\":\"1\",\"name\":\"Rob\"}", &["id"]);

    assert_eq!(before.identity(), after.identity());
    assert_ne!(before.content_hash(), after.content_hash());
}

#[test]
fn identity_changes_with_key_value() {
    let first = keyed("{\"id\":\"1\",\"name\":\"Bob\"}", &["id"]);
    let second = keyed("{\"id\":\"2\",\"name\":\"Bob\"}", &["id"]);
    assert_ne!(first.identity(), second.identity());
}

#[test]
fn identity_without_keys_is_content_hash() {
    let plain = node("{\"id\":\"1\",\"name\":\"Bob\"}");
    assert_eq!(plain.identity(), plain.content_hash());
}

#[test]
fn identity_with_absent_keys_is_content_hash() {
    let object = keyed("{\"name\":\"Bob\"}", &["id", "rev"]);
    assert_eq!(object.identity(), object.content_hash());
}

#[test]
fn identity_combines_present_keys_in_configured_order() {
    let object = keyed("{\"b\":2,\"a\":1,\"c\":3}", &["c", "a", "missing"]);
    let expected = combine_with(
        &Fnv1a,
        &[node("3").content_hash(), node("1").content_hash()],
    );
    assert_eq!(object.identity(), expected);
}

#[test]
fn id_keys_are_applied_to_nested_objects() {
    let document = keyed("{\"items\":[{\"id\":\"a\",\"v\":1}],\"meta\":{\"id\":\"m\"}}", &["id"]);
    let Node::Object(root) = &document else {
        panic!("root should be an object");
    };
    let Some(Node::Array(items)) = root.get("items") else {
        panic!("items should be an array");
    };
    assert_eq!(items[0].identity_path_element(), PathSegment::identity([("id", node("\"a\""))]));
    assert_eq!(
        root.get("meta").map(Node::identity_path_element),
        Some(PathSegment::identity([("id", node("\"m\""))]))
    );
}

#[test]
fn identity_path_element_lists_only_present_keys() {
    let object = keyed("{\"id\":\"1\",\"name\":\"Bob\"}", &["id", "rev"]);
    assert_eq!(object.identity_path_element(), PathSegment::identity([("id", node("\"1\""))]));
}

#[test]
fn scalars_have_empty_identity_path_element() {
    for json in ["null", "true", "1.5", "\"text\"", "[1,2]"] {
        let PathSegment::Identity(map) = node(json).identity_path_element() else {
            panic!("identity path element should be an identity segment");
        };
        assert!(map.is_empty(), "{json} should have no identity keys");
    }
}

#[test]
fn negative_zero_inside_objects_hashes_like_zero() {
    let positive = node("{\"n\":0.0}");
    let negative = node("{\"n\":-0.0}");
    assert_eq!(positive, negative);
    assert_eq!(positive.content_hash(), negative.content_hash());
}

#[test]
fn nested_values_participate_in_content_hash() {
    let a = node("{\"outer\":{\"inner\":[1,2]}}");
    let b = node("{\"outer\":{\"inner\":[2,1]}}");
    assert_ne!(a.content_hash(), b.content_hash());
}

// Distinct keys in a random order, so objects are built by out-of-order insertion.
fn shuffled_pairs() -> impl Strategy<Value = Vec<(String, serde_json::Value)>> {
    btree_map(string_regex("[a-z]{1,3}").unwrap(), arb_json_value(), 0..6)
        .prop_map(|map| map.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest::proptest! {
    #[test]
    fn equal_nodes_hash_equally(json in arb_json_value()) {
        let a = Node::from_json_value(json.clone()).unwrap();
        let b = Node::from_json_value(json).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.content_hash(), b.content_hash());
        prop_assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn content_hash_ignores_insertion_order(pairs in shuffled_pairs()) {
        let children: Vec<(String, Node)> = pairs
            .into_iter()
            .map(|(key, value)| (key, Node::from_json_value(value).unwrap()))
            .collect();
        let shuffled: Object = children.iter().cloned().collect();

        let mut sorted = children;
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let mut bytes = Vec::new();
        for (key, value) in &sorted {
            bytes.extend_from_slice(&hash_bytes(key.as_bytes()));
            bytes.extend_from_slice(&value.content_hash());
        }
        let from_sorted = Object::from_properties(sorted.into_iter().collect());

        prop_assert_eq!(&shuffled, &from_sorted);
        prop_assert_eq!(Node::Object(shuffled).content_hash(), hash_bytes(&bytes));
        prop_assert_eq!(Node::Object(from_sorted).content_hash(), hash_bytes(&bytes));
    }

    #[test]
    fn identity_is_content_hash_without_keys(json in arb_json_value()) {
        let value = Node::from_json_value(json).unwrap();
        prop_assert_eq!(value.identity(), value.content_hash());
    }

    #[test]
    fn changed_property_changes_content_hash(json in arb_object()) {
        let Node::Object(mut object) = Node::from_json_value(json).unwrap() else {
            unreachable!("strategy yields objects");
        };
        let before = object.clone();
        // Strategy keys are lowercase, so this one is always new.
        object.insert("ZZ", Node::Null);
        prop_assert_ne!(
            Node::Object(before).content_hash(),
            Node::Object(object).content_hash()
        );
    }
}
