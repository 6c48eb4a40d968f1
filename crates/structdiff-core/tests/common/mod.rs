#![allow(dead_code)]

use proptest::{collection::btree_map, collection::vec, prelude::*, string::string_regex};
use structdiff_core::Node;

/// Routes `tracing` output through the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn node(json: &str) -> Node {
    Node::from_json_str(json).expect("test JSON parses")
}

pub fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        proptest::num::f64::ANY.prop_filter_map("finite", |f| {
            if f.is_finite() {
                serde_json::Number::from_f64(f).map(serde_json::Value::Number)
            } else {
                None
            }
        }),
        string_regex("[a-zA-Z0-9]{0,6}").unwrap().prop_map(serde_json::Value::String),
    ];

    leaf.prop_recursive(3, 6, 4, move |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            btree_map(string_regex("[a-z]{1,3}").unwrap(), inner, 0..4).prop_map(|map| {
                let mut object = serde_json::Map::new();
                for (k, v) in map {
                    object.insert(k, v);
                }
                serde_json::Value::Object(object)
            }),
        ]
    })
}

pub fn arb_object() -> impl Strategy<Value = serde_json::Value> {
    btree_map(string_regex("[a-z]{1,3}").unwrap(), arb_json_value(), 0..6).prop_map(|map| {
        serde_json::Value::Object(map.into_iter().collect())
    })
}
