//! Fuzzing harnesses for the structdiff engine.
//!
//! Each public function accepts raw bytes so it can be driven from
//! `cargo fuzz` targets as well as from ordinary unit tests. Decoding
//! failures are swallowed so fuzzers can keep exploring; violated engine
//! invariants panic.
//!
//! # Examples
//!
//! Run the canonicalization harness on a JSON snippet:
//!
//! ```
//! structdiff_fuzz::fuzz_canonicalization(b"{\"a\":1}");
//! ```
//!
//! Invoke the diff harness on deterministic input:
//!
//! ```
//! structdiff_fuzz::fuzz_diff(&[1, 2, 3, 4]);
//! ```
//!
//! Exercise the patch harness with arbitrary bytes:
//!
//! ```
//! structdiff_fuzz::fuzz_patch(b"example");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use serde_json::{self, Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use structdiff_core::{Diff, Node, Object};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 6;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 12;
const KEY_POOL: [&str; 4] = ["id", "name", "kind", "rev"];

/// Feeds arbitrary bytes through the JSON and YAML parsers.
///
/// Whatever parses must serialize back to JSON that parses to an equal node.
///
/// ```
/// structdiff_fuzz::fuzz_canonicalization(b"{\"key\":\"value\"}");
/// ```
pub fn fuzz_canonicalization(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for parsed in [Node::from_json_str(text), Node::from_yaml_str(text)] {
        let Ok(node) = parsed else {
            continue;
        };
        if node.is_void() {
            continue;
        }
        let rendered = node.to_json_string();
        let reparsed = Node::from_json_str(&rendered).expect("rendered JSON parses");
        assert_eq!(node.content_hash(), reparsed.content_hash(), "{rendered}");
    }
}

/// Diffs two random nodes and checks the diff replays in both directions.
///
/// ```
/// structdiff_fuzz::fuzz_diff(b"seed");
/// ```
pub fn fuzz_diff(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Some(lhs) = random_node(&mut unstructured) else {
        return;
    };
    let Some(rhs) = random_node(&mut unstructured) else {
        return;
    };
    let diff = lhs.diff(&rhs);
    if lhs == rhs {
        assert!(diff.is_empty(), "equal nodes produced {diff:?}");
    }
    let patched = lhs.apply_patch(&diff).expect("diff applies to its own base");
    assert_eq!(patched, rhs);
    let restored = rhs.apply_patch(&diff.reverse()).expect("reversed diff applies to target");
    assert_eq!(restored, lhs);
}

/// Applies both valid and arbitrary diffs to randomly generated nodes.
///
/// The harness first builds a legitimate diff from two inputs and applies
/// it. It then attempts to deserialize an arbitrary diff from the raw bytes
/// and applies it to another random node to exercise error paths.
///
/// ```
/// structdiff_fuzz::fuzz_patch(b"patch fuzz");
/// ```
pub fn fuzz_patch(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    if let (Some(base), Some(target)) =
        (random_node(&mut unstructured), random_node(&mut unstructured))
    {
        let diff = base.diff(&target);
        let patched = base.patch(&diff).expect("diff applies to its own base");
        assert_eq!(patched, target);
    }

    if let Ok(diff) = serde_json::from_slice::<Diff>(data) {
        let mut unstructured = Unstructured::new(data);
        if let Some(seed) = random_node(&mut unstructured) {
            let _ = seed.patch(&diff);
        }
    }
}

/// Checks hashing invariants on random nodes with random identity keys.
///
/// Equal nodes must hash equally, insertion order must not matter, and
/// objects without identity keys must use their content hash as identity.
///
/// ```
/// structdiff_fuzz::fuzz_identity(b"identity");
/// ```
pub fn fuzz_identity(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Some(node) = random_node(&mut unstructured) else {
        return;
    };
    let Ok(keys) = random_id_keys(&mut unstructured) else {
        return;
    };

    assert_eq!(node.identity(), node.content_hash());

    let keyed = node.clone().with_id_keys(&keys);
    let rebuilt = rebuild_reversed(&keyed);
    assert_eq!(keyed, rebuilt);
    assert_eq!(keyed.content_hash(), rebuilt.content_hash());
    assert_eq!(keyed.identity(), rebuilt.identity());
    assert_eq!(keyed.identity_path_element(), rebuilt.identity_path_element());
}

fn rebuild_reversed(node: &Node) -> Node {
    match node {
        Node::Object(object) => {
            let rebuilt: Object = object
                .iter()
                .rev()
                .map(|(key, value)| (key.clone(), rebuild_reversed(value)))
                .collect();
            Node::Object(rebuilt.with_id_keys(object.id_keys().iter().cloned()))
        }
        Node::Array(values) => Node::Array(values.iter().map(rebuild_reversed).collect()),
        other => other.clone(),
    }
}

fn random_id_keys(unstructured: &mut Unstructured<'_>) -> Result<Vec<String>, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=3)?);
    let mut keys = Vec::with_capacity(len);
    for _ in 0..len {
        keys.push(random_key(unstructured)?);
    }
    Ok(keys)
}

fn random_node(unstructured: &mut Unstructured<'_>) -> Option<Node> {
    let value = json_value_from_unstructured(unstructured, 0).ok()?;
    Node::from_json_value(value).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    let choice = unstructured.int_in_range::<u8>(0..=5)?;
    match choice {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        3 => Ok(JsonValue::String(random_string(unstructured)?)),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_key(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    let choice = unstructured.int_in_range::<u8>(0..=3)?;
    match choice {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    if unstructured.arbitrary()? {
        let int = unstructured.arbitrary::<i32>()?;
        Ok(JsonNumber::from(int))
    } else {
        let numerator = f64::from(unstructured.arbitrary::<i32>()?);
        let denominator = f64::from(unstructured.int_in_range::<u16>(1..=1024)?);
        let value = numerator / denominator;
        JsonNumber::from_f64(value).ok_or(arbitrary::Error::IncorrectFormat)
    }
}

// Keys collide with the identity key pool often enough to exercise identity hashing.
fn random_key(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    if unstructured.arbitrary()? {
        Ok((*unstructured.choose(&KEY_POOL)?).to_string())
    } else {
        random_string(unstructured)
    }
}

fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(0x20..=0x7e)?;
        string.push(char::from(byte));
    }
    Ok(string)
}
