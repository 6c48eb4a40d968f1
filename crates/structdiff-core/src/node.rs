use std::fmt;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{CanonicalizeError, DiffOptions, Number, Object};

/// A value in a JSON-like document tree.
///
/// Every variant supports the same operations: JSON serialization,
/// structural equality (`==`), content and identity hashing, diffing and
/// patching. Comparing different variants is never an error: they are
/// simply unequal and diff as a whole-value replacement.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Sentinel representing the absence of a value.
    Void,
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number represented as IEEE-754 double precision.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array, compared as an ordered list.
    Array(Vec<Node>),
    /// JSON object with configurable identity keys.
    Object(Object),
}

impl Node {
    /// Parses a JSON string into a node tree.
    ///
    /// Empty or whitespace-only input yields [`Node::Void`].
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let node = Node::from_json_str("{\"hello\":\"world\"}")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// assert_eq!(Node::from_json_str(" \n")?, Node::Void);
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        Self::from_json_str_with(input, &DiffOptions::default())
    }

    /// Parses JSON and stamps the configured identity keys onto every object.
    ///
    /// ```
    /// # use structdiff_core::{DiffOptions, Node};
    /// let opts = DiffOptions::default().with_id_keys(["id"]).unwrap();
    /// let node = Node::from_json_str_with("[{\"id\":1}]", &opts)?;
    /// let Node::Array(items) = node else { panic!("expected array") };
    /// let Node::Object(object) = &items[0] else { panic!("expected object") };
    /// assert_eq!(object.id_keys(), ["id"]);
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str_with(
        input: &str,
        options: &DiffOptions,
    ) -> Result<Self, CanonicalizeError> {
        if input.trim().is_empty() {
            return Ok(Self::Void);
        }
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value_with(value, options)
    }

    /// Parses a YAML string into a node tree.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let node = Node::from_yaml_str("---\nanswer: 42\n")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        Self::from_yaml_str_with(input, &DiffOptions::default())
    }

    /// Parses YAML and stamps the configured identity keys onto every object.
    pub fn from_yaml_str_with(
        input: &str,
        options: &DiffOptions,
    ) -> Result<Self, CanonicalizeError> {
        if input.trim().is_empty() {
            return Ok(Self::Void);
        }
        let value: YamlValue = serde_yaml::from_str(input)?;
        Ok(Self::from_yaml_value(value)?.with_id_keys(options.id_keys()))
    }

    /// Converts a serde JSON value into a [`Node`].
    pub fn from_json_value(value: JsonValue) -> Result<Self, CanonicalizeError> {
        Self::from_json_value_with(value, &DiffOptions::default())
    }

    /// Converts a serde JSON value, stamping identity keys onto every object.
    pub fn from_json_value_with(
        value: JsonValue,
        options: &DiffOptions,
    ) -> Result<Self, CanonicalizeError> {
        let id_keys = options.id_keys();
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => {
                let Some(as_f64) = num.as_f64() else {
                    return Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() });
                };
                Ok(Self::Number(Number::new(as_f64)?))
            }
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value_with(value, options)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = Object::new().with_id_keys(id_keys.iter().cloned());
                for (key, value) in map {
                    object.insert(key, Self::from_json_value_with(value, options)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, CanonicalizeError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => {
                if let Some(f) = num.as_f64() {
                    return Ok(Self::Number(Number::new(f)?));
                }
                if let Some(i) = num.as_i64() {
                    return Ok(Self::Number(Number::new(i as f64)?));
                }
                if let Some(u) = num.as_u64() {
                    return Ok(Self::Number(Number::new(u as f64)?));
                }
                Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() })
            }
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Array(items))
            }
            YamlValue::Mapping(map) => {
                let mut object = Object::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(CanonicalizeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::Object(object))
            }
            YamlValue::Tagged(tagged) => {
                Err(CanonicalizeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Stamps `keys` as the identity keys of every object in the tree.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let node = Node::from_json_str("{\"child\":{\"id\":1}}")?
    ///     .with_id_keys(&["id".to_string()]);
    /// let Node::Object(root) = &node else { panic!("expected object") };
    /// let Some(Node::Object(child)) = root.get("child") else { panic!("expected child") };
    /// assert_eq!(child.id_keys(), ["id"]);
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn with_id_keys(self, keys: &[String]) -> Self {
        match self {
            Self::Array(values) => {
                Self::Array(values.into_iter().map(|value| value.with_id_keys(keys)).collect())
            }
            Self::Object(object) => {
                let mut stamped: Object = object
                    .into_properties()
                    .into_iter()
                    .map(|(key, value)| (key, value.with_id_keys(keys)))
                    .collect();
                stamped.set_id_keys(keys);
                Self::Object(stamped)
            }
            other => other,
        }
    }

    /// Indicates whether this is the [`Node::Void`] sentinel.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Converts the node into a serde JSON value when representable.
    ///
    /// Returns `None` when the node contains the `Void` sentinel (either at the
    /// root or nested within arrays) because `serde_json::Value` cannot
    /// represent the absence of a value.
    #[must_use]
    pub fn to_json_value(&self) -> Option<JsonValue> {
        match self {
            Self::Void => None,
            Self::Null => Some(JsonValue::Null),
            Self::Bool(v) => Some(JsonValue::Bool(*v)),
            Self::Number(n) => Some(JsonValue::Number(n.to_json_number())),
            Self::String(s) => Some(JsonValue::String(s.clone())),
            Self::Array(values) => {
                let mut result = Vec::with_capacity(values.len());
                for value in values {
                    result.push(value.to_json_value()?);
                }
                Some(JsonValue::Array(result))
            }
            Self::Object(object) => {
                let mut map = serde_json::Map::new();
                for (key, value) in object {
                    map.insert(key.clone(), value.to_json_value()?);
                }
                Some(JsonValue::Object(map))
            }
        }
    }

    /// Renders the node as JSON text with object keys in sorted order.
    ///
    /// A `Void` root renders as the empty string. `Void` elements nested in
    /// arrays mark absent values and are left out, so the output is always
    /// valid JSON for any other root.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let node = Node::from_json_str("{\"b\":[1,2.5],\"a\":null}")?;
    /// assert_eq!(node.to_json_string(), "{\"a\":null,\"b\":[1,2.5]}");
    /// assert_eq!(Node::Void.to_json_string(), "");
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.present_json_value().map(|value| value.to_string()).unwrap_or_default()
    }

    fn present_json_value(&self) -> Option<JsonValue> {
        match self {
            Self::Array(values) => {
                Some(JsonValue::Array(values.iter().filter_map(Self::present_json_value).collect()))
            }
            Self::Object(object) => Some(JsonValue::Object(
                object
                    .iter()
                    .filter_map(|(key, value)| Some((key.clone(), value.present_json_value()?)))
                    .collect(),
            )),
            other => other.to_json_value(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Void => Err(ser::Error::custom("void node has no JSON representation")),
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(n) => n.to_json_number().serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(values) => serializer.collect_seq(values),
            Self::Object(object) => serializer.collect_map(object),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Self::from_json_value(value).map_err(de::Error::custom)
    }
}

impl TryFrom<JsonValue> for Node {
    type Error = CanonicalizeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl From<Object> for Node {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::*,
        string::string_regex,
    };

    fn arb_json_value() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            proptest::num::f64::ANY.prop_filter_map("finite", |f| {
                if f.is_finite() {
                    serde_json::Number::from_f64(f).map(JsonValue::Number)
                } else {
                    None
                }
            }),
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(JsonValue::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4).prop_map(|map| {
                    let mut object = serde_json::Map::new();
                    for (k, v) in map {
                        object.insert(k, v);
                    }
                    JsonValue::Object(object)
                }),
            ]
        })
    }

    #[test]
    fn json_whitespace_is_void() {
        let node = Node::from_json_str("   \n\t").expect("whitespace should canonicalize to void");
        assert!(node.is_void());
    }

    #[test]
    fn json_object_roundtrip() {
        let node = Node::from_json_str("{\"a\":1,\"b\":true}").unwrap();
        let value = node.to_json_value().unwrap();
        assert_eq!(value["a"].as_f64().unwrap(), 1.0);
        assert!(value["b"].as_bool().unwrap());
    }

    #[test]
    fn json_number_out_of_range_yields_error() {
        let err = Node::from_json_str("1e400").unwrap_err();
        match err {
            CanonicalizeError::NumberOutOfRange { .. } | CanonicalizeError::Json(_) => {}
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn yaml_non_string_key_errors() {
        let err = Node::from_yaml_str("? [1, 2]: 3").unwrap_err();
        let CanonicalizeError::NonStringYamlKey { .. } = err else {
            panic!("expected NonStringYamlKey error");
        };
    }

    #[test]
    fn yaml_and_json_agree() {
        let json = Node::from_json_str("{\"name\":\"structdiff\",\"tags\":[\"a\",\"b\"]}").unwrap();
        let yaml = Node::from_yaml_str("name: structdiff\ntags:\n  - a\n  - b\n").unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn different_variants_are_unequal() {
        let object = Node::from_json_str("{}").unwrap();
        let array = Node::from_json_str("[]").unwrap();
        assert_ne!(object, array);
        assert_ne!(Node::Null, Node::Void);
    }

    #[test]
    fn nodes_can_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Node>();
    }

    #[test]
    fn void_is_not_serializable() {
        assert!(serde_json::to_string(&Node::Void).is_err());
        assert!(serde_json::to_string(&Node::Array(vec![Node::Void])).is_err());
    }

    #[test]
    fn nested_void_is_left_out_of_json_text() {
        let node = Node::Array(vec![Node::Null, Node::Void, Node::Array(vec![Node::Void])]);
        let text = node.to_json_string();
        assert_eq!(text, "[null,[]]");
        assert!(Node::from_json_str(&text).is_ok());
    }

    #[test]
    fn id_keys_reach_nested_objects() {
        let opts = DiffOptions::default().with_id_keys(["id"]).unwrap();
        let node = Node::from_yaml_str_with("items:\n  - id: 1\n", &opts).unwrap();
        let Node::Object(root) = &node else { panic!("expected object") };
        assert_eq!(root.id_keys(), ["id"]);
        let Some(Node::Array(items)) = root.get("items") else { panic!("expected array") };
        let Node::Object(item) = &items[0] else { panic!("expected object") };
        assert_eq!(item.id_keys(), ["id"]);
    }

    proptest! {
        #[test]
        fn json_roundtrips_through_node(value in arb_json_value()) {
            let node = Node::from_json_value(value.clone()).unwrap();
            let reconstructed = node.to_json_value().unwrap();
            let node_again = Node::from_json_value(reconstructed.clone()).unwrap();
            prop_assert_eq!(node_again, node);
        }
    }
}
