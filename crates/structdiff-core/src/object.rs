use std::collections::{btree_map, BTreeMap};

use crate::Node;

/// A JSON object together with the keys that define its business identity.
///
/// Properties are kept in a [`BTreeMap`], so iteration is always in
/// lexicographic key order. Values are never [`Node::Void`].
///
/// Equality compares properties only; `id_keys` are configuration, not
/// content.
///
/// ```
/// # use structdiff_core::{Node, Object};
/// let mut object = Object::new().with_id_keys(["id"]);
/// object.insert("id", Node::String("1".into()));
/// object.insert("name", Node::String("Bob".into()));
/// assert_eq!(object.len(), 2);
/// assert_eq!(object.id_keys(), ["id"]);
/// assert_eq!(object, Object::from_properties(object.properties().clone()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Object {
    properties: BTreeMap<String, Node>,
    id_keys: Vec<String>,
}

impl Object {
    /// Creates an empty object without identity keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an object from existing properties, dropping any `Void` values.
    #[must_use]
    pub fn from_properties(properties: BTreeMap<String, Node>) -> Self {
        let properties = properties.into_iter().filter(|(_, value)| !value.is_void()).collect();
        Self { properties, id_keys: Vec::new() }
    }

    /// Replaces the identity keys of this object (not of its children).
    #[must_use]
    pub fn with_id_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the identity keys in configured order.
    #[must_use]
    pub fn id_keys(&self) -> &[String] {
        &self.id_keys
    }

    pub(crate) fn set_id_keys(&mut self, keys: &[String]) {
        self.id_keys = keys.to_vec();
    }

    /// Returns the property stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.properties.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// Inserting [`Node::Void`] removes the key instead.
    ///
    /// ```
    /// # use structdiff_core::{Node, Object};
    /// let mut object = Object::new();
    /// object.insert("a", Node::Null);
    /// assert_eq!(object.insert("a", Node::Void), Some(Node::Null));
    /// assert!(object.is_empty());
    /// ```
    pub fn insert<K>(&mut self, key: K, value: Node) -> Option<Node>
    where
        K: Into<String>,
    {
        let key = key.into();
        if value.is_void() {
            return self.properties.remove(&key);
        }
        self.properties.insert(key, value)
    }

    /// Removes and returns the property stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.properties.remove(key)
    }

    /// Indicates whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Indicates whether the object has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates over the properties in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.properties.iter()
    }

    /// Iterates over the keys in sorted order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Node> {
        self.properties.keys()
    }

    /// Borrows the underlying property map.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, Node> {
        &self.properties
    }

    /// Consumes the object and returns the property map.
    #[must_use]
    pub fn into_properties(self) -> BTreeMap<String, Node> {
        self.properties
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
    }
}

impl From<BTreeMap<String, Node>> for Object {
    fn from(value: BTreeMap<String, Node>) -> Self {
        Self::from_properties(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Object {
    fn from_iter<T: IntoIterator<Item = (K, Node)>>(iter: T) -> Self {
        let mut object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Node);
    type IntoIter = btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}
