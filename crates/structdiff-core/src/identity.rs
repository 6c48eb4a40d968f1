//! Content and identity hashing.
//!
//! Content hashes are a fast proxy for structural equality: equal nodes
//! always hash equally. Identity hashes let a collection-diff component
//! recognise "the same" object across two document versions by hashing
//! only the configured identity keys.

use std::collections::BTreeMap;

use crate::{
    diff::PathSegment,
    hash::{combine_with, Fnv1a, HashCode, HashFunction},
    Node, Object,
};

const VOID_HASH: HashCode = [0xF3, 0x97, 0x6B, 0x21, 0x91, 0x26, 0x8D, 0x96];
const NULL_HASH: HashCode = [0xFE, 0x73, 0xAB, 0xCC, 0xE6, 0x32, 0xE0, 0x88];
const BOOL_TRUE_HASH: HashCode = [0x24, 0x6B, 0xE3, 0xE4, 0xAF, 0x59, 0xDC, 0x1C];
const BOOL_FALSE_HASH: HashCode = [0xC6, 0x38, 0x77, 0xD1, 0x0A, 0x7E, 0x1F, 0xBF];
const LIST_SEED: [u8; 8] = [0xF5, 0x18, 0x0A, 0x71, 0xA4, 0xC4, 0x03, 0xF3];

impl Node {
    /// Hash over the whole value using the default [`Fnv1a`] primitive.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let a = Node::from_json_str("{\"x\":1,\"y\":[true,null]}")?;
    /// let b = Node::from_json_str("{\"y\":[true,null],\"x\":1}")?;
    /// assert_eq!(a.content_hash(), b.content_hash());
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn content_hash(&self) -> HashCode {
        self.content_hash_with(&Fnv1a)
    }

    /// Hash over the whole value using the supplied primitive.
    #[must_use]
    pub fn content_hash_with<H: HashFunction + ?Sized>(&self, hasher: &H) -> HashCode {
        match self {
            Self::Void => VOID_HASH,
            Self::Null => NULL_HASH,
            Self::Bool(true) => BOOL_TRUE_HASH,
            Self::Bool(false) => BOOL_FALSE_HASH,
            Self::Number(n) => n.hash_with(hasher),
            Self::String(s) => hasher.hash(s.as_bytes()),
            Self::Array(values) => hash_list(values, hasher),
            Self::Object(object) => object.content_hash_with(hasher),
        }
    }

    /// Identity hash used to match nodes across document versions.
    ///
    /// Only objects with identity keys differ from [`Node::content_hash`].
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let keys = ["id".to_string()];
    /// let before = Node::from_json_str("{\"id\":\"1\",\"name\":\"Bob\"}")?.with_id_keys(&keys);
    /// let renamed = Node::from_json_str("{\"id\":\"1\",\"name\":\"Rob\"}")?.with_id_keys(&keys);
    /// assert_eq!(before.identity(), renamed.identity());
    /// assert_ne!(before.content_hash(), renamed.content_hash());
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn identity(&self) -> HashCode {
        self.identity_with(&Fnv1a)
    }

    /// Identity hash using the supplied primitive.
    #[must_use]
    pub fn identity_with<H: HashFunction + ?Sized>(&self, hasher: &H) -> HashCode {
        match self {
            Self::Object(object) => object.identity_with(hasher),
            other => other.content_hash_with(hasher),
        }
    }

    /// Path element addressing this node by identity rather than position.
    ///
    /// Non-object nodes have no identity keys and yield an empty mapping.
    ///
    /// ```
    /// # use structdiff_core::{diff::PathSegment, Node};
    /// let node = Node::from_json_str("{\"id\":\"1\",\"name\":\"Bob\"}")?
    ///     .with_id_keys(&["id".to_string(), "rev".to_string()]);
    /// let PathSegment::Identity(map) = node.identity_path_element() else {
    ///     panic!("expected identity segment");
    /// };
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map["id"], Node::from("1"));
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn identity_path_element(&self) -> PathSegment {
        match self {
            Self::Object(object) => object.identity_path_element(),
            _ => PathSegment::Identity(BTreeMap::new()),
        }
    }
}

impl Object {
    /// Content hash over the sorted keys and their values.
    #[must_use]
    pub fn content_hash_with<H: HashFunction + ?Sized>(&self, hasher: &H) -> HashCode {
        let mut bytes = Vec::with_capacity(self.len() * 16);
        // Sorted key order comes from the BTreeMap.
        for (key, value) in self {
            bytes.extend_from_slice(&hasher.hash(key.as_bytes()));
            bytes.extend_from_slice(&value.content_hash_with(hasher));
        }
        hasher.hash(&bytes)
    }

    /// Identity hash over the present identity keys, in configured order.
    ///
    /// Falls back to the content hash when no identity keys are configured
    /// or none of them are present.
    #[must_use]
    pub fn identity_with<H: HashFunction + ?Sized>(&self, hasher: &H) -> HashCode {
        let hashes: Vec<HashCode> = self
            .id_keys()
            .iter()
            .filter_map(|key| self.get(key))
            .map(|value| value.content_hash_with(hasher))
            .collect();
        if hashes.is_empty() {
            return self.content_hash_with(hasher);
        }
        combine_with(hasher, &hashes)
    }

    /// Identity descriptor holding the present identity keys and their values.
    #[must_use]
    pub fn identity_path_element(&self) -> PathSegment {
        let descriptor = self
            .id_keys()
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.clone(), value.clone())))
            .collect();
        PathSegment::Identity(descriptor)
    }
}

fn hash_list<H: HashFunction + ?Sized>(values: &[Node], hasher: &H) -> HashCode {
    let mut bytes = Vec::with_capacity(8 + values.len() * 8);
    bytes.extend_from_slice(&LIST_SEED);
    for value in values {
        bytes.extend_from_slice(&value.content_hash_with(hasher));
    }
    hasher.hash(&bytes)
}
