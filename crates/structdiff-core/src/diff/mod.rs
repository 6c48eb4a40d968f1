//! Diff data structures and algorithms.
//!
//! A [`Diff`] is an ordered list of [`DiffElement`]s, each addressing one
//! location by [`Path`] and recording the values found there before and
//! after. Objects are compared key by key in sorted order; every other
//! node kind (arrays included) is compared as a whole and replaced when it
//! differs.

mod object;
mod path;
mod primitives;

pub use path::{path_from_segments, Path, PathSegment};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::Node;

/// Represents a single diff hunk.
///
/// An empty `old_values` means the location was absent before; an empty
/// `new_values` means it is absent after. More than one value on either
/// side is only meaningful at identity-addressed collection paths.
///
/// ```
/// # use structdiff_core::diff::{DiffElement, PathSegment};
/// # use structdiff_core::Node;
/// let lhs = Node::from_json_str("1").unwrap();
/// let rhs = Node::from_json_str("2").unwrap();
/// let element = DiffElement::new()
///     .with_path(PathSegment::key("x"))
///     .with_old_values(vec![lhs.clone()])
///     .with_new_values(vec![rhs.clone()]);
/// assert_eq!(element.old_values, vec![lhs]);
/// assert_eq!(element.new_values, vec![rhs]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffElement {
    /// Location of the change, from the document root.
    #[serde(default)]
    pub path: Path,
    /// Values found at the path before the change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_values: Vec<Node>,
    /// Values found at the path after the change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_values: Vec<Node>,
}

impl DiffElement {
    /// Creates a blank diff element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path for the element.
    #[must_use]
    pub fn with_path<P>(mut self, path: P) -> Self
    where
        P: Into<Path>,
    {
        self.path = path.into();
        self
    }

    /// Sets the values expected before the change.
    #[must_use]
    pub fn with_old_values(mut self, old_values: Vec<Node>) -> Self {
        self.old_values = old_values;
        self
    }

    /// Sets the values present after the change.
    #[must_use]
    pub fn with_new_values(mut self, new_values: Vec<Node>) -> Self {
        self.new_values = new_values;
        self
    }

    /// Builds the element replacing `old` with `new` at `path`, leaving out
    /// `Void` on either side.
    pub(crate) fn replacement(path: &Path, old: &Node, new: &Node) -> Self {
        let present = |node: &Node| if node.is_void() { Vec::new() } else { vec![node.clone()] };
        Self { path: path.clone(), old_values: present(old), new_values: present(new) }
    }
}

/// Collection of diff elements.
///
/// ```
/// # use structdiff_core::diff::{Diff, DiffElement};
/// let diff = Diff::from_elements(vec![DiffElement::new()]);
/// assert_eq!(diff.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff {
    elements: Vec<DiffElement>,
}

impl Diff {
    /// Constructs an empty diff.
    #[must_use]
    pub fn empty() -> Self {
        Self { elements: Vec::new() }
    }

    /// Builds a diff from the provided elements.
    #[must_use]
    pub fn from_elements(elements: Vec<DiffElement>) -> Self {
        Self { elements }
    }

    /// Returns the number of elements in the diff.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Indicates whether the diff is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, DiffElement> {
        self.elements.iter()
    }

    /// Appends an element.
    pub fn push(&mut self, element: DiffElement) {
        self.elements.push(element);
    }

    /// Consumes the diff and returns the elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<DiffElement> {
        self.elements
    }

    /// Reverses the diff so that applying it to the target restores the base value.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let lhs = Node::from_json_str("{\"a\":1,\"b\":2}")?;
    /// let rhs = Node::from_json_str("{\"a\":3,\"c\":4}")?;
    /// let diff = lhs.diff(&rhs);
    /// let restored = rhs.patch(&diff.reverse())?;
    /// assert_eq!(restored, lhs);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn reverse(&self) -> Self {
        let elements = self
            .elements
            .iter()
            .rev()
            .map(|element| DiffElement {
                path: element.path.clone(),
                old_values: element.new_values.clone(),
                new_values: element.old_values.clone(),
            })
            .collect();
        Self { elements }
    }
}

impl IntoIterator for Diff {
    type Item = DiffElement;
    type IntoIter = std::vec::IntoIter<DiffElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a DiffElement;
    type IntoIter = std::slice::Iter<'a, DiffElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl From<Vec<DiffElement>> for Diff {
    fn from(value: Vec<DiffElement>) -> Self {
        Self::from_elements(value)
    }
}

impl Extend<DiffElement> for Diff {
    fn extend<T: IntoIterator<Item = DiffElement>>(&mut self, iter: T) {
        self.elements.extend(iter);
    }
}

impl Node {
    /// Computes the structural diff from `self` (old) to `other` (new).
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let lhs = Node::from_json_str("{\"x\":1}")?;
    /// let rhs = Node::from_json_str("{\"x\":1,\"y\":2}")?;
    /// let diff = lhs.diff(&rhs);
    /// assert_eq!(diff.len(), 1);
    /// assert!(lhs.diff(&lhs).is_empty());
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn diff(&self, other: &Self) -> Diff {
        let diff = self.diff_at(other, &Path::new());
        trace!(lhs = self.kind(), rhs = other.kind(), elements = diff.len(), "computed diff");
        diff
    }

    /// Computes the diff with every emitted path rooted at `path`.
    ///
    /// ```
    /// # use structdiff_core::diff::{Path, PathSegment};
    /// # use structdiff_core::Node;
    /// let root = Path::from(PathSegment::key("spec"));
    /// let diff = Node::from_json_str("1")?.diff_at(&Node::from_json_str("2")?, &root);
    /// assert_eq!(diff.iter().next().unwrap().path, root);
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn diff_at(&self, other: &Self, path: &Path) -> Diff {
        match self {
            Self::Object(object) => object::diff_object(object, other, path),
            _ => primitives::diff_primitives(self, other, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(json: &str) -> Node {
        Node::from_json_str(json).unwrap()
    }

    #[test]
    fn diff_of_numbers_produces_replacement_hunk() {
        let lhs = node("1");
        let rhs = node("2");
        let expected = Diff::from_elements(vec![DiffElement::new()
            .with_path(Path::new())
            .with_old_values(vec![lhs.clone()])
            .with_new_values(vec![rhs.clone()])]);
        assert_eq!(lhs.diff(&rhs), expected);
    }

    #[test]
    fn diff_of_objects_tracks_additions_and_removals() {
        let lhs = node("{\"a\":1,\"b\":2}");
        let rhs = node("{\"b\":2,\"c\":3}");
        let expected = Diff::from_elements(vec![
            DiffElement::new().with_path(PathSegment::key("a")).with_old_values(vec![node("1")]),
            DiffElement::new().with_path(PathSegment::key("c")).with_new_values(vec![node("3")]),
        ]);
        assert_eq!(lhs.diff(&rhs), expected);
    }

    #[test]
    fn arrays_are_replaced_whole() {
        let lhs = node("{\"list\":[1,2,3]}");
        let rhs = node("{\"list\":[1,4,3]}");
        let expected = Diff::from_elements(vec![DiffElement::new()
            .with_path(PathSegment::key("list"))
            .with_old_values(vec![node("[1,2,3]")])
            .with_new_values(vec![node("[1,4,3]")])]);
        assert_eq!(lhs.diff(&rhs), expected);
    }

    #[test]
    fn void_sides_are_left_out() {
        let value = node("{\"a\":1}");
        let from_void = Node::Void.diff(&value);
        assert_eq!(from_void.len(), 1);
        let element = from_void.iter().next().unwrap();
        assert!(element.old_values.is_empty());
        assert_eq!(element.new_values, vec![value.clone()]);

        let to_void = value.diff(&Node::Void);
        let element = to_void.iter().next().unwrap();
        assert_eq!(element.old_values, vec![value]);
        assert!(element.new_values.is_empty());

        assert!(Node::Void.diff(&Node::Void).is_empty());
    }

    #[test]
    fn diff_serializes_with_plain_json_values() {
        let diff = node("{\"a\":{\"b\":1}}").diff(&node("{\"a\":{\"b\":2}}"));
        let json = serde_json::to_string(&diff).unwrap();
        assert_eq!(json, "[{\"path\":[\"a\",\"b\"],\"old_values\":[1],\"new_values\":[2]}]");
        let decoded: Diff = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, diff);
    }

    #[test]
    fn reverse_swaps_values_and_order() {
        let diff = node("{\"a\":1,\"b\":2}").diff(&node("{\"a\":2}"));
        let reversed = diff.reverse();
        let paths: Vec<String> = reversed.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["[b]", "[a]"]);
        let first = reversed.iter().next().unwrap();
        assert!(first.old_values.is_empty());
        assert_eq!(first.new_values, vec![node("2")]);
    }

    fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
        use proptest::{collection::btree_map, collection::vec, string::string_regex};

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
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4).prop_map(|map| {
                    let mut object = serde_json::Map::new();
                    for (k, v) in map {
                        object.insert(k, v);
                    }
                    serde_json::Value::Object(object)
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn identical_nodes_produce_empty_diff(json in arb_json_value()) {
            let node = Node::from_json_value(json.clone()).unwrap();
            let other = Node::from_json_value(json).unwrap();
            prop_assert!(node.diff(&other).is_empty());
        }

        #[test]
        fn every_path_is_rooted_at_the_given_prefix(
            a in arb_json_value(),
            b in arb_json_value(),
        ) {
            let lhs = Node::from_json_value(a).unwrap();
            let rhs = Node::from_json_value(b).unwrap();
            let root = Path::from(vec![PathSegment::key("root"), PathSegment::index(0)]);
            for element in lhs.diff_at(&rhs, &root) {
                prop_assert_eq!(&element.path.segments()[..2], root.segments());
            }
        }
    }
}
