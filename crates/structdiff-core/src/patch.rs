//! Patch application engine.
//!
//! Each [`DiffElement`](crate::DiffElement) is replayed by walking its path
//! down the base tree. Objects are modified in place: the child addressed by
//! the next key is taken out, patched, and put back (or left out when the
//! patched child is `Void`). At the end of the path the node found there
//! must equal the element's recorded old value, otherwise the base has
//! diverged and the patch is rejected.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    diff::{Path, PathSegment},
    Diff, Node, Object,
};

/// Errors that can occur while applying a diff.
///
/// Every variant carries the path consumed so far.
///
/// ```
/// # use structdiff_core::{Node, PatchError};
/// let base = Node::from_json_str("{\"x\":1}")?;
/// let target = Node::from_json_str("{\"x\":2}")?;
/// let diff = base.diff(&target);
/// let err = Node::from_json_str("{\"x\":5}")?.patch(&diff).unwrap_err();
/// assert!(matches!(err, PatchError::PatchConflict { .. }));
/// assert_eq!(err.to_string(), "found 5 at [x]: expected 1");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    /// The path steps through a node that cannot be descended that way.
    #[error("found {} at {path}: expected {expected}", describe(.found))]
    PathTypeMismatch {
        /// Path consumed before the mismatch.
        path: Path,
        /// The node that could not be descended.
        found: Box<Node>,
        /// The kind of node the path step requires.
        expected: &'static str,
    },
    /// More than one old or new value at a plain (non-collection) location.
    #[error(
        "invalid diff: {} old and {} new values at non-set path {path}",
        .old_values.len(),
        .new_values.len()
    )]
    NonSetDiffEntry {
        /// Path of the offending element.
        path: Path,
        /// Old values carried by the element.
        old_values: Vec<Node>,
        /// New values carried by the element.
        new_values: Vec<Node>,
    },
    /// The base document does not hold the value the diff expects.
    #[error("found {} at {path}: expected {}", describe(.found), describe(.expected))]
    PatchConflict {
        /// Path of the conflicting value.
        path: Path,
        /// Value recorded in the diff.
        expected: Box<Node>,
        /// Value present in the base document.
        found: Box<Node>,
    },
    /// An index step points outside the array.
    #[error("index {index} out of bounds at {path}: array has {len} elements")]
    IndexOutOfBounds {
        /// Path of the array.
        path: Path,
        /// Requested index.
        index: i64,
        /// Array length.
        len: usize,
    },
    /// No array element carries the requested identity.
    #[error("no element with identity {segment} at {path}")]
    ElementNotFound {
        /// Path of the array.
        path: Path,
        /// The identity segment that matched nothing.
        segment: PathSegment,
    },
}

fn describe(node: &Node) -> String {
    if node.is_void() {
        "nothing".to_string()
    } else {
        node.to_json_string()
    }
}

impl Node {
    /// Applies every element of `diff` in order, consuming the base.
    ///
    /// Patching a root can replace it outright, so the result is returned
    /// rather than written back. A failed element aborts the whole patch;
    /// callers that need the base afterwards should use
    /// [`Node::apply_patch`] or clone first.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let base = Node::from_json_str("{\"x\":1}")?;
    /// let target = Node::from_json_str("{\"x\":1,\"y\":2}")?;
    /// let diff = base.diff(&target);
    /// assert_eq!(base.patch(&diff)?, target);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn patch(self, diff: &Diff) -> Result<Self, PatchError> {
        debug!(elements = diff.len(), "applying patch");
        let root = Path::new();
        let mut current = self;
        for element in diff {
            trace!(path = %element.path, "applying diff element");
            current = current
                .patch_element(
                    &root,
                    element.path.segments(),
                    &element.old_values,
                    &element.new_values,
                )
                .inspect_err(|err| debug!(error = %err, "patch aborted"))?;
        }
        debug!(elements = diff.len(), "patch applied");
        Ok(current)
    }

    /// Applies `diff` to a copy of this node.
    ///
    /// ```
    /// # use structdiff_core::Node;
    /// let base = Node::from_json_str("{\"x\":1,\"z\":3}")?;
    /// let target = Node::from_json_str("{\"x\":1}")?;
    /// let patched = base.apply_patch(&base.diff(&target))?;
    /// assert_eq!(patched, target);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_patch(&self, diff: &Diff) -> Result<Self, PatchError> {
        self.clone().patch(diff)
    }

    /// Applies one diff element's payload.
    ///
    /// `path_ahead` is the part of the element's path still to walk;
    /// `path_behind` is the part already consumed and only feeds error
    /// messages. Returns the patched node, which is `Void` when the value
    /// at this location should be removed.
    pub fn patch_element(
        self,
        path_behind: &Path,
        path_ahead: &[PathSegment],
        old_values: &[Node],
        new_values: &[Node],
    ) -> Result<Self, PatchError> {
        match self {
            Self::Object(object) => {
                patch_object(object, path_behind, path_ahead, old_values, new_values)
            }
            Self::Array(values) => {
                patch_array(values, path_behind, path_ahead, old_values, new_values)
            }
            other => patch_scalar(other, path_behind, path_ahead, old_values, new_values),
        }
    }
}

fn patch_object(
    mut object: Object,
    path_behind: &Path,
    path_ahead: &[PathSegment],
    old_values: &[Node],
    new_values: &[Node],
) -> Result<Node, PatchError> {
    let Some((segment, rest)) = path_ahead.split_first() else {
        return replace(Node::Object(object), path_behind, old_values, new_values);
    };
    let PathSegment::Key(key) = segment else {
        return Err(PatchError::PathTypeMismatch {
            path: path_behind.clone(),
            found: Box::new(Node::Object(object)),
            expected: "JSON object",
        });
    };

    let child = object.remove(key).unwrap_or(Node::Void);
    let child_path = path_behind.clone().with_segment(segment.clone());
    let patched = child.patch_element(&child_path, rest, old_values, new_values)?;
    // Inserting Void leaves the key deleted.
    object.insert(key.as_str(), patched);
    Ok(Node::Object(object))
}

fn patch_array(
    mut values: Vec<Node>,
    path_behind: &Path,
    path_ahead: &[PathSegment],
    old_values: &[Node],
    new_values: &[Node],
) -> Result<Node, PatchError> {
    let Some((segment, rest)) = path_ahead.split_first() else {
        return replace(Node::Array(values), path_behind, old_values, new_values);
    };
    let position = match segment {
        PathSegment::Index(index) => usize::try_from(*index)
            .ok()
            .filter(|position| *position < values.len())
            .ok_or_else(|| PatchError::IndexOutOfBounds {
                path: path_behind.clone(),
                index: *index,
                len: values.len(),
            })?,
        PathSegment::Identity(descriptor) => values
            .iter()
            .position(|value| has_identity(value, descriptor))
            .ok_or_else(|| PatchError::ElementNotFound {
                path: path_behind.clone(),
                segment: segment.clone(),
            })?,
        PathSegment::Key(_) => {
            return Err(PatchError::PathTypeMismatch {
                path: path_behind.clone(),
                found: Box::new(Node::Array(values)),
                expected: "JSON object",
            });
        }
    };

    let child = std::mem::replace(&mut values[position], Node::Void);
    let child_path = path_behind.clone().with_segment(segment.clone());
    let patched = child.patch_element(&child_path, rest, old_values, new_values)?;
    if patched.is_void() {
        values.remove(position);
    } else {
        values[position] = patched;
    }
    Ok(Node::Array(values))
}

fn patch_scalar(
    node: Node,
    path_behind: &Path,
    path_ahead: &[PathSegment],
    old_values: &[Node],
    new_values: &[Node],
) -> Result<Node, PatchError> {
    if let Some(segment) = path_ahead.first() {
        let expected = match segment {
            PathSegment::Key(_) => "JSON object",
            PathSegment::Index(_) | PathSegment::Identity(_) => "JSON array",
        };
        return Err(PatchError::PathTypeMismatch {
            path: path_behind.clone(),
            found: Box::new(node),
            expected,
        });
    }
    replace(node, path_behind, old_values, new_values)
}

/// End of the path: checks the recorded old value and hands back the new one.
fn replace(
    node: Node,
    path: &Path,
    old_values: &[Node],
    new_values: &[Node],
) -> Result<Node, PatchError> {
    if old_values.len() > 1 || new_values.len() > 1 {
        return Err(PatchError::NonSetDiffEntry {
            path: path.clone(),
            old_values: old_values.to_vec(),
            new_values: new_values.to_vec(),
        });
    }
    let expected = single_value(old_values);
    if node != expected {
        debug!(path = %path, found = node.kind(), expected = expected.kind(), "patch conflict");
        return Err(PatchError::PatchConflict {
            path: path.clone(),
            expected: Box::new(expected),
            found: Box::new(node),
        });
    }
    Ok(single_value(new_values))
}

fn single_value(values: &[Node]) -> Node {
    values.first().cloned().unwrap_or(Node::Void)
}

// Only objects carrying at least one identity key can be addressed by identity.
fn has_identity(node: &Node, descriptor: &BTreeMap<String, Node>) -> bool {
    let Node::Object(object) = node else {
        return false;
    };
    if descriptor.is_empty() {
        return false;
    }
    let PathSegment::Identity(found) = object.identity_path_element() else {
        return false;
    };
    &found == descriptor
}
