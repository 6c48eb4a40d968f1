use super::{Diff, DiffElement, Path, PathSegment};
use crate::{Node, Object};

/// Diffs an object against any node.
///
/// A non-object on the right replaces the object as a whole. Otherwise the
/// old keys are walked in sorted order, recursing into shared keys and
/// emitting deletions for the rest, then keys only present on the right are
/// emitted as insertions. Every child path is a fresh copy of `path`.
pub(super) fn diff_object(lhs: &Object, rhs: &Node, path: &Path) -> Diff {
    let Node::Object(rhs) = rhs else {
        let mut element =
            DiffElement::new().with_path(path.clone()).with_old_values(vec![lhs.clone().into()]);
        if !rhs.is_void() {
            element.new_values.push(rhs.clone());
        }
        return Diff::from_elements(vec![element]);
    };

    let mut diff = Diff::empty();
    for (key, value) in lhs {
        let sub_path = path.clone().with_segment(PathSegment::key(key.as_str()));
        match rhs.get(key) {
            Some(other) => diff.extend(value.diff_at(other, &sub_path)),
            None => diff.push(
                DiffElement::new().with_path(sub_path).with_old_values(vec![value.clone()]),
            ),
        }
    }

    for (key, value) in rhs {
        if lhs.contains_key(key) {
            continue;
        }
        diff.push(
            DiffElement::new()
                .with_path(path.clone().with_segment(PathSegment::key(key.as_str())))
                .with_new_values(vec![value.clone()]),
        );
    }

    diff
}
