use super::{Diff, DiffElement, Path};
use crate::Node;

/// Diffs nodes that are compared as a whole: scalars, arrays and `Void`.
pub(super) fn diff_primitives(lhs: &Node, rhs: &Node, path: &Path) -> Diff {
    if lhs == rhs {
        return Diff::empty();
    }
    Diff::from_elements(vec![DiffElement::replacement(path, lhs, rhs)])
}
