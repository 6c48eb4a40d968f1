//! Structural diff and patch for JSON-like document trees.
//!
//! `structdiff-core` compares two [`Node`] trees into a path-addressed
//! [`Diff`], replays a diff onto a base tree while detecting conflicts, and
//! computes the content and identity hashes a collection-diff component
//! needs to match elements across document versions.
//!
//! ```
//! use structdiff_core::Node;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base = Node::from_json_str("{\"name\":\"structdiff\",\"version\":1}")?;
//!     let target = Node::from_json_str("{\"name\":\"structdiff\",\"version\":2}")?;
//!     let diff = base.diff(&target);
//!     assert_eq!(diff.len(), 1);
//!
//!     let patched = base.apply_patch(&diff)?;
//!     assert_eq!(patched, target);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diff;
mod error;
mod hash;
mod identity;
mod node;
mod number;
mod object;
mod options;
mod patch;

pub use diff::{Diff, DiffElement, Path, PathSegment};
pub use error::{CanonicalizeError, OptionsError};
pub use hash::{combine_with, hash_bytes, Fnv1a, HashCode, HashFunction};
pub use node::Node;
pub use number::Number;
pub use object::Object;
pub use options::DiffOptions;
pub use patch::PatchError;

/// Returns the semantic version of the `structdiff-core` crate.
///
/// ```
/// assert!(!structdiff_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
