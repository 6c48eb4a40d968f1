//! Benchmark corpora for the structdiff engine.
//!
//! Each [`Corpus`] is a pair of JSON documents compiled into the crate. The
//! Criterion benches in `benches/smoke.rs` load every corpus once and then
//! time diffing, patching and hashing against the parsed [`Dataset`].
//!
//! # Examples
//!
//! ```
//! let corpus = &structdiff_benches::available_corpora()[0];
//! let dataset = corpus.load()?;
//! assert!(!dataset.diff().is_empty());
//! # Ok::<(), anyhow::Error>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use anyhow::{Context, Result};
use structdiff_core::{Diff, DiffOptions, Node};

/// A named before/after document pair.
#[derive(Debug)]
pub struct Corpus {
    name: &'static str,
    before: &'static str,
    after: &'static str,
    id_keys: &'static [&'static str],
}

static CORPORA: [Corpus; 2] = [
    Corpus {
        name: "k8s-deployment",
        before: include_str!("../fixtures/deployment-before.json"),
        after: include_str!("../fixtures/deployment-after.json"),
        id_keys: &[],
    },
    Corpus {
        name: "inventory",
        before: include_str!("../fixtures/inventory-before.json"),
        after: include_str!("../fixtures/inventory-after.json"),
        id_keys: &["id"],
    },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

impl Corpus {
    /// Benchmark identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Combined size of both documents, used as Criterion throughput.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Parses both documents, stamping the corpus identity keys on every object.
    pub fn load(&self) -> Result<Dataset> {
        let options = if self.id_keys.is_empty() {
            DiffOptions::default()
        } else {
            DiffOptions::default()
                .with_id_keys(self.id_keys.iter().copied())
                .with_context(|| format!("invalid id keys for corpus {}", self.name))?
        };
        let before = Node::from_json_str_with(self.before, &options)
            .with_context(|| format!("failed to parse {} before document", self.name))?;
        let after = Node::from_json_str_with(self.after, &options)
            .with_context(|| format!("failed to parse {} after document", self.name))?;
        Ok(Dataset { before, after })
    }
}

/// Parsed documents of a [`Corpus`].
#[derive(Clone, Debug)]
pub struct Dataset {
    before: Node,
    after: Node,
}

impl Dataset {
    /// The base document.
    #[must_use]
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// The target document.
    #[must_use]
    pub fn after(&self) -> &Node {
        &self.after
    }

    /// Structural diff from the base to the target document.
    #[must_use]
    pub fn diff(&self) -> Diff {
        self.before.diff(&self.after)
    }
}
