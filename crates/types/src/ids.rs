//! Newtype wrapper for node identifiers.
//!
//! A `NodeKey` is stable within one snapshot and totally ordered. Keys are
//! allocated in document order by the reference snapshot builder, but callers
//! must not rely on that: the only guaranteed relation is identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of a node inside a document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(u64);

impl NodeKey {
    /// The document node. Also used as the "before any move" sentinel.
    pub const DOCUMENT_ROOT: NodeKey = NodeKey(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this key.
    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_document_root(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for NodeKey {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<NodeKey> for u64 {
    fn from(key: NodeKey) -> Self {
        key.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
