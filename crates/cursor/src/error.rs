use strata_types::{NodeKey, NodeKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Node {0} does not exist in the snapshot")]
    UnknownNode(NodeKey),

    #[error("Node {key} of kind {kind:?} cannot hold children")]
    NotAContainer { key: NodeKey, kind: NodeKind },

    #[error("Node {key} of kind {kind:?} cannot hold attributes or namespaces")]
    NotAnElement { key: NodeKey, kind: NodeKind },
}
