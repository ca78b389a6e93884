//! Node kinds and qualified names, aligned with the XDM node model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The kind of a node in a document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Namespace,
    Text,
    Comment,
    ProcessingInstruction,
}

impl NodeKind {
    /// Attributes and namespaces hang off an element but are not its children.
    pub fn is_attached(self) -> bool {
        matches!(self, NodeKind::Attribute | NodeKind::Namespace)
    }

    /// Nodes that may have children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }
}

/// A qualified name: optional prefix, local part and resolved namespace URI.
///
/// Backed by `Arc<str>` so that names can be handed out of an immutable
/// snapshot and shared between cursors without copying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    prefix: Option<Arc<str>>,
    local: Arc<str>,
    namespace: Option<Arc<str>>,
}

impl QName {
    /// A name without prefix or namespace.
    pub fn local(local: impl Into<Arc<str>>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    /// A prefixed name bound to `namespace`.
    pub fn prefixed(
        prefix: impl Into<Arc<str>>,
        local: impl Into<Arc<str>>,
        namespace: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
            namespace: Some(namespace.into()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local_part(&self) -> &str {
        &self.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}
