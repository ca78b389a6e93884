//! An immutable, in-memory document snapshot and its cursor.
//!
//! A `Snapshot` is the read side of one revision: once built it is never
//! mutated, so any number of `SnapshotCursor`s may share it through an `Arc`
//! and move independently.

use crate::cursor::NodeCursor;
use crate::error::SnapshotError;
use std::collections::HashMap;
use std::sync::Arc;
use strata_types::{NodeKey, NodeKind, QName};

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<Arc<str>>,
    parent: Option<NodeKey>,
    first_child: Option<NodeKey>,
    last_child: Option<NodeKey>,
    left_sibling: Option<NodeKey>,
    right_sibling: Option<NodeKey>,
    attributes: Vec<NodeKey>,
    namespaces: Vec<NodeKey>,
}

impl NodeRecord {
    fn new(kind: NodeKind, parent: Option<NodeKey>) -> Self {
        Self {
            kind,
            name: None,
            value: None,
            parent,
            first_child: None,
            last_child: None,
            left_sibling: None,
            right_sibling: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

/// One immutable revision of a document.
#[derive(Debug)]
pub struct Snapshot {
    revision: u64,
    nodes: HashMap<NodeKey, NodeRecord>,
}

impl Snapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Opens a cursor positioned at the document node.
    pub fn cursor(self: &Arc<Self>) -> SnapshotCursor {
        SnapshotCursor::new(Arc::clone(self))
    }

    fn record(&self, key: NodeKey) -> Option<&NodeRecord> {
        self.nodes.get(&key)
    }

    fn descendant_text(&self, key: NodeKey, out: &mut String) {
        let mut child = self.record(key).and_then(|r| r.first_child);
        while let Some(c) = child {
            let Some(record) = self.record(c) else { break };
            match record.kind {
                NodeKind::Text => out.push_str(record.value.as_deref().unwrap_or_default()),
                NodeKind::Element => self.descendant_text(c, out),
                _ => {}
            }
            child = record.right_sibling;
        }
    }
}

/// Builds a `Snapshot`, allocating keys sequentially in insertion order.
///
/// Key 0 is the document node and exists from the start. Nodes appended in
/// document order therefore get keys in document order, which the test
/// documents rely on.
#[derive(Debug)]
pub struct SnapshotBuilder {
    revision: u64,
    next_key: u64,
    nodes: HashMap<NodeKey, NodeRecord>,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeKey::DOCUMENT_ROOT,
            NodeRecord::new(NodeKind::Document, None),
        );
        Self {
            revision: 0,
            next_key: 1,
            nodes,
        }
    }
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Appends an element as the last child of `parent`.
    pub fn element(&mut self, parent: NodeKey, name: QName) -> Result<NodeKey, SnapshotError> {
        let mut record = NodeRecord::new(NodeKind::Element, Some(parent));
        record.name = Some(name);
        self.append_child(parent, record)
    }

    pub fn text(&mut self, parent: NodeKey, value: &str) -> Result<NodeKey, SnapshotError> {
        let mut record = NodeRecord::new(NodeKind::Text, Some(parent));
        record.value = Some(value.into());
        self.append_child(parent, record)
    }

    pub fn comment(&mut self, parent: NodeKey, value: &str) -> Result<NodeKey, SnapshotError> {
        let mut record = NodeRecord::new(NodeKind::Comment, Some(parent));
        record.value = Some(value.into());
        self.append_child(parent, record)
    }

    pub fn processing_instruction(
        &mut self,
        parent: NodeKey,
        target: &str,
        data: &str,
    ) -> Result<NodeKey, SnapshotError> {
        let mut record = NodeRecord::new(NodeKind::ProcessingInstruction, Some(parent));
        record.name = Some(QName::local(target));
        record.value = Some(data.into());
        self.append_child(parent, record)
    }

    pub fn attribute(
        &mut self,
        element: NodeKey,
        name: QName,
        value: &str,
    ) -> Result<NodeKey, SnapshotError> {
        self.require_element(element)?;
        let mut record = NodeRecord::new(NodeKind::Attribute, Some(element));
        record.name = Some(name);
        record.value = Some(value.into());
        let key = self.allocate(record);
        self.record_mut(element)?.attributes.push(key);
        Ok(key)
    }

    /// Declares `prefix` -> `uri` on `element`.
    pub fn namespace(
        &mut self,
        element: NodeKey,
        prefix: &str,
        uri: &str,
    ) -> Result<NodeKey, SnapshotError> {
        self.require_element(element)?;
        let mut record = NodeRecord::new(NodeKind::Namespace, Some(element));
        record.name = Some(QName::local(prefix));
        record.value = Some(uri.into());
        let key = self.allocate(record);
        self.record_mut(element)?.namespaces.push(key);
        Ok(key)
    }

    pub fn build(self) -> Arc<Snapshot> {
        log::debug!(
            "Built snapshot revision {} with {} nodes",
            self.revision,
            self.nodes.len()
        );
        Arc::new(Snapshot {
            revision: self.revision,
            nodes: self.nodes,
        })
    }

    fn allocate(&mut self, record: NodeRecord) -> NodeKey {
        let key = NodeKey::new(self.next_key);
        self.next_key += 1;
        self.nodes.insert(key, record);
        key
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, SnapshotError> {
        self.nodes
            .get_mut(&key)
            .ok_or(SnapshotError::UnknownNode(key))
    }

    fn require_element(&self, key: NodeKey) -> Result<(), SnapshotError> {
        let record = self.nodes.get(&key).ok_or(SnapshotError::UnknownNode(key))?;
        if record.kind != NodeKind::Element {
            return Err(SnapshotError::NotAnElement {
                key,
                kind: record.kind,
            });
        }
        Ok(())
    }

    fn append_child(
        &mut self,
        parent: NodeKey,
        mut record: NodeRecord,
    ) -> Result<NodeKey, SnapshotError> {
        let parent_record = self
            .nodes
            .get(&parent)
            .ok_or(SnapshotError::UnknownNode(parent))?;
        if !parent_record.kind.is_container() {
            return Err(SnapshotError::NotAContainer {
                key: parent,
                kind: parent_record.kind,
            });
        }
        let previous_last = parent_record.last_child;
        record.left_sibling = previous_last;

        let key = self.allocate(record);
        if let Some(prev) = previous_last {
            self.record_mut(prev)?.right_sibling = Some(key);
        }
        let parent_record = self.record_mut(parent)?;
        if parent_record.first_child.is_none() {
            parent_record.first_child = Some(key);
        }
        parent_record.last_child = Some(key);
        Ok(key)
    }
}

/// A cursor over a shared `Snapshot`. Cloning is cheap: one `Arc` bump.
#[derive(Debug, Clone)]
pub struct SnapshotCursor {
    snapshot: Arc<Snapshot>,
    current: NodeKey,
}

impl SnapshotCursor {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            current: NodeKey::DOCUMENT_ROOT,
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    fn current(&self) -> &NodeRecord {
        // `current` only ever holds keys that resolved in `move_to`.
        &self.snapshot.nodes[&self.current]
    }
}

impl NodeCursor for SnapshotCursor {
    fn node_key(&self) -> NodeKey {
        self.current
    }

    fn kind(&self) -> NodeKind {
        self.current().kind
    }

    fn name(&self) -> Option<&QName> {
        self.current().name.as_ref()
    }

    fn string_value(&self) -> String {
        let record = self.current();
        match record.kind {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                self.snapshot.descendant_text(self.current, &mut out);
                out
            }
            _ => record.value.as_deref().unwrap_or_default().to_string(),
        }
    }

    fn revision(&self) -> u64 {
        self.snapshot.revision
    }

    fn parent_key(&self) -> Option<NodeKey> {
        self.current().parent
    }

    fn first_child_key(&self) -> Option<NodeKey> {
        self.current().first_child
    }

    fn last_child_key(&self) -> Option<NodeKey> {
        self.current().last_child
    }

    fn left_sibling_key(&self) -> Option<NodeKey> {
        self.current().left_sibling
    }

    fn right_sibling_key(&self) -> Option<NodeKey> {
        self.current().right_sibling
    }

    fn attribute_count(&self) -> usize {
        self.current().attributes.len()
    }

    fn namespace_count(&self) -> usize {
        self.current().namespaces.len()
    }

    fn move_to(&mut self, key: NodeKey) -> bool {
        if self.snapshot.contains(key) {
            self.current = key;
            true
        } else {
            false
        }
    }

    fn move_to_attribute(&mut self, index: usize) -> bool {
        match self.current().attributes.get(index).copied() {
            Some(key) => self.move_to(key),
            None => false,
        }
    }

    fn move_to_namespace(&mut self, index: usize) -> bool {
        match self.current().namespaces.get(index).copied() {
            Some(key) => self.move_to(key),
            None => false,
        }
    }
}
