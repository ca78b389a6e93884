//! Defines the cursor capability over a document snapshot.
use std::fmt::Debug;
use strata_types::{NodeKey, NodeKind, QName};

/// A mutable read position over one immutable document snapshot.
///
/// Moving a cursor is a side effect visible to everybody holding that
/// cursor instance. `Clone` must produce an independent cursor positioned at
/// the same key, sharing only immutable snapshot data; this is what lets a
/// clone be moved onto a worker thread while the original stays with the
/// caller.
///
/// Failed moves leave the cursor where it was.
pub trait NodeCursor: Clone + Debug + Send + 'static {
    /// The key of the node the cursor currently addresses.
    fn node_key(&self) -> NodeKey;

    fn kind(&self) -> NodeKind;

    /// The qualified name of element, attribute and namespace nodes (for a
    /// namespace node the local part is the bound prefix). Processing
    /// instructions report their target. `None` for every other kind.
    fn name(&self) -> Option<&QName>;

    /// The string value of the current node.
    /// - Text, comment, attribute and namespace nodes: their own value.
    /// - Elements and the document: the concatenated descendant text.
    fn string_value(&self) -> String;

    /// The revision of the snapshot this cursor reads.
    fn revision(&self) -> u64;

    fn parent_key(&self) -> Option<NodeKey>;
    fn first_child_key(&self) -> Option<NodeKey>;
    fn last_child_key(&self) -> Option<NodeKey>;
    fn left_sibling_key(&self) -> Option<NodeKey>;
    fn right_sibling_key(&self) -> Option<NodeKey>;

    /// Number of attributes on the current node (zero for non-elements).
    fn attribute_count(&self) -> usize;

    /// Number of namespace declarations on the current node.
    fn namespace_count(&self) -> usize;

    /// Moves to `key`. Returns `false` if the key does not resolve.
    fn move_to(&mut self, key: NodeKey) -> bool;

    /// Moves to the `index`-th attribute of the current element.
    fn move_to_attribute(&mut self, index: usize) -> bool;

    /// Moves to the `index`-th namespace declaration of the current element.
    fn move_to_namespace(&mut self, index: usize) -> bool;

    fn move_to_document_root(&mut self) -> bool {
        self.move_to(NodeKey::DOCUMENT_ROOT)
    }

    fn move_to_parent(&mut self) -> bool {
        self.parent_key().is_some_and(|key| self.move_to(key))
    }

    fn move_to_first_child(&mut self) -> bool {
        self.first_child_key().is_some_and(|key| self.move_to(key))
    }

    fn move_to_last_child(&mut self) -> bool {
        self.last_child_key().is_some_and(|key| self.move_to(key))
    }

    fn move_to_left_sibling(&mut self) -> bool {
        self.left_sibling_key().is_some_and(|key| self.move_to(key))
    }

    fn move_to_right_sibling(&mut self) -> bool {
        self.right_sibling_key().is_some_and(|key| self.move_to(key))
    }
}
