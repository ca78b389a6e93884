//! Attribute and namespace axes. Both address the nodes hanging off an
//! element by index, in their stored order.

use super::{Traversal, move_checked};
use crate::error::AxisError;
use strata_cursor::NodeCursor;
use strata_types::{NodeKey, NodeKind};

/// Empty from any start that is not an element, text nodes included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeTraversal {
    index: usize,
}

impl<C: NodeCursor> Traversal<C> for AttributeTraversal {
    fn restart(&mut self, _start: NodeKey) {
        self.index = 0;
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        move_checked(cursor, start)?;
        if cursor.kind() != NodeKind::Element || self.index >= cursor.attribute_count() {
            return Ok(None);
        }
        if !cursor.move_to_attribute(self.index) {
            return Err(AxisError::integrity(
                start,
                format!("attribute {} does not resolve", self.index),
            ));
        }
        self.index += 1;
        Ok(Some(cursor.node_key()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceTraversal {
    index: usize,
}

impl<C: NodeCursor> Traversal<C> for NamespaceTraversal {
    fn restart(&mut self, _start: NodeKey) {
        self.index = 0;
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        move_checked(cursor, start)?;
        if cursor.kind() != NodeKind::Element || self.index >= cursor.namespace_count() {
            return Ok(None);
        }
        if !cursor.move_to_namespace(self.index) {
            return Err(AxisError::integrity(
                start,
                format!("namespace {} does not resolve", self.index),
            ));
        }
        self.index += 1;
        Ok(Some(cursor.node_key()))
    }
}
