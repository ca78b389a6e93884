//! Forward axes: results come in document order.

use super::{Traversal, move_checked};
use crate::error::AxisError;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChildTraversal;

impl<C: NodeCursor> Traversal<C> for ChildTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        match previous {
            None => {
                move_checked(cursor, start)?;
                Ok(cursor.first_child_key())
            }
            Some(prev) => {
                move_checked(cursor, prev)?;
                Ok(cursor.right_sibling_key())
            }
        }
    }
}

/// Pre-order walk of the subtree under the start node. Keeps no state
/// beyond the previous key: the way back up is found through parent links.
#[derive(Debug, Clone, Copy)]
pub struct DescendantTraversal {
    include_self: bool,
}

impl DescendantTraversal {
    pub fn new(include_self: bool) -> Self {
        Self { include_self }
    }
}

impl<C: NodeCursor> Traversal<C> for DescendantTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        let prev = match previous {
            None if self.include_self => return Ok(Some(start)),
            None => {
                move_checked(cursor, start)?;
                return Ok(cursor.first_child_key());
            }
            Some(prev) => prev,
        };

        move_checked(cursor, prev)?;
        if let Some(child) = cursor.first_child_key() {
            return Ok(Some(child));
        }
        let mut current = prev;
        loop {
            if current == start {
                return Ok(None);
            }
            if let Some(sibling) = cursor.right_sibling_key() {
                return Ok(Some(sibling));
            }
            match cursor.parent_key() {
                Some(parent) => {
                    move_checked(cursor, parent)?;
                    current = parent;
                }
                None => return Ok(None),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelfTraversal;

impl<C: NodeCursor> Traversal<C> for SelfTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        _cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        Ok(previous.is_none().then_some(start))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRootTraversal;

impl<C: NodeCursor> Traversal<C> for DocumentRootTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        _cursor: &mut C,
        _start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        Ok(previous.is_none().then_some(NodeKey::DOCUMENT_ROOT))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FollowingSiblingTraversal;

impl<C: NodeCursor> Traversal<C> for FollowingSiblingTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        move_checked(cursor, previous.unwrap_or(start))?;
        if cursor.kind().is_attached() {
            return Ok(None);
        }
        Ok(cursor.right_sibling_key())
    }
}

/// Everything after the start node in document order, minus its
/// descendants. For an attribute or namespace start, the owning element's
/// content counts as following.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowingTraversal;

impl FollowingTraversal {
    /// Nearest right sibling of the cursor's node or of one of its ancestors.
    fn climb<C: NodeCursor>(cursor: &mut C) -> Result<Option<NodeKey>, AxisError> {
        loop {
            if let Some(sibling) = cursor.right_sibling_key() {
                return Ok(Some(sibling));
            }
            match cursor.parent_key() {
                Some(parent) => move_checked(cursor, parent)?,
                None => return Ok(None),
            }
        }
    }
}

impl<C: NodeCursor> Traversal<C> for FollowingTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        match previous {
            None => {
                move_checked(cursor, start)?;
                if cursor.kind().is_attached() {
                    let Some(owner) = cursor.parent_key() else {
                        return Ok(None);
                    };
                    move_checked(cursor, owner)?;
                    if let Some(child) = cursor.first_child_key() {
                        return Ok(Some(child));
                    }
                }
                Self::climb(cursor)
            }
            Some(prev) => {
                move_checked(cursor, prev)?;
                if let Some(child) = cursor.first_child_key() {
                    return Ok(Some(child));
                }
                Self::climb(cursor)
            }
        }
    }
}
