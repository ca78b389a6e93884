//! Reverse axes: results come nearest first.

use super::{Traversal, move_checked};
use crate::error::AxisError;
use std::collections::HashSet;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParentTraversal;

impl<C: NodeCursor> Traversal<C> for ParentTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        if previous.is_some() {
            return Ok(None);
        }
        move_checked(cursor, start)?;
        Ok(cursor.parent_key())
    }
}

/// Walks parent links up to, but not including, the document node.
#[derive(Debug, Clone, Copy)]
pub struct AncestorTraversal {
    include_self: bool,
}

impl AncestorTraversal {
    pub fn new(include_self: bool) -> Self {
        Self { include_self }
    }
}

impl<C: NodeCursor> Traversal<C> for AncestorTraversal {
    fn restart(&mut self, _start: NodeKey) {}

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        let from = match previous {
            None if self.include_self => return Ok(Some(start)),
            None => start,
            Some(prev) => prev,
        };
        move_checked(cursor, from)?;
        Ok(cursor
            .parent_key()
            .filter(|parent| !parent.is_document_root()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedingSiblingTraversal;

impl<C: NodeCursor> Traversal<C> for PrecedingSiblingTraversal {
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
        Ok(cursor.left_sibling_key())
    }
}

/// Everything before the start node in reverse document order, minus its
/// ancestors. The ancestor keys of the start node are the only state kept.
#[derive(Debug, Clone, Default)]
pub struct PrecedingTraversal {
    ancestors: HashSet<NodeKey>,
}

impl PrecedingTraversal {
    fn collect_ancestors<C: NodeCursor>(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
    ) -> Result<(), AxisError> {
        self.ancestors.clear();
        move_checked(cursor, start)?;
        while let Some(parent) = cursor.parent_key() {
            self.ancestors.insert(parent);
            move_checked(cursor, parent)?;
        }
        Ok(())
    }

    /// The node just before `from` in document order, skipping ancestors.
    fn step_back<C: NodeCursor>(
        &self,
        cursor: &mut C,
        mut from: NodeKey,
    ) -> Result<Option<NodeKey>, AxisError> {
        loop {
            move_checked(cursor, from)?;
            if let Some(sibling) = cursor.left_sibling_key() {
                move_checked(cursor, sibling)?;
                while let Some(last) = cursor.last_child_key() {
                    move_checked(cursor, last)?;
                }
                return Ok(Some(cursor.node_key()));
            }
            match cursor.parent_key() {
                None => return Ok(None),
                Some(parent) if self.ancestors.contains(&parent) => from = parent,
                Some(parent) => return Ok(Some(parent)),
            }
        }
    }
}

impl<C: NodeCursor> Traversal<C> for PrecedingTraversal {
    fn restart(&mut self, _start: NodeKey) {
        self.ancestors.clear();
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        match previous {
            None => {
                self.collect_ancestors(cursor, start)?;
                move_checked(cursor, start)?;
                let from = if cursor.kind().is_attached() {
                    match cursor.parent_key() {
                        Some(owner) => owner,
                        None => return Ok(None),
                    }
                } else {
                    start
                };
                self.step_back(cursor, from)
            }
            Some(prev) => self.step_back(cursor, prev),
        }
    }
}
