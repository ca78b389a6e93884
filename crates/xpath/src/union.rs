//! The sequence (`,`) axis: operands concatenated left to right.

use crate::axis::{BoxedAxis, Traversal, TraversalAxis};
use crate::error::AxisError;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

/// Yields every key of each operand in turn. Keys produced by several
/// operands appear once per operand.
pub struct SequenceTraversal<C: NodeCursor> {
    operands: Vec<BoxedAxis<C>>,
    current: usize,
}

impl<C: NodeCursor> SequenceTraversal<C> {
    pub fn new(operands: Vec<BoxedAxis<C>>) -> Self {
        Self {
            operands,
            current: 0,
        }
    }
}

impl<C: NodeCursor> Traversal<C> for SequenceTraversal<C> {
    fn restart(&mut self, start: NodeKey) {
        for operand in &mut self.operands {
            operand.reset(start);
        }
        self.current = 0;
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        _start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        while let Some(operand) = self.operands.get_mut(self.current) {
            if operand.has_next(cursor)? {
                return operand.next(cursor).map(Some);
            }
            self.current += 1;
        }
        Ok(None)
    }
}

pub fn sequence_axis<C: NodeCursor>(operands: Vec<BoxedAxis<C>>) -> BoxedAxis<C> {
    Box::new(TraversalAxis::new(SequenceTraversal::new(operands)))
}
