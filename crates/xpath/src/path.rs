//! Path composition (`A/B`) and duplicate elimination.

use crate::axis::{BoxedAxis, Traversal, TraversalAxis};
use crate::error::AxisError;
use std::collections::HashSet;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

/// For each key of `outer`, resets `inner` to it and yields all of its keys.
pub struct NestedTraversal<C: NodeCursor> {
    outer: BoxedAxis<C>,
    inner: BoxedAxis<C>,
    inner_active: bool,
}

impl<C: NodeCursor> NestedTraversal<C> {
    pub fn new(outer: BoxedAxis<C>, inner: BoxedAxis<C>) -> Self {
        Self {
            outer,
            inner,
            inner_active: false,
        }
    }
}

impl<C: NodeCursor> Traversal<C> for NestedTraversal<C> {
    fn restart(&mut self, start: NodeKey) {
        self.outer.reset(start);
        self.inner_active = false;
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        _start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        loop {
            if self.inner_active {
                if self.inner.has_next(cursor)? {
                    return self.inner.next(cursor).map(Some);
                }
                self.inner_active = false;
            }
            if !self.outer.has_next(cursor)? {
                return Ok(None);
            }
            let context = self.outer.next(cursor)?;
            self.inner.reset(context);
            self.inner_active = true;
        }
    }
}

/// Passes each key through once per run; later repeats are dropped.
pub struct DupFilterTraversal<C: NodeCursor> {
    inner: BoxedAxis<C>,
    seen: HashSet<NodeKey>,
}

impl<C: NodeCursor> DupFilterTraversal<C> {
    pub fn new(inner: BoxedAxis<C>) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
        }
    }
}

impl<C: NodeCursor> Traversal<C> for DupFilterTraversal<C> {
    fn restart(&mut self, start: NodeKey) {
        self.seen.clear();
        self.inner.reset(start);
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        _start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        while self.inner.has_next(cursor)? {
            let key = self.inner.next(cursor)?;
            if self.seen.insert(key) {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}

pub fn path_axis<C: NodeCursor>(outer: BoxedAxis<C>, inner: BoxedAxis<C>) -> BoxedAxis<C> {
    Box::new(TraversalAxis::new(NestedTraversal::new(outer, inner)))
}

pub fn dedup_axis<C: NodeCursor>(inner: BoxedAxis<C>) -> BoxedAxis<C> {
    Box::new(TraversalAxis::new(DupFilterTraversal::new(inner)))
}
