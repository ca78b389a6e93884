//! The axis contract and the lazy state machine shared by every axis.
//!
//! An axis is a pull-based sequence of node keys relative to a start key.
//! Every axis in the composition tree (concrete steps, filters, paths,
//! sequences, concurrent wrappers) is driven through the same `Axis` trait,
//! so they nest arbitrarily as `BoxedAxis` trait objects.
//!
//! Axes do not own the cursor they move. The caller passes its cursor into
//! `has_next`/`next`, which lets a whole composition tree share one cursor
//! without interior mutability, and lets a concurrent axis run against a
//! cursor it owns outright.

mod attached;
mod forward;
mod reverse;

pub use attached::{AttributeTraversal, NamespaceTraversal};
pub use forward::{
    ChildTraversal, DescendantTraversal, DocumentRootTraversal, FollowingSiblingTraversal,
    FollowingTraversal, SelfTraversal,
};
pub use reverse::{
    AncestorTraversal, ParentTraversal, PrecedingSiblingTraversal, PrecedingTraversal,
};

use crate::ast::AxisKind;
use crate::error::AxisError;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

/// The universal contract for a lazily evaluated axis.
pub trait Axis<C: NodeCursor>: Send {
    /// Restarts the axis from `key`, clearing any exhaustion.
    fn reset(&mut self, key: NodeKey);

    /// The key of the most recent `reset`.
    fn start_key(&self) -> NodeKey;

    /// Whether another key follows. Idempotent until the next `next()`.
    /// Once it returns `false` the cursor has been moved back to the start
    /// key and the axis stays exhausted until `reset`.
    fn has_next(&mut self, cursor: &mut C) -> Result<bool, AxisError>;

    /// Returns the next key and leaves the cursor positioned on it.
    /// Fails with `ExhaustedAxis` if `has_next` would return `false`.
    fn next(&mut self, cursor: &mut C) -> Result<NodeKey, AxisError>;
}

pub type BoxedAxis<C> = Box<dyn Axis<C>>;

impl<C: NodeCursor, A: Axis<C> + ?Sized> Axis<C> for Box<A> {
    fn reset(&mut self, key: NodeKey) {
        (**self).reset(key)
    }

    fn start_key(&self) -> NodeKey {
        (**self).start_key()
    }

    fn has_next(&mut self, cursor: &mut C) -> Result<bool, AxisError> {
        (**self).has_next(cursor)
    }

    fn next(&mut self, cursor: &mut C) -> Result<NodeKey, AxisError> {
        (**self).next(cursor)
    }
}

/// The part of an axis that differs between kinds: finding the key that
/// follows `previous` (or the first key when `previous` is `None`).
///
/// `advance` may move the cursor freely; it must not rely on the cursor
/// still being where it left it, since nested axes share the cursor.
pub trait Traversal<C: NodeCursor>: Send {
    /// Clears per-run state. Called on every `reset`.
    fn restart(&mut self, start: NodeKey);

    fn advance(
        &mut self,
        cursor: &mut C,
        start: NodeKey,
        previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError>;
}

/// Drives a `Traversal` through the `Axis` contract: lookahead buffering,
/// idempotent `has_next`, permanent exhaustion and cursor restoration.
#[derive(Debug)]
pub struct TraversalAxis<T> {
    start: NodeKey,
    last: Option<NodeKey>,
    pending: Option<NodeKey>,
    exhausted: bool,
    traversal: T,
}

impl<T> TraversalAxis<T> {
    pub fn new(traversal: T) -> Self {
        Self {
            start: NodeKey::DOCUMENT_ROOT,
            last: None,
            pending: None,
            exhausted: false,
            traversal,
        }
    }

    pub fn traversal(&self) -> &T {
        &self.traversal
    }
}

impl<C: NodeCursor, T: Traversal<C>> Axis<C> for TraversalAxis<T> {
    fn reset(&mut self, key: NodeKey) {
        self.start = key;
        self.last = None;
        self.pending = None;
        self.exhausted = false;
        self.traversal.restart(key);
    }

    fn start_key(&self) -> NodeKey {
        self.start
    }

    fn has_next(&mut self, cursor: &mut C) -> Result<bool, AxisError> {
        if self.pending.is_some() {
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }
        match self.traversal.advance(cursor, self.start, self.last)? {
            Some(key) => {
                self.pending = Some(key);
                self.last = Some(key);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                move_checked(cursor, self.start)?;
                Ok(false)
            }
        }
    }

    fn next(&mut self, cursor: &mut C) -> Result<NodeKey, AxisError> {
        if !self.has_next(cursor)? {
            return Err(AxisError::ExhaustedAxis);
        }
        let key = self.pending.take().ok_or(AxisError::ExhaustedAxis)?;
        move_checked(cursor, key)?;
        Ok(key)
    }
}

/// Creates the plain axis for `kind`, without any node test.
pub fn step_axis<C: NodeCursor>(kind: AxisKind) -> BoxedAxis<C> {
    match kind {
        AxisKind::Child => Box::new(TraversalAxis::new(ChildTraversal)),
        AxisKind::Descendant => Box::new(TraversalAxis::new(DescendantTraversal::new(false))),
        AxisKind::DescendantOrSelf => {
            Box::new(TraversalAxis::new(DescendantTraversal::new(true)))
        }
        AxisKind::Attribute => Box::new(TraversalAxis::new(AttributeTraversal::default())),
        AxisKind::Namespace => Box::new(TraversalAxis::new(NamespaceTraversal::default())),
        AxisKind::Parent => Box::new(TraversalAxis::new(ParentTraversal)),
        AxisKind::Ancestor => Box::new(TraversalAxis::new(AncestorTraversal::new(false))),
        AxisKind::AncestorOrSelf => Box::new(TraversalAxis::new(AncestorTraversal::new(true))),
        AxisKind::SelfAxis => Box::new(TraversalAxis::new(SelfTraversal)),
        AxisKind::FollowingSibling => Box::new(TraversalAxis::new(FollowingSiblingTraversal)),
        AxisKind::PrecedingSibling => Box::new(TraversalAxis::new(PrecedingSiblingTraversal)),
        AxisKind::Following => Box::new(TraversalAxis::new(FollowingTraversal)),
        AxisKind::Preceding => Box::new(TraversalAxis::new(PrecedingTraversal::default())),
    }
}

/// The axis that yields the document node once, whatever the start key.
/// Absolute paths begin with it.
pub fn document_root_axis<C: NodeCursor>() -> BoxedAxis<C> {
    Box::new(TraversalAxis::new(DocumentRootTraversal))
}

/// Moves `cursor` to `key` unless it is already there.
pub(crate) fn move_checked<C: NodeCursor>(cursor: &mut C, key: NodeKey) -> Result<(), AxisError> {
    if cursor.node_key() == key || cursor.move_to(key) {
        Ok(())
    } else {
        Err(AxisError::integrity(
            key,
            format!(
                "key does not resolve in snapshot revision {}",
                cursor.revision()
            ),
        ))
    }
}

/// Adapts an axis and a cursor into a standard iterator. Stops after the
/// first error.
pub struct Keys<'a, C: NodeCursor, A: Axis<C> + ?Sized> {
    axis: &'a mut A,
    cursor: &'a mut C,
    failed: bool,
}

impl<C: NodeCursor, A: Axis<C> + ?Sized> Iterator for Keys<'_, C, A> {
    type Item = Result<NodeKey, AxisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = pull(&mut *self.axis, &mut *self.cursor).transpose()?;
        self.failed = result.is_err();
        Some(result)
    }
}

/// One step of the has_next/next protocol: `Ok(None)` once the axis is
/// exhausted.
pub fn pull<C: NodeCursor, A: Axis<C> + ?Sized>(
    axis: &mut A,
    cursor: &mut C,
) -> Result<Option<NodeKey>, AxisError> {
    if axis.has_next(cursor)? {
        axis.next(cursor).map(Some)
    } else {
        Ok(None)
    }
}

/// Iterates the remaining keys of `axis` without resetting it.
pub fn keys<'a, C: NodeCursor, A: Axis<C> + ?Sized>(
    axis: &'a mut A,
    cursor: &'a mut C,
) -> Keys<'a, C, A> {
    Keys {
        axis,
        cursor,
        failed: false,
    }
}

/// Resets `axis` to `start` and drains it.
pub fn collect_keys<C: NodeCursor, A: Axis<C> + ?Sized>(
    axis: &mut A,
    cursor: &mut C,
    start: NodeKey,
) -> Result<Vec<NodeKey>, AxisError> {
    axis.reset(start);
    keys(axis, cursor).collect()
}
