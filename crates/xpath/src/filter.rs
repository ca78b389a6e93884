//! Filters: boolean tests on the cursor's current node, and the axis that
//! drops the keys its filters reject.

use crate::ast::NodeTypeTest;
use crate::axis::{BoxedAxis, Traversal, TraversalAxis};
use crate::error::AxisError;
use strata_cursor::NodeCursor;
use strata_types::{NodeKey, NodeKind};

/// A test on the node the cursor currently addresses.
///
/// A filter may move the cursor while it decides, but must leave it on the
/// node it was called on.
pub trait Filter<C: NodeCursor>: Send {
    fn filter(&mut self, cursor: &mut C) -> Result<bool, AxisError>;
}

pub type BoxedFilter<C> = Box<dyn Filter<C>>;

/// Matches nodes by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter {
    test: NodeTypeTest,
}

impl KindFilter {
    pub fn new(test: NodeTypeTest) -> Self {
        Self { test }
    }

    /// Matches exactly one kind; used as the principal-kind test of the
    /// attribute and namespace axes.
    pub fn principal(kind: NodeKind) -> Self {
        let test = match kind {
            NodeKind::Document => NodeTypeTest::Document,
            NodeKind::Element => NodeTypeTest::Element,
            NodeKind::Attribute => NodeTypeTest::Attribute,
            NodeKind::Namespace => NodeTypeTest::Namespace,
            NodeKind::Text => NodeTypeTest::Text,
            NodeKind::Comment => NodeTypeTest::Comment,
            NodeKind::ProcessingInstruction => NodeTypeTest::ProcessingInstruction,
        };
        Self { test }
    }

    pub fn matches(&self, kind: NodeKind) -> bool {
        match self.test {
            // Attributes and namespaces are not part of the node tree proper.
            NodeTypeTest::Node => !kind.is_attached(),
            NodeTypeTest::Element => kind == NodeKind::Element,
            NodeTypeTest::Attribute => kind == NodeKind::Attribute,
            NodeTypeTest::Namespace => kind == NodeKind::Namespace,
            NodeTypeTest::Text => kind == NodeKind::Text,
            NodeTypeTest::Comment => kind == NodeKind::Comment,
            NodeTypeTest::ProcessingInstruction => kind == NodeKind::ProcessingInstruction,
            NodeTypeTest::Document => kind == NodeKind::Document,
        }
    }
}

impl<C: NodeCursor> Filter<C> for KindFilter {
    fn filter(&mut self, cursor: &mut C) -> Result<bool, AxisError> {
        Ok(self.matches(cursor.kind()))
    }
}

/// How a name test constrains the namespace part of a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceMatch {
    /// `*`: any namespace.
    Any,
    /// A prefix resolved through the static context.
    Uri(String),
    /// A prefix the static context does not know; compared with the
    /// node's own prefix.
    LiteralPrefix(String),
    /// An unprefixed name test: the node must not be in a namespace.
    NoNamespace,
}

/// Matches the principal node kind of an axis plus an optional name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    principal: NodeKind,
    local: Option<String>,
    namespace: NamespaceMatch,
}

impl NameFilter {
    pub fn new(principal: NodeKind, local: impl Into<String>, namespace: NamespaceMatch) -> Self {
        Self {
            principal,
            local: Some(local.into()),
            namespace,
        }
    }

    /// The `*` test: every node of the principal kind.
    pub fn wildcard(principal: NodeKind) -> Self {
        Self {
            principal,
            local: None,
            namespace: NamespaceMatch::Any,
        }
    }

    fn matches<C: NodeCursor>(&self, cursor: &C) -> bool {
        if cursor.kind() != self.principal {
            return false;
        }
        let Some(name) = cursor.name() else {
            return false;
        };
        if self
            .local
            .as_deref()
            .is_some_and(|local| name.local_part() != local)
        {
            return false;
        }
        match &self.namespace {
            NamespaceMatch::Any => true,
            NamespaceMatch::Uri(uri) => name.namespace() == Some(uri.as_str()),
            NamespaceMatch::LiteralPrefix(prefix) => name.prefix() == Some(prefix.as_str()),
            NamespaceMatch::NoNamespace => name.namespace().is_none(),
        }
    }
}

impl<C: NodeCursor> Filter<C> for NameFilter {
    fn filter(&mut self, cursor: &mut C) -> Result<bool, AxisError> {
        Ok(self.matches(cursor))
    }
}

/// Yields the keys of `inner` that pass every filter, in order.
pub struct FilterTraversal<C: NodeCursor> {
    inner: BoxedAxis<C>,
    filters: Vec<BoxedFilter<C>>,
}

impl<C: NodeCursor> FilterTraversal<C> {
    pub fn new(inner: BoxedAxis<C>, filters: Vec<BoxedFilter<C>>) -> Self {
        Self { inner, filters }
    }
}

impl<C: NodeCursor> Traversal<C> for FilterTraversal<C> {
    fn restart(&mut self, start: NodeKey) {
        self.inner.reset(start);
    }

    fn advance(
        &mut self,
        cursor: &mut C,
        _start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        'candidates: while self.inner.has_next(cursor)? {
            let key = self.inner.next(cursor)?;
            for filter in &mut self.filters {
                if !filter.filter(cursor)? {
                    continue 'candidates;
                }
            }
            return Ok(Some(key));
        }
        Ok(None)
    }
}

/// Wraps `inner` so that only keys accepted by all `filters` come through.
/// Without filters the inner axis is returned unchanged.
pub fn filter_axis<C: NodeCursor>(inner: BoxedAxis<C>, filters: Vec<BoxedFilter<C>>) -> BoxedAxis<C> {
    if filters.is_empty() {
        return inner;
    }
    Box::new(TraversalAxis::new(FilterTraversal::new(inner, filters)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AxisKind;
    use crate::axis::{collect_keys, step_axis};
    use crate::testing::assert_filter_conventions;
    use strata_cursor::tests::{TEST_NAMESPACE, create_test_document};

    fn raw(keys: Vec<NodeKey>) -> Vec<u64> {
        keys.into_iter().map(NodeKey::get).collect()
    }

    #[test]
    fn test_node_filter_conventions() {
        let snapshot = create_test_document();
        let mut cursor = snapshot.cursor();
        let node = KindFilter::new(NodeTypeTest::Node);

        assert_filter_conventions(&mut node.clone(), &mut cursor, NodeKey::new(9), true);
        assert_filter_conventions(&mut node.clone(), &mut cursor, NodeKey::new(4), true);
        assert_filter_conventions(&mut node.clone(), &mut cursor, NodeKey::new(3), false);
    }

    #[test]
    fn test_kind_filters() {
        let snapshot = create_test_document();
        let mut cursor = snapshot.cursor();

        let mut text = KindFilter::new(NodeTypeTest::Text);
        assert_filter_conventions(&mut text, &mut cursor, NodeKey::new(12), true);
        assert_filter_conventions(&mut text, &mut cursor, NodeKey::new(11), false);

        let mut document = KindFilter::new(NodeTypeTest::Document);
        assert_filter_conventions(&mut document, &mut cursor, NodeKey::DOCUMENT_ROOT, true);

        let mut attribute = KindFilter::principal(NodeKind::Attribute);
        assert_filter_conventions(&mut attribute, &mut cursor, NodeKey::new(10), true);
        assert_filter_conventions(&mut attribute, &mut cursor, NodeKey::new(2), false);
    }

    #[test]
    fn test_name_filters() {
        let snapshot = create_test_document();
        let mut cursor = snapshot.cursor();

        let mut b = NameFilter::new(NodeKind::Element, "b", NamespaceMatch::NoNamespace);
        assert_filter_conventions(&mut b, &mut cursor, NodeKey::new(5), true);
        assert_filter_conventions(&mut b, &mut cursor, NodeKey::new(7), false);

        let mut by_uri = NameFilter::new(
            NodeKind::Element,
            "a",
            NamespaceMatch::Uri(TEST_NAMESPACE.to_string()),
        );
        assert_filter_conventions(&mut by_uri, &mut cursor, NodeKey::new(1), true);

        let mut by_prefix =
            NameFilter::new(NodeKind::Element, "a", NamespaceMatch::LiteralPrefix("p".into()));
        assert_filter_conventions(&mut by_prefix, &mut cursor, NodeKey::new(1), true);

        let mut wrong_prefix =
            NameFilter::new(NodeKind::Element, "a", NamespaceMatch::LiteralPrefix("text".into()));
        assert_filter_conventions(&mut wrong_prefix, &mut cursor, NodeKey::new(1), false);

        // The element filter never accepts an attribute of the same name.
        let mut x_element = NameFilter::new(NodeKind::Element, "x", NamespaceMatch::Any);
        assert_filter_conventions(&mut x_element, &mut cursor, NodeKey::new(10), false);
        let mut x_attribute = NameFilter::new(NodeKind::Attribute, "x", NamespaceMatch::Any);
        assert_filter_conventions(&mut x_attribute, &mut cursor, NodeKey::new(10), true);
    }

    #[test]
    fn test_filter_axis_skips_rejected_keys() {
        let snapshot = create_test_document();
        let mut cursor = snapshot.cursor();
        let mut axis = filter_axis(
            step_axis(AxisKind::Child),
            vec![Box::new(NameFilter::wildcard(NodeKind::Element))],
        );
        assert_eq!(
            raw(collect_keys(&mut axis, &mut cursor, NodeKey::new(1)).unwrap()),
            vec![5, 9]
        );
        assert_eq!(cursor.node_key(), NodeKey::new(1));
    }

    #[test]
    fn test_filters_combine_by_and() {
        let snapshot = create_test_document();
        let mut cursor = snapshot.cursor();
        let mut axis = filter_axis(
            step_axis(AxisKind::Descendant),
            vec![
                Box::new(KindFilter::new(NodeTypeTest::Node)),
                Box::new(NameFilter::new(NodeKind::Element, "c", NamespaceMatch::NoNamespace)),
            ],
        );
        assert_eq!(
            raw(collect_keys(&mut axis, &mut cursor, NodeKey::DOCUMENT_ROOT).unwrap()),
            vec![7, 11]
        );
    }
}
