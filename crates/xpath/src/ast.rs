//! The resolved step tree consumed by the compiler.
//!
//! Parsing and abbreviation expansion happen upstream: `//b` arrives here as
//! `descendant-or-self::node()/child::b`, `..` as `parent::node()`, `@x` as
//! `attribute::x`, and so on.

use rust_decimal::Decimal;

/// The top-level expression that can be compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(Decimal),
    LocationPath(LocationPath),
    /// The context item, `.`.
    ContextItem,
    /// A comma-separated sequence; results are concatenated in order.
    Sequence(Vec<Expression>),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
}

impl Expression {
    pub fn literal(value: impl Into<String>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn number(value: impl Into<Decimal>) -> Self {
        Expression::Number(value.into())
    }

    pub fn relative(steps: Vec<Step>) -> Self {
        Expression::LocationPath(LocationPath {
            is_absolute: false,
            steps,
        })
    }

    pub fn absolute(steps: Vec<Step>) -> Self {
        Expression::LocationPath(LocationPath {
            is_absolute: true,
            steps,
        })
    }

    pub fn sequence(items: Vec<Expression>) -> Self {
        Expression::Sequence(items)
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Checks if the expression yields nodes rather than atomic values.
    pub fn is_node_sequence(&self) -> bool {
        match self {
            Expression::LocationPath(_) | Expression::ContextItem => true,
            Expression::Sequence(items) => items.iter().all(Expression::is_node_sequence),
            _ => false,
        }
    }
}

/// A unary operator used in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
}

/// A binary operator used in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Equality
    Equals,
    NotEquals,
    // Relational
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Additive
    Plus,
    Minus,
    // Multiplicative
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    /// The operator with its operands swapped: `a < b` == `b > a`.
    pub fn flipped(self) -> Self {
        match self {
            BinaryOperator::LessThan => BinaryOperator::GreaterThan,
            BinaryOperator::LessThanOrEqual => BinaryOperator::GreaterThanOrEqual,
            BinaryOperator::GreaterThan => BinaryOperator::LessThan,
            BinaryOperator::GreaterThanOrEqual => BinaryOperator::LessThanOrEqual,
            other => other,
        }
    }
}

/// A location path, like `/child::a` or `descendant::b[@x = "y"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// True if the path starts from the document node (e.g., `/a`).
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// A single step in a location path, like `child::b[attribute::x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: AxisKind,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub fn new(axis: AxisKind, node_test: NodeTest) -> Self {
        Self {
            axis,
            node_test,
            predicates: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Expression) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The expansion of the `//` abbreviation.
    pub fn descendant_or_self_node() -> Self {
        Self::new(AxisKind::DescendantOrSelf, NodeTest::node())
    }
}

/// The axis of movement from the context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Namespace,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

impl AxisKind {
    /// True if the axis visits disjoint node sets from distinct start nodes.
    /// Steps on other axes may revisit nodes and need duplicate elimination
    /// once their context holds more than one node.
    pub fn is_disjoint(self) -> bool {
        matches!(
            self,
            AxisKind::Child | AxisKind::Attribute | AxisKind::Namespace | AxisKind::SelfAxis
        )
    }

    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            AxisKind::Parent
                | AxisKind::Ancestor
                | AxisKind::AncestorOrSelf
                | AxisKind::PrecedingSibling
                | AxisKind::Preceding
        )
    }
}

/// A test to apply to nodes on a given axis to see if they should be included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A qualified name test (e.g., `b`, `p:a`).
    Name(NameTest),
    /// A wildcard test (`*`).
    Wildcard,
    /// A node kind test (e.g., `text()`, `node()`).
    NodeType(NodeTypeTest),
}

impl NodeTest {
    pub fn name(local: impl Into<String>) -> Self {
        NodeTest::Name(NameTest {
            prefix: None,
            local: local.into(),
        })
    }

    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        NodeTest::Name(NameTest {
            prefix: Some(prefix.into()),
            local: local.into(),
        })
    }

    pub fn node() -> Self {
        NodeTest::NodeType(NodeTypeTest::Node)
    }

    pub fn text() -> Self {
        NodeTest::NodeType(NodeTypeTest::Text)
    }

    pub fn element() -> Self {
        NodeTest::NodeType(NodeTypeTest::Element)
    }
}

/// A name as written in the query; the prefix is resolved at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTest {
    pub prefix: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Node,
    Element,
    Attribute,
    Namespace,
    Text,
    Comment,
    ProcessingInstruction,
    Document,
}
