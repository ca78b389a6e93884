//! Predicate evaluation: compiled expression operands, XPath 1.0 value
//! conversions and existential comparisons.

use crate::ast::BinaryOperator;
use crate::axis::{BoxedAxis, move_checked};
use crate::error::AxisError;
use crate::filter::Filter;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

/// The result of evaluating an operand against a context node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The string values of the selected nodes, in axis order.
    Nodes(Vec<String>),
    String(String),
    /// `None` stands for NaN.
    Number(Option<Decimal>),
    Boolean(bool),
}

impl Value {
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.is_some_and(|d| !d.is_zero()),
            Value::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> Option<Decimal> {
        match self {
            Value::Nodes(nodes) => nodes.first().and_then(|s| parse_number(s)),
            Value::String(s) => parse_number(s),
            Value::Number(n) => *n,
            Value::Boolean(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::Nodes(nodes) => nodes.first().cloned().unwrap_or_default(),
            Value::String(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

/// XPath number syntax: optional minus, digits with an optional fraction.
/// Anything else, including the empty string, is NaN.
pub fn parse_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !valid {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

fn format_number(n: Option<Decimal>) -> String {
    match n {
        Some(d) => d.normalize().to_string(),
        None => "NaN".to_string(),
    }
}

/// The functions a predicate may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Not,
    True,
    False,
    Boolean,
    Count,
    String,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "not" => Some(Builtin::Not),
            "true" => Some(Builtin::True),
            "false" => Some(Builtin::False),
            "boolean" => Some(Builtin::Boolean),
            "count" => Some(Builtin::Count),
            "string" => Some(Builtin::String),
            _ => None,
        }
    }

    pub fn accepts_arity(self, arity: usize) -> bool {
        match self {
            Builtin::True | Builtin::False => arity == 0,
            Builtin::Not | Builtin::Boolean | Builtin::Count => arity == 1,
            Builtin::String => arity <= 1,
        }
    }
}

/// A compiled expression, ready to run against any context node.
pub enum Operand<C: NodeCursor> {
    Literal(String),
    Number(Option<Decimal>),
    /// A node-selecting expression, reset to the context node on each use.
    Path(BoxedAxis<C>),
    Binary {
        left: Box<Operand<C>>,
        op: BinaryOperator,
        right: Box<Operand<C>>,
    },
    Negate(Box<Operand<C>>),
    Call {
        function: Builtin,
        args: Vec<Operand<C>>,
    },
}

impl<C: NodeCursor> Operand<C> {
    pub fn binary(left: Operand<C>, op: BinaryOperator, right: Operand<C>) -> Self {
        Operand::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Evaluates the operand with `context` as the context node. The cursor
    /// may be anywhere afterwards.
    pub fn evaluate(&mut self, cursor: &mut C, context: NodeKey) -> Result<Value, AxisError> {
        match self {
            Operand::Literal(s) => Ok(Value::String(s.clone())),
            Operand::Number(n) => Ok(Value::Number(*n)),
            Operand::Path(axis) => {
                axis.reset(context);
                let mut values = Vec::new();
                while axis.has_next(cursor)? {
                    axis.next(cursor)?;
                    values.push(cursor.string_value());
                }
                Ok(Value::Nodes(values))
            }
            Operand::Binary { left, op, right } => match op {
                BinaryOperator::And => Ok(Value::Boolean(
                    left.boolean(cursor, context)? && right.boolean(cursor, context)?,
                )),
                BinaryOperator::Or => Ok(Value::Boolean(
                    left.boolean(cursor, context)? || right.boolean(cursor, context)?,
                )),
                op if op.is_comparison() => {
                    let l = left.evaluate(cursor, context)?;
                    let r = right.evaluate(cursor, context)?;
                    Ok(Value::Boolean(compare(&l, *op, &r)))
                }
                op => {
                    let l = left.evaluate(cursor, context)?.to_number();
                    let r = right.evaluate(cursor, context)?.to_number();
                    Ok(Value::Number(arithmetic(l, *op, r)))
                }
            },
            Operand::Negate(inner) => {
                let n = inner.evaluate(cursor, context)?.to_number();
                Ok(Value::Number(n.map(|d| -d)))
            }
            Operand::Call { function, args } => call(*function, args, cursor, context),
        }
    }

    /// The effective boolean value. Paths stop at their first key.
    pub fn boolean(&mut self, cursor: &mut C, context: NodeKey) -> Result<bool, AxisError> {
        match self {
            Operand::Path(axis) => {
                axis.reset(context);
                axis.has_next(cursor)
            }
            other => Ok(other.evaluate(cursor, context)?.to_boolean()),
        }
    }
}

fn call<C: NodeCursor>(
    function: Builtin,
    args: &mut [Operand<C>],
    cursor: &mut C,
    context: NodeKey,
) -> Result<Value, AxisError> {
    if !function.accepts_arity(args.len()) {
        return Err(AxisError::invalid_step(format!(
            "{:?}() does not take {} arguments",
            function,
            args.len()
        )));
    }
    match (function, args) {
        (Builtin::True, _) => Ok(Value::Boolean(true)),
        (Builtin::False, _) => Ok(Value::Boolean(false)),
        (Builtin::Not, [arg]) => Ok(Value::Boolean(!arg.boolean(cursor, context)?)),
        (Builtin::Boolean, [arg]) => Ok(Value::Boolean(arg.boolean(cursor, context)?)),
        (Builtin::Count, [arg]) => match arg.evaluate(cursor, context)? {
            Value::Nodes(nodes) => Ok(Value::Number(Some(Decimal::from(nodes.len())))),
            _ => Err(AxisError::invalid_step("count() expects a node sequence")),
        },
        (Builtin::String, []) => {
            move_checked(cursor, context)?;
            Ok(Value::String(cursor.string_value()))
        }
        (Builtin::String, [arg]) => Ok(Value::String(arg.evaluate(cursor, context)?.to_string_value())),
        (function, args) => Err(AxisError::invalid_step(format!(
            "{:?}() does not take {} arguments",
            function,
            args.len()
        ))),
    }
}

/// `None` (NaN) for division by zero and overflow.
fn arithmetic(l: Option<Decimal>, op: BinaryOperator, r: Option<Decimal>) -> Option<Decimal> {
    let (l, r) = (l?, r?);
    match op {
        BinaryOperator::Plus => l.checked_add(r),
        BinaryOperator::Minus => l.checked_sub(r),
        BinaryOperator::Multiply => l.checked_mul(r),
        BinaryOperator::Divide => l.checked_div(r),
        BinaryOperator::Modulo => l.checked_rem(r),
        _ => None,
    }
}

/// XPath 1.0 general comparison. A node sequence compares true if any of
/// its members does.
pub fn compare(left: &Value, op: BinaryOperator, right: &Value) -> bool {
    match (left, right) {
        (Value::Nodes(l), Value::Nodes(r)) => l.iter().any(|a| {
            r.iter()
                .any(|b| compare_atomic(&Value::String(a.clone()), op, &Value::String(b.clone())))
        }),
        (Value::Nodes(_), Value::Boolean(_)) | (Value::Boolean(_), Value::Nodes(_)) => {
            compare_atomic(
                &Value::Boolean(left.to_boolean()),
                op,
                &Value::Boolean(right.to_boolean()),
            )
        }
        (Value::Nodes(nodes), atomic) => nodes
            .iter()
            .any(|s| compare_atomic(&Value::String(s.clone()), op, atomic)),
        (atomic, Value::Nodes(nodes)) => nodes
            .iter()
            .any(|s| compare_atomic(atomic, op, &Value::String(s.clone()))),
        (l, r) => compare_atomic(l, op, r),
    }
}

fn compare_atomic(left: &Value, op: BinaryOperator, right: &Value) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                    left.to_boolean() == right.to_boolean()
                }
                (Value::Number(_), _) | (_, Value::Number(_)) => {
                    match (left.to_number(), right.to_number()) {
                        (Some(l), Some(r)) => l == r,
                        // NaN equals nothing.
                        _ => return op == BinaryOperator::NotEquals,
                    }
                }
                _ => left.to_string_value() == right.to_string_value(),
            };
            equal == (op == BinaryOperator::Equals)
        }
        _ => {
            let (Some(l), Some(r)) = (left.to_number(), right.to_number()) else {
                return false;
            };
            let ordering = l.cmp(&r);
            match op {
                BinaryOperator::LessThan => ordering == Ordering::Less,
                BinaryOperator::LessThanOrEqual => ordering != Ordering::Greater,
                BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                BinaryOperator::GreaterThanOrEqual => ordering != Ordering::Less,
                _ => false,
            }
        }
    }
}

/// A predicate in filter position: keeps a candidate if the expression's
/// effective boolean value is true for it.
pub struct PredicateFilter<C: NodeCursor> {
    expression: Operand<C>,
}

impl<C: NodeCursor> PredicateFilter<C> {
    pub fn new(expression: Operand<C>) -> Self {
        Self { expression }
    }
}

impl<C: NodeCursor> Filter<C> for PredicateFilter<C> {
    fn filter(&mut self, cursor: &mut C) -> Result<bool, AxisError> {
        let context = cursor.node_key();
        let value = if matches!(self.expression, Operand::Path(_)) {
            Value::Boolean(self.expression.boolean(cursor, context)?)
        } else {
            self.expression.evaluate(cursor, context)?
        };
        move_checked(cursor, context)?;
        if let Value::Number(_) = value {
            return Err(AxisError::invalid_step(
                "positional predicates are not supported",
            ));
        }
        Ok(value.to_boolean())
    }
}
