//! Turns a resolved expression tree into a composition of axes.
//!
//! - A location path becomes a left-nested chain of path axes, starting at
//!   the document root for absolute paths.
//! - Each step is its plain axis wrapped in a filter axis carrying the node
//!   test and the predicates.
//! - Duplicate elimination is added right after every step, other than the
//!   first, whose axis may reach the same node from two context nodes.
//! - A sequence becomes a union axis. With concurrency enabled its operands,
//!   and optionally the context-producing prefixes of paths, run on workers.

use crate::ast::{
    AxisKind, Expression, LocationPath, NodeTest, NodeTypeTest, Step, UnaryOperator,
};
use crate::axis::{BoxedAxis, document_root_axis, step_axis};
use crate::concurrent::{WorkerLimiter, concurrent_axis};
use crate::config::ConcurrencyConfig;
use crate::context::StaticContext;
use crate::error::AxisError;
use crate::filter::{BoxedFilter, KindFilter, NameFilter, NamespaceMatch, filter_axis};
use crate::path::{dedup_axis, path_axis};
use crate::predicate::{Builtin, Operand, PredicateFilter};
use crate::union::sequence_axis;
use log::debug;
use strata_cursor::NodeCursor;
use strata_types::NodeKind;

pub struct Compiler<'a, C: NodeCursor> {
    cursor: &'a C,
    context: &'a StaticContext,
    concurrency: ConcurrencyConfig,
    limiter: Option<WorkerLimiter>,
}

impl<'a, C: NodeCursor> Compiler<'a, C> {
    /// `cursor` is only cloned, for the workers of concurrent axes.
    pub fn new(cursor: &'a C, context: &'a StaticContext) -> Self {
        Self {
            cursor,
            context,
            concurrency: ConcurrencyConfig::default(),
            limiter: None,
        }
    }

    /// Uses `config`; a limiter for its `max_workers` is created unless one
    /// was supplied with [`Compiler::with_limiter`].
    pub fn with_concurrency(mut self, config: ConcurrencyConfig) -> Self {
        if self.limiter.is_none() {
            self.limiter = config.limiter();
        }
        self.concurrency = config;
        self
    }

    pub fn with_limiter(mut self, limiter: WorkerLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Compiles a node-selecting expression.
    pub fn compile(&self, expression: &Expression) -> Result<BoxedAxis<C>, AxisError> {
        match expression {
            Expression::LocationPath(path) => self.compile_path(path, true),
            Expression::ContextItem => Ok(step_axis(AxisKind::SelfAxis)),
            Expression::Sequence(items) => {
                let operands = items
                    .iter()
                    .map(|item| self.compile(item))
                    .collect::<Result<Vec<_>, _>>()?;
                let operands = if self.concurrency.enabled
                    && self.concurrency.parallel_sequences
                    && operands.len() > 1
                {
                    debug!("Running {} sequence operands on workers", operands.len());
                    operands.into_iter().map(|axis| self.concurrent(axis)).collect()
                } else {
                    operands
                };
                Ok(sequence_axis(operands))
            }
            other => Err(AxisError::invalid_step(format!(
                "expression does not select nodes: {:?}",
                other
            ))),
        }
    }

    fn concurrent(&self, axis: BoxedAxis<C>) -> BoxedAxis<C> {
        concurrent_axis(axis, self.cursor, &self.concurrency, self.limiter.as_ref())
    }

    fn compile_path(&self, path: &LocationPath, top_level: bool) -> Result<BoxedAxis<C>, AxisError> {
        let mut composed: Option<BoxedAxis<C>> = path.is_absolute.then(document_root_axis);
        let last = path.steps.len().saturating_sub(1);

        for (index, step) in path.steps.iter().enumerate() {
            let axis = self.compile_step(step)?;
            composed = Some(match composed {
                None => axis,
                Some(context) => {
                    let context = if top_level
                        && index > 0
                        && index == last
                        && self.concurrency.enabled
                        && self.concurrency.parallel_steps
                    {
                        self.concurrent(context)
                    } else {
                        context
                    };
                    path_axis(context, axis)
                }
            });
            if index > 0 && !step.axis.is_disjoint() {
                composed = composed.map(dedup_axis);
            }
        }

        composed.ok_or_else(|| AxisError::invalid_step("relative path without steps"))
    }

    fn compile_step(&self, step: &Step) -> Result<BoxedAxis<C>, AxisError> {
        let mut filters: Vec<BoxedFilter<C>> = Vec::new();
        if let Some(test) = self.node_test(step.axis, &step.node_test) {
            filters.push(test);
        }
        for predicate in &step.predicates {
            reject_positional(predicate)?;
            filters.push(Box::new(PredicateFilter::new(self.compile_operand(predicate)?)));
        }
        Ok(filter_axis(step_axis(step.axis), filters))
    }

    /// `None` when every node the axis yields passes the test.
    fn node_test(&self, axis: AxisKind, test: &NodeTest) -> Option<BoxedFilter<C>> {
        let principal = match axis {
            AxisKind::Attribute => NodeKind::Attribute,
            AxisKind::Namespace => NodeKind::Namespace,
            _ => NodeKind::Element,
        };
        match test {
            NodeTest::Name(name) => {
                let namespace = match &name.prefix {
                    Some(prefix) => match self.context.resolve(prefix) {
                        Some(uri) => NamespaceMatch::Uri(uri.to_string()),
                        None => NamespaceMatch::LiteralPrefix(prefix.clone()),
                    },
                    None => NamespaceMatch::NoNamespace,
                };
                Some(Box::new(NameFilter::new(principal, name.local.clone(), namespace)))
            }
            NodeTest::Wildcard => Some(Box::new(NameFilter::wildcard(principal))),
            NodeTest::NodeType(NodeTypeTest::Node) => None,
            NodeTest::NodeType(kind) => Some(Box::new(KindFilter::new(*kind))),
        }
    }

    fn compile_operand(&self, expression: &Expression) -> Result<Operand<C>, AxisError> {
        Ok(match expression {
            Expression::Literal(s) => Operand::Literal(s.clone()),
            Expression::Number(n) => Operand::Number(Some(*n)),
            Expression::LocationPath(path) => Operand::Path(self.compile_path(path, false)?),
            Expression::ContextItem => Operand::Path(step_axis(AxisKind::SelfAxis)),
            Expression::Sequence(items) => Operand::Path(sequence_axis(
                items
                    .iter()
                    .map(|item| self.compile_predicate_nodes(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Expression::FunctionCall { name, args } => {
                if is_positional_function(name) {
                    return Err(positional());
                }
                let function = Builtin::from_name(name)
                    .ok_or_else(|| AxisError::invalid_step(format!("unknown function {}()", name)))?;
                if !function.accepts_arity(args.len()) {
                    return Err(AxisError::invalid_step(format!(
                        "{}() does not take {} arguments",
                        name,
                        args.len()
                    )));
                }
                Operand::Call {
                    function,
                    args: args
                        .iter()
                        .map(|arg| self.compile_operand(arg))
                        .collect::<Result<Vec<_>, _>>()?,
                }
            }
            Expression::BinaryOp { left, op, right } => Operand::binary(
                self.compile_operand(left)?,
                *op,
                self.compile_operand(right)?,
            ),
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => Operand::Negate(Box::new(self.compile_operand(expr)?)),
        })
    }

    /// Node-selecting operands inside a predicate never get workers.
    fn compile_predicate_nodes(&self, expression: &Expression) -> Result<BoxedAxis<C>, AxisError> {
        match expression {
            Expression::LocationPath(path) => self.compile_path(path, false),
            Expression::ContextItem => Ok(step_axis(AxisKind::SelfAxis)),
            Expression::Sequence(items) => Ok(sequence_axis(
                items
                    .iter()
                    .map(|item| self.compile_predicate_nodes(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            other => Err(AxisError::invalid_step(format!(
                "sequence member does not select nodes: {:?}",
                other
            ))),
        }
    }
}

fn is_positional_function(name: &str) -> bool {
    matches!(name, "position" | "last")
}

fn positional() -> AxisError {
    AxisError::invalid_step("positional predicates are not supported")
}

/// A predicate whose value is a number selects by position.
fn reject_positional(predicate: &Expression) -> Result<(), AxisError> {
    match predicate {
        Expression::Number(_) | Expression::UnaryOp { .. } => Err(positional()),
        Expression::BinaryOp { op, .. } if op.is_arithmetic() => Err(positional()),
        Expression::FunctionCall { name, .. } if is_positional_function(name) => Err(positional()),
        Expression::FunctionCall { name, .. } if name == "count" => Err(positional()),
        _ => Ok(()),
    }
}
