// src/query.rs
use crate::config::EvaluationConfig;
use crate::error::QueryError;
use log::{debug, info};
use strata_cursor::NodeCursor;
use strata_types::NodeKey;
use strata_xpath::{
    BoxedAxis, Compiler, ConcurrencyConfig, Expression, StaticContext, WorkerLimiter,
};

/// A builder for creating a [`Query`].
#[derive(Default)]
pub struct QueryBuilder {
    expression: Option<Expression>,
    config: EvaluationConfig,
    limiter: Option<WorkerLimiter>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved expression to evaluate.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.config.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Replaces the whole configuration, including earlier namespaces.
    pub fn with_config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_concurrency(mut self, concurrency: ConcurrencyConfig) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Shares `limiter` with other queries instead of creating one from
    /// `max_workers`.
    pub fn with_worker_limiter(mut self, limiter: WorkerLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn build(self) -> Result<Query, QueryError> {
        let expression = self.expression.ok_or_else(|| {
            QueryError::Config("No expression has been configured. Use `with_expression`.".to_string())
        })?;
        if !expression.is_node_sequence() {
            return Err(QueryError::Config(
                "The expression must select nodes: a path, `.` or a sequence of those.".to_string(),
            ));
        }
        self.config.validate()?;

        let limiter = self.limiter.or_else(|| self.config.concurrency.limiter());
        if self.config.concurrency.enabled {
            info!(
                "Concurrent evaluation enabled (buffer {}, max workers {:?}).",
                self.config.concurrency.effective_buffer_size(),
                limiter.as_ref().map(WorkerLimiter::capacity)
            );
        }

        Ok(Query {
            context: self.config.static_context(),
            expression,
            concurrency: self.config.concurrency,
            limiter,
        })
    }
}

/// A validated query, ready to run against any cursor.
#[derive(Debug, Clone)]
pub struct Query {
    expression: Expression,
    context: StaticContext,
    concurrency: ConcurrencyConfig,
    limiter: Option<WorkerLimiter>,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Compiles the query into an axis for `cursor`'s cursor type. The
    /// cursor is cloned for every concurrent axis in the tree.
    pub fn compile<C: NodeCursor>(&self, cursor: &C) -> Result<BoxedAxis<C>, QueryError> {
        let mut compiler = Compiler::new(cursor, &self.context);
        if let Some(limiter) = &self.limiter {
            compiler = compiler.with_limiter(limiter.clone());
        }
        let axis = compiler
            .with_concurrency(self.concurrency.clone())
            .compile(&self.expression)?;
        Ok(axis)
    }

    /// Evaluates the query with the cursor's current node as context node.
    pub fn evaluate<'c, C: NodeCursor>(&self, cursor: &'c mut C) -> Result<Evaluation<'c, C>, QueryError> {
        let start = cursor.node_key();
        self.evaluate_from(cursor, start)
    }

    pub fn evaluate_from<'c, C: NodeCursor>(
        &self,
        cursor: &'c mut C,
        start: NodeKey,
    ) -> Result<Evaluation<'c, C>, QueryError> {
        let mut axis = self.compile(cursor)?;
        debug!("Evaluating query from key {}", start);
        axis.reset(start);
        Ok(Evaluation {
            axis,
            cursor,
            failed: false,
        })
    }

    /// Runs the query from `start` and collects all keys.
    pub fn collect_keys<C: NodeCursor>(&self, cursor: &mut C, start: NodeKey) -> Result<Vec<NodeKey>, QueryError> {
        self.evaluate_from(cursor, start)?.collect()
    }
}

/// A running query. Yields keys lazily and leaves the cursor on each key as
/// it is returned. Dropping it early cancels any workers it started.
pub struct Evaluation<'c, C: NodeCursor> {
    axis: BoxedAxis<C>,
    cursor: &'c mut C,
    failed: bool,
}

impl<C: NodeCursor> Evaluation<'_, C> {
    /// The cursor, positioned on the last key returned.
    pub fn cursor(&self) -> &C {
        &*self.cursor
    }
}

impl<C: NodeCursor> Iterator for Evaluation<'_, C> {
    type Item = Result<NodeKey, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = strata_xpath::pull(&mut self.axis, &mut *self.cursor).transpose()?;
        self.failed = result.is_err();
        Some(result.map_err(QueryError::from))
    }
}
