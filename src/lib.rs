//! strata: lazy path-axis evaluation over versioned node snapshots.
//!
//! The building blocks live in the workspace crates:
//! - `strata-types`: node keys, kinds and qualified names.
//! - `strata-cursor`: the `NodeCursor` capability and an in-memory snapshot.
//! - `strata-xpath`: axes, filters, path composition and concurrent axes.
//!
//! This crate ties them together behind [`QueryBuilder`] and [`Query`].

pub mod config;
pub mod error;
pub mod query;

pub use config::EvaluationConfig;
pub use error::QueryError;
pub use query::{Evaluation, Query, QueryBuilder};

pub use strata_cursor::{NodeCursor, Snapshot, SnapshotBuilder, SnapshotCursor};
pub use strata_types::{NodeKey, NodeKind, QName};
pub use strata_xpath::{
    AxisError, AxisKind, ConcurrencyConfig, Expression, NodeTest, NodeTypeTest, StaticContext,
    Step, WorkerLimiter,
};
