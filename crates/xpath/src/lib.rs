//! Lazy, pull-based evaluation of XPath location paths over strata cursors.
//!
//! Every construct compiles to an [`Axis`]: concrete axes, filters, path
//! composition with duplicate elimination, sequences, and concurrent axes
//! that move evaluation onto a worker thread.

pub mod ast;
pub mod axis;
pub mod compile;
pub mod concurrent;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod path;
pub mod predicate;
pub mod union;

// Test utilities - publicly available for integration testing in downstream crates
pub mod testing;

pub use ast::{AxisKind, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
pub use axis::{Axis, BoxedAxis, Traversal, TraversalAxis, collect_keys, keys, pull};
pub use compile::Compiler;
pub use concurrent::{ConcurrentAxis, ConcurrentTraversal, WorkerLimiter};
pub use config::ConcurrencyConfig;
pub use context::StaticContext;
pub use error::AxisError;
pub use filter::{BoxedFilter, Filter};
pub use rust_decimal::Decimal;
