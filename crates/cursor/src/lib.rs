//! The read-only cursor capability that every axis in strata is written
//! against, plus an in-memory immutable snapshot implementing it.

pub mod cursor;
pub mod error;
pub mod snapshot;

pub use cursor::NodeCursor;
pub use error::SnapshotError;
pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotCursor};
