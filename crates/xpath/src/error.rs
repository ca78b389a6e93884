use strata_types::NodeKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AxisError {
    #[error("Axis is exhausted: next() called after has_next() returned false")]
    ExhaustedAxis,

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Cursor integrity failure at node {key}: {message}")]
    CursorIntegrity { key: NodeKey, message: String },

    #[error("Axis evaluation was cancelled")]
    Cancelled,

    #[error("Concurrent axis worker failed: {0}")]
    WorkerFailure(String),
}

impl AxisError {
    pub fn invalid_step(message: impl Into<String>) -> Self {
        Self::InvalidStep(message.into())
    }

    pub fn integrity(key: NodeKey, message: impl Into<String>) -> Self {
        Self::CursorIntegrity {
            key,
            message: message.into(),
        }
    }
}
