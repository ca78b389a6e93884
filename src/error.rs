// src/error.rs
use strata_xpath::AxisError;
use thiserror::Error;

/// Errors from building or running a query.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Axis evaluation failed: {0}")]
    Axis(#[from] AxisError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
