// src/config.rs
use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_xpath::{ConcurrencyConfig, StaticContext, WorkerLimiter};

/// Everything a query needs besides its expression.
///
/// ```json
/// {
///   "namespaces": { "p": "ns" },
///   "concurrency": { "enabled": true, "bufferSize": 16, "maxWorkers": 4 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluationConfig {
    /// Prefix bindings for name tests.
    pub namespaces: BTreeMap<String, String>,
    pub concurrency: ConcurrencyConfig,
}

impl EvaluationConfig {
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if let Some(prefix) = self
            .namespaces
            .keys()
            .find(|prefix| prefix.is_empty() || prefix.contains(':'))
        {
            return Err(QueryError::Config(format!(
                "'{}' is not a valid namespace prefix",
                prefix
            )));
        }
        match self.concurrency.max_workers {
            Some(max_workers) if max_workers > WorkerLimiter::MAX_WORKERS => {
                return Err(QueryError::Config(format!(
                    "maxWorkers {} exceeds the limit of {}",
                    max_workers,
                    WorkerLimiter::MAX_WORKERS
                )));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn static_context(&self) -> StaticContext {
        self.namespaces
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = EvaluationConfig::from_json(
            r#"{"namespaces": {"p": "ns"}, "concurrency": {"enabled": true, "bufferSize": 8}}"#,
        )
        .unwrap();
        assert_eq!(config.static_context().resolve("p"), Some("ns"));
        assert!(config.concurrency.enabled);
        assert_eq!(config.concurrency.buffer_size, 8);
        assert_eq!(config.concurrency.max_workers, None);
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        assert_eq!(
            EvaluationConfig::from_json("{}").unwrap(),
            EvaluationConfig::default()
        );
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let result = EvaluationConfig::from_json(r#"{"namespaces": {"": "ns"}}"#);
        assert!(matches!(result, Err(QueryError::Config(_))));

        let result = EvaluationConfig::from_json(r#"{"namespaces": ["p"]}"#);
        assert!(matches!(result, Err(QueryError::Json(_))));
    }

    #[test]
    fn test_oversized_worker_cap_is_rejected() {
        let result = EvaluationConfig::from_json(
            r#"{"concurrency": {"enabled": true, "maxWorkers": 18446744073709551615}}"#,
        );
        assert!(matches!(result, Err(QueryError::Config(_))));

        let at_limit = EvaluationConfig {
            concurrency: ConcurrencyConfig::enabled().with_max_workers(WorkerLimiter::MAX_WORKERS),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
