use crate::concurrent::WorkerLimiter;
use serde::{Deserialize, Serialize};

/// Controls where the compiler inserts concurrent axes and how they behave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConcurrencyConfig {
    /// Master switch. When off, no concurrent axis is ever built.
    pub enabled: bool,
    /// Capacity of the channel between a worker and its consumer.
    pub buffer_size: usize,
    /// Upper bound on simultaneously running workers per query.
    /// `None` means unbounded.
    pub max_workers: Option<usize>,
    /// Evaluate each operand of a top-level sequence on its own worker.
    pub parallel_sequences: bool,
    /// Evaluate the context-producing prefix of multi-step paths on a worker.
    pub parallel_steps: bool,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 64,
            max_workers: None,
            parallel_sequences: true,
            parallel_steps: false,
        }
    }
}

impl ConcurrencyConfig {
    /// Concurrency on, with the default layout.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn with_parallel_sequences(mut self, parallel_sequences: bool) -> Self {
        self.parallel_sequences = parallel_sequences;
        self
    }

    pub fn with_parallel_steps(mut self, parallel_steps: bool) -> Self {
        self.parallel_steps = parallel_steps;
        self
    }

    /// The channel capacity actually used; zero is raised to one.
    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }

    /// A fresh limiter for `max_workers`, if one is configured.
    pub fn limiter(&self) -> Option<WorkerLimiter> {
        self.max_workers.map(WorkerLimiter::new)
    }
}
