//! Bus configuration.

use kairo_core::ConfigError;

/// Default number of worker threads for asynchronous dispatch.
pub const DEFAULT_WORKERS: usize = 16;

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "kairo-worker";

/// What the worker pool does with asynchronous events while all workers are busy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum QueuePolicy {
    /// Queue without limit; `post` never waits.
    #[default]
    Unbounded,
    /// Queue up to `capacity` tasks; `post` waits for room when full.
    Block {
        /// Maximum number of queued tasks.
        capacity: usize,
    },
    /// Queue up to `capacity` tasks; events posted while full are dropped
    /// and reported to the failure observer.
    Reject {
        /// Maximum number of queued tasks.
        capacity: usize,
    },
}

impl QueuePolicy {
    /// Queue capacity, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            QueuePolicy::Unbounded => None,
            QueuePolicy::Block { capacity } | QueuePolicy::Reject { capacity } => Some(*capacity),
        }
    }
}

/// Configuration of an [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Worker threads for asynchronous dispatch.
    pub workers: usize,
    /// Worker queue policy.
    pub queue: QueuePolicy,
    /// Worker thread name prefix; threads are named `{prefix}-{index}`.
    pub thread_name: String,
}

impl BusConfig {
    /// Check that the configuration can start a worker pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.queue.capacity() == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue: QueuePolicy::Unbounded,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}
