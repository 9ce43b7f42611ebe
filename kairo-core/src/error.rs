//! Error types for Kairo.
//!
//! - [`DispatchError`] - why a single handler invocation (or an asynchronous
//!   submission) did not complete
//! - [`ConfigError`] - invalid bus configuration
//!
//! Neither is ever returned from `post`: dispatch errors are isolated and, at
//! most, handed to a failure observer.

use thiserror::Error;

/// A boxed error type for handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors isolated by the dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The worker pool queue was full and the event was dropped.
    #[error("worker pool queue is full, event dropped")]
    Rejected,

    /// The worker pool no longer accepts work.
    #[error("worker pool has been shut down")]
    Shutdown,

    /// A holder was handed an event of a type it was not registered for.
    #[error("handler expected an event of type `{expected}`")]
    TypeMismatch {
        /// The event type the handler was registered for.
        expected: &'static str,
    },
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Failed(err)
    }
}

/// Errors raised while validating a bus configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The worker pool needs at least one thread.
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// Bounded queues need room for at least one task.
    #[error("bounded queue capacity must be at least 1")]
    ZeroCapacity,

    /// Worker threads need a name prefix.
    #[error("worker thread name must not be empty")]
    EmptyThreadName,
}
