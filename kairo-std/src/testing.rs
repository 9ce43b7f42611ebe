//! Testing utilities for Kairo.
//!
//! - [`CallLog`]: a shared, ordered record of handler calls
//! - [`CollectingObserver`]: a failure observer that keeps every failure

use crate::observer::{Failure, FailureObserver};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Call Log
// ============================================================================

/// An ordered log shared between a test and the handlers it registers.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let audit = Arc::new(Audit { log: log.clone() });
/// bus.register(&audit);
/// bus.post(Login);
/// assert_eq!(log.entries(), vec!["audit.login"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Get a clone of the recorded entries.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Get the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clear all recorded entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Collecting Observer
// ============================================================================

/// A failure observer that records every failure as
/// `"{event_type}: {error}"`.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct CollectingObserver {
    failures: Arc<Mutex<Vec<String>>>,
}

impl CollectingObserver {
    /// Create an empty observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded failures.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Get the number of recorded failures.
    pub fn count(&self) -> usize {
        self.failures.lock().len()
    }
}

impl FailureObserver for CollectingObserver {
    fn on_failure(&self, failure: &Failure<'_>) {
        self.failures
            .lock()
            .push(format!("{}: {}", failure.event_type, failure.error));
    }
}
