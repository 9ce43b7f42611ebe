//! Failure observers.
//!
//! The dispatcher never lets a handler failure reach the poster or a sibling
//! handler. An observer is the only place those failures surface; the default
//! [`DiscardObserver`] drops them.

use crate::holder::OwnerId;
use kairo_core::DispatchError;
use std::any::Any;

/// An isolated failure, as seen by a [`FailureObserver`].
#[derive(Debug)]
pub struct Failure<'a> {
    /// Owner of the failing handler, if a handler was involved.
    pub owner: Option<OwnerId>,
    /// Type path of the failing handler, if a handler was involved.
    pub handler: Option<&'static str>,
    /// Name of the posted event type.
    pub event_type: &'static str,
    /// The posted event.
    pub event: &'a (dyn Any + Send + Sync),
    /// What went wrong.
    pub error: &'a DispatchError,
}

/// Receives failures isolated by the dispatcher.
///
/// Called on whichever thread ran the failing handler. A panicking observer is
/// contained like a panicking handler.
pub trait FailureObserver: Send + Sync + 'static {
    /// Called once per isolated failure.
    fn on_failure(&self, failure: &Failure<'_>);
}

impl<F> FailureObserver for F
where
    F: Fn(&Failure<'_>) + Send + Sync + 'static,
{
    fn on_failure(&self, failure: &Failure<'_>) {
        (self)(failure)
    }
}

/// Drops every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardObserver;

impl FailureObserver for DiscardObserver {
    fn on_failure(&self, _failure: &Failure<'_>) {}
}

/// Logs every failure at `WARN` through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl FailureObserver for LoggingObserver {
    fn on_failure(&self, failure: &Failure<'_>) {
        tracing::warn!(
            event = failure.event_type,
            handler = failure.handler.unwrap_or("<none>"),
            owner = ?failure.owner,
            error = %failure.error,
            "event handler failed"
        );
    }
}
