//! Invocation of a resolved handler list.

use crate::{
    holder::{Holder, panic_message},
    observer::{Failure, FailureObserver},
};
use kairo_core::DispatchError;
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

/// Invoke every holder in order, isolating each failure.
///
/// Returns the number of holders that failed.
pub(crate) fn run(
    holders: &[Holder],
    event: &(dyn Any + Send + Sync),
    event_type: &'static str,
    observer: &dyn FailureObserver,
) -> usize {
    let mut failed = 0;
    for holder in holders {
        if let Err(error) = holder.invoke(event) {
            failed += 1;
            report(
                observer,
                &Failure {
                    owner: Some(holder.owner()),
                    handler: Some(holder.label()),
                    event_type,
                    event,
                    error: &error,
                },
            );
        }
    }
    tracing::trace!(event = event_type, handlers = holders.len(), failed, "event dispatched");
    failed
}

/// Hand a failure to the observer without letting the observer fail the caller.
pub(crate) fn report(observer: &dyn FailureObserver, failure: &Failure<'_>) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_failure(failure))) {
        tracing::error!(
            event = failure.event_type,
            panic = %panic_message(payload.as_ref()),
            "failure observer panicked"
        );
    }
}

/// Report a failure that happened before any handler ran.
pub(crate) fn report_submission(
    observer: &dyn FailureObserver,
    event: &(dyn Any + Send + Sync),
    event_type: &'static str,
    error: DispatchError,
) {
    report(
        observer,
        &Failure {
            owner: None,
            handler: None,
            event_type,
            event,
            error: &error,
        },
    );
}
