//! # Subscriber declaration
//!
//! A subscriber is any `Send + Sync` type that declares which events it
//! handles. Declaration is an explicit visitor: the bus hands the type a
//! [`Subscriptions`] collector and the type lists its handlers, each with
//! [`ListenerOptions`].
//!
//! # Usage Patterns
//!
//! 1. **Generated**: `#[subscriber]` on an `impl` block, `#[listener]` on methods
//! 2. **Hand-written**: `impl Subscriber for MyType`
//!
//! ```rust,ignore
//! struct Audit;
//!
//! impl Audit {
//!     fn on_login(&self, event: &Login) { /* ... */ }
//!     fn on_logout(&self, event: &Logout) -> Result<(), AuditError> { /* ... */ }
//! }
//!
//! impl Subscriber for Audit {
//!     fn subscribe(subscriptions: &mut Subscriptions<Self>) {
//!         subscriptions
//!             .on(Self::on_login)
//!             .on_with(ListenerOptions::new().priority(-10), Self::on_logout);
//!     }
//! }
//! ```

use crate::{
    error::DispatchError,
    message::Message,
    outcome::IntoOutcome,
};
use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Per-handler declaration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Priority (lower = executed first). Default is 0.
    pub priority: i32,
    /// Async capability flag. Recorded on the holder but not consulted by
    /// dispatch, which only looks at [`Message::PARALLEL`].
    pub parallel: bool,
}

impl ListenerOptions {
    /// Default options: priority 0, not async capable.
    pub const fn new() -> Self {
        Self {
            priority: 0,
            parallel: false,
        }
    }

    /// Set priority.
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the async capability flag.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Type-erased handler bound to its subscriber type.
pub type ErasedHandler<S> =
    Arc<dyn Fn(&S, &(dyn Any + Send + Sync)) -> Result<(), DispatchError> + Send + Sync>;

/// One declared handler of a subscriber type.
pub struct Binding<S> {
    event_type: TypeId,
    event_name: &'static str,
    label: &'static str,
    options: ListenerOptions,
    handler: ErasedHandler<S>,
}

impl<S> Binding<S> {
    /// Routing key of the handled event type.
    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// Name of the handled event type.
    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Type path of the handler, for diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Declared options.
    pub fn options(&self) -> ListenerOptions {
        self.options
    }

    /// The erased handler.
    pub fn handler(&self) -> &ErasedHandler<S> {
        &self.handler
    }
}

impl<S> Clone for Binding<S> {
    fn clone(&self) -> Self {
        Self {
            event_type: self.event_type,
            event_name: self.event_name,
            label: self.label,
            options: self.options,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S> std::fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("event", &self.event_name)
            .field("label", &self.label)
            .field("options", &self.options)
            .finish()
    }
}

/// Collector handed to [`Subscriber::subscribe`].
///
/// Bindings keep declaration order; the registry sorts them by priority.
pub struct Subscriptions<S> {
    bindings: Vec<Binding<S>>,
}

impl<S: Send + Sync + 'static> Subscriptions<S> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Declare a handler with default options.
    pub fn on<E, F, R>(&mut self, handler: F) -> &mut Self
    where
        E: Message,
        F: Fn(&S, &E) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.on_with(ListenerOptions::new(), handler)
    }

    /// Declare a handler with explicit options.
    pub fn on_with<E, F, R>(&mut self, options: ListenerOptions, handler: F) -> &mut Self
    where
        E: Message,
        F: Fn(&S, &E) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        let event_name = std::any::type_name::<E>();
        let erased: ErasedHandler<S> = Arc::new(move |owner: &S, event: &(dyn Any + Send + Sync)| {
            let Some(event) = event.downcast_ref::<E>() else {
                return Err(DispatchError::TypeMismatch {
                    expected: event_name,
                });
            };
            handler(owner, event)
                .into_outcome()
                .map_err(DispatchError::Failed)
        });

        self.bindings.push(Binding {
            event_type: TypeId::of::<E>(),
            event_name,
            label: std::any::type_name::<F>(),
            options,
            handler: erased,
        });
        self
    }

    /// Number of declared handlers.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Consume the collector, yielding bindings in declaration order.
    pub fn into_bindings(self) -> Vec<Binding<S>> {
        self.bindings
    }
}

impl<S: Send + Sync + 'static> Default for Subscriptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that declares event handlers.
///
/// Every call to [`subscribe`](Subscriber::subscribe) must declare the same
/// handlers; the bus calls it once per registration.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Subscriber`",
    label = "missing `Subscriber` implementation",
    note = "Use `#[subscriber]` on an `impl` block or implement `Subscriber::subscribe` by hand."
)]
pub trait Subscriber: Send + Sync + Sized + 'static {
    /// Declare this type's handlers.
    fn subscribe(subscriptions: &mut Subscriptions<Self>);

    /// Collect the declared handlers.
    fn bindings() -> Vec<Binding<Self>> {
        let mut subscriptions = Subscriptions::new();
        Self::subscribe(&mut subscriptions);
        subscriptions.into_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ping(u32);
    impl Message for Ping {}

    struct Pong;
    impl Message for Pong {}

    #[derive(Default)]
    struct Counter {
        seen: AtomicUsize,
    }

    impl Counter {
        fn on_ping(&self, event: &Ping) {
            self.seen.fetch_add(event.0 as usize, Ordering::SeqCst);
        }

        fn on_pong(&self, _event: &Pong) -> Result<(), String> {
            Err("pong refused".to_string())
        }
    }

    impl Subscriber for Counter {
        fn subscribe(subscriptions: &mut Subscriptions<Self>) {
            subscriptions
                .on(Self::on_ping)
                .on_with(ListenerOptions::new().priority(3).parallel(true), Self::on_pong);
        }
    }

    #[test]
    fn test_bindings_keep_declaration_order() {
        let bindings = Counter::bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].event_type(), TypeId::of::<Ping>());
        assert_eq!(bindings[0].options(), ListenerOptions::new());
        assert_eq!(bindings[1].event_type(), TypeId::of::<Pong>());
        assert_eq!(bindings[1].options().priority, 3);
        assert!(bindings[1].options().parallel);
        assert!(bindings[0].label().contains("on_ping"));
    }

    #[test]
    fn test_erased_handler_invokes_and_reports() {
        let counter = Counter::default();
        let bindings = Counter::bindings();

        (bindings[0].handler())(&counter, &Ping(4)).unwrap();
        assert_eq!(counter.seen.load(Ordering::SeqCst), 4);

        let err = (bindings[1].handler())(&counter, &Pong).unwrap_err();
        assert!(matches!(err, DispatchError::Failed(_)));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let counter = Counter::default();
        let bindings = Counter::bindings();

        let err = (bindings[0].handler())(&counter, &Pong).unwrap_err();
        assert!(matches!(err, DispatchError::TypeMismatch { .. }));
        assert_eq!(counter.seen.load(Ordering::SeqCst), 0);
    }
}
