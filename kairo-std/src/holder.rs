//! Registered handler bindings.

use kairo_core::{Binding, DispatchError, Subscriber};
use std::{
    any::{Any, TypeId},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

/// Identity of a registered subscriber: the address of its `Arc`.
///
/// Two `Arc`s compare equal only if they point at the same allocation. The
/// registry keeps a clone of the `Arc` alive for as long as any holder exists,
/// so an id cannot be reused while it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(usize);

impl OwnerId {
    /// Identity of the allocation behind `owner`.
    pub fn of<S: ?Sized>(owner: &Arc<S>) -> Self {
        Self(Arc::as_ptr(owner) as *const () as usize)
    }
}

type Invocable = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<(), DispatchError> + Send + Sync>;

/// One handler bound to one owner and one event type.
///
/// Holders are immutable; the registry only ever adds or drops them.
#[derive(Clone)]
pub struct Holder {
    owner: OwnerId,
    event_type: TypeId,
    event_name: &'static str,
    label: &'static str,
    priority: i32,
    async_capable: bool,
    invocable: Invocable,
}

impl Holder {
    /// Bind a declared handler to its owner.
    pub fn bind<S: Subscriber>(owner: &Arc<S>, binding: Binding<S>) -> Self {
        let options = binding.options();
        let handler = Arc::clone(binding.handler());
        let target = Arc::clone(owner);
        Self {
            owner: OwnerId::of(owner),
            event_type: binding.event_type(),
            event_name: binding.event_name(),
            label: binding.label(),
            priority: options.priority,
            async_capable: options.parallel,
            invocable: Arc::new(move |event: &(dyn Any + Send + Sync)| handler(&*target, event)),
        }
    }

    /// Invoke the handler, converting both errors and panics into a
    /// [`DispatchError`].
    pub fn invoke(&self, event: &(dyn Any + Send + Sync)) -> Result<(), DispatchError> {
        match catch_unwind(AssertUnwindSafe(|| (self.invocable)(event))) {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Owner identity.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Routing key this holder is bound to.
    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// Name of the event type.
    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Type path of the handler.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Dispatch priority (lower runs first).
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The per-handler async capability flag.
    ///
    /// Not consulted by dispatch: only `Message::PARALLEL` on the event type
    /// decides between the caller's thread and the worker pool. Whether this
    /// flag should enable per-handler asynchronous dispatch is undecided.
    pub fn async_capable(&self) -> bool {
        self.async_capable
    }
}

impl std::fmt::Debug for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Holder")
            .field("owner", &self.owner)
            .field("event", &self.event_name)
            .field("label", &self.label)
            .field("priority", &self.priority)
            .field("async_capable", &self.async_capable)
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairo_core::{ListenerOptions, Message, Subscriptions};

    struct Ping;
    impl Message for Ping {}

    struct Fragile;

    impl Fragile {
        fn on_ping(&self, _event: &Ping) {
            panic!("fragile handler");
        }
    }

    impl Subscriber for Fragile {
        fn subscribe(subscriptions: &mut Subscriptions<Self>) {
            subscriptions.on_with(ListenerOptions::new().priority(7).parallel(true), Self::on_ping);
        }
    }

    #[test]
    fn test_owner_identity_is_per_allocation() {
        let a = Arc::new(Fragile);
        let b = Arc::new(Fragile);
        assert_eq!(OwnerId::of(&a), OwnerId::of(&a.clone()));
        assert_ne!(OwnerId::of(&a), OwnerId::of(&b));
    }

    #[test]
    fn test_holder_records_options() {
        let owner = Arc::new(Fragile);
        let binding = Fragile::bindings().remove(0);
        let holder = Holder::bind(&owner, binding);

        assert_eq!(holder.priority(), 7);
        assert!(holder.async_capable());
        assert_eq!(holder.owner(), OwnerId::of(&owner));
        assert_eq!(holder.event_type(), TypeId::of::<Ping>());
    }

    #[test]
    fn test_panic_is_converted() {
        let owner = Arc::new(Fragile);
        let holder = Holder::bind(&owner, Fragile::bindings().remove(0));

        match holder.invoke(&Ping) {
            Err(DispatchError::Panicked(msg)) => assert_eq!(msg, "fragile handler"),
            other => panic!("expected panic error, got {other:?}"),
        }
    }
}
