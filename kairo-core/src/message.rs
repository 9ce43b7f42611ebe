//! Message traits for event types.

use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// A marker trait for values that can be posted on the bus.
///
/// The exact type of a message is its routing key: a handler registered for
/// `Ping` never sees `Box<Ping>` or a wrapper around `Ping`.
///
/// # Example
///
/// ```rust,ignore
/// struct Ping;
/// impl Message for Ping {}
///
/// struct Reindex;
/// impl Message for Reindex {
///     const PARALLEL: bool = true;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Implement `Message` (or `#[derive(Message)]`) for every type posted on the bus."
)]
pub trait Message: Send + Sync + 'static {
    /// Events of this type prefer asynchronous dispatch.
    ///
    /// When `true`, `post` hands the whole handler list to the worker pool
    /// and returns without waiting.
    const PARALLEL: bool = false;
}

impl Message for () {}
impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}

/// Object-safe view of a [`Message`].
///
/// Lets callers post a heterogeneous batch of events as
/// `Box<dyn AnyMessage>`. Implemented for every `Message`.
pub trait AnyMessage: Send + Sync + 'static {
    /// The routing key of the concrete message type.
    fn message_type(&self) -> TypeId;

    /// Name of the concrete message type.
    fn message_name(&self) -> &'static str;

    /// Whether the concrete type prefers asynchronous dispatch.
    fn is_parallel(&self) -> bool;

    /// Moves the message behind a shareable, type-erased pointer.
    fn into_shared(self: Box<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<M: Message> AnyMessage for M {
    fn message_type(&self) -> TypeId {
        TypeId::of::<M>()
    }

    fn message_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }

    fn is_parallel(&self) -> bool {
        M::PARALLEL
    }

    fn into_shared(self: Box<Self>) -> Arc<dyn Any + Send + Sync> {
        Arc::new(*self)
    }
}

impl std::fmt::Debug for dyn AnyMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyMessage")
            .field("type", &self.message_name())
            .field("parallel", &self.is_parallel())
            .finish()
    }
}
