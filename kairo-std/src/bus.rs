//! The event bus.
//!
//! [`EventBus`] ties the [`Registry`] to the dispatcher: `post` resolves the
//! handler snapshot for the event's exact type and runs it either on the
//! caller's thread or, for [`Message::PARALLEL`] types, as one task on the
//! shared worker pool.
//!
//! # Example
//!
//! ```rust,ignore
//! let bus = EventBus::new();
//! let audit = Arc::new(Audit::default());
//!
//! bus.register(&audit);
//! bus.post(Login { user: 7 });
//! bus.unregister(&audit);
//! ```

use crate::{
    config::{BusConfig, QueuePolicy},
    dispatch,
    holder::OwnerId,
    observer::{DiscardObserver, FailureObserver},
    pool::WorkerPool,
    registry::{HandlerList, Registry},
};
use kairo_core::{AnyMessage, ConfigError, Message, Subscriber};
use std::{
    any::{Any, TypeId},
    sync::{Arc, OnceLock},
};

struct Shared {
    registry: Registry,
    config: BusConfig,
    observer: Arc<dyn FailureObserver>,
    // Spawned on the first asynchronous post.
    pool: OnceLock<WorkerPool>,
}

/// An in-process publish/subscribe bus.
///
/// Cheap to clone; clones share registrations and the worker pool. The pool
/// is shut down when the last clone is dropped.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    /// Create a bus with the default configuration: 16 workers, unbounded
    /// queue, failures discarded.
    pub fn new() -> Self {
        Self::from_parts(BusConfig::default(), Arc::new(DiscardObserver))
    }

    /// Start building a bus with a custom configuration.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    /// Create a bus from a configuration.
    pub fn with_config(config: BusConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    fn from_parts(config: BusConfig, observer: Arc<dyn FailureObserver>) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(),
                config,
                observer,
                pool: OnceLock::new(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register every handler `subscriber` declares.
    ///
    /// Registering the same `Arc` twice registers its handlers twice.
    pub fn register<S: Subscriber>(&self, subscriber: &Arc<S>) {
        self.shared.registry.register(subscriber);
    }

    /// Remove every handler registered for `subscriber`.
    ///
    /// A subscriber that was never registered is ignored.
    pub fn unregister<S: ?Sized>(&self, subscriber: &Arc<S>) {
        self.shared.registry.unregister(OwnerId::of(subscriber));
    }

    // ------------------------------------------------------------------------
    // Posting
    // ------------------------------------------------------------------------

    /// Post an event to every handler registered for its exact type.
    ///
    /// Never fails: handler errors and panics are isolated and handed to the
    /// failure observer.
    pub fn post<E: Message>(&self, event: E) {
        let holders = self.shared.registry.lookup(TypeId::of::<E>());
        if holders.is_empty() {
            return;
        }
        let event_type = std::any::type_name::<E>();
        if E::PARALLEL {
            self.post_parallel(holders, Arc::new(event), event_type);
        } else {
            dispatch::run(&holders, &event, event_type, self.shared.observer.as_ref());
        }
    }

    /// Post a type-erased event.
    pub fn post_dyn(&self, event: Box<dyn AnyMessage>) {
        let holders = self.shared.registry.lookup(event.message_type());
        if holders.is_empty() {
            return;
        }
        let event_type = event.message_name();
        let parallel = event.is_parallel();
        let event = event.into_shared();
        if parallel {
            self.post_parallel(holders, event, event_type);
        } else {
            dispatch::run(&holders, event.as_ref(), event_type, self.shared.observer.as_ref());
        }
    }

    /// Post each event in order, independently of the others.
    pub fn post_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = Box<dyn AnyMessage>>,
    {
        for event in events {
            self.post_dyn(event);
        }
    }

    fn post_parallel(
        &self,
        holders: HandlerList,
        event: Arc<dyn Any + Send + Sync>,
        event_type: &'static str,
    ) {
        let observer = Arc::clone(&self.shared.observer);
        let task_event = Arc::clone(&event);
        let task = Box::new(move || {
            dispatch::run(&holders, task_event.as_ref(), event_type, observer.as_ref());
        });

        if let Err(error) = self.pool().submit(task) {
            tracing::trace!(event = event_type, %error, "asynchronous dispatch not submitted");
            dispatch::report_submission(
                self.shared.observer.as_ref(),
                event.as_ref(),
                event_type,
                error,
            );
        }
    }

    fn pool(&self) -> &WorkerPool {
        self.shared
            .pool
            .get_or_init(|| WorkerPool::start(&self.shared.config))
    }

    // ------------------------------------------------------------------------
    // Lifecycle & introspection
    // ------------------------------------------------------------------------

    /// Stop the worker pool.
    ///
    /// Tasks already queued still run; asynchronous posts made afterwards are
    /// dropped and reported as `DispatchError::Shutdown`. Synchronous
    /// dispatch keeps working. Every asynchronous post is either run or
    /// reported, even when racing with `shutdown`.
    ///
    /// Blocks until the workers have exited, including when another thread
    /// is already shutting the pool down. Called from a handler running on a
    /// worker, it closes the queue without waiting; the workers exit once the
    /// queue is drained.
    pub fn shutdown(&self) {
        // An unstarted pool is replaced by a stopped one so that later
        // asynchronous posts cannot start it.
        self.shared
            .pool
            .get_or_init(WorkerPool::stopped)
            .shutdown();
    }

    /// Number of handlers currently registered for `E`.
    pub fn handler_count<E: Message>(&self) -> usize {
        self.shared.registry.handler_count(TypeId::of::<E>())
    }

    /// Check if `subscriber` currently has registered handlers.
    pub fn is_registered<S: ?Sized>(&self, subscriber: &Arc<S>) -> bool {
        self.shared.registry.contains_owner(OwnerId::of(subscriber))
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &BusConfig {
        &self.shared.config
    }

    /// Number of running worker threads (0 until the first asynchronous post).
    pub fn worker_count(&self) -> usize {
        self.shared.pool.get().map_or(0, WorkerPool::size)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.shared.registry)
            .field("config", &self.shared.config)
            .field("workers", &self.worker_count())
            .finish()
    }
}

// ============================================================================
// EventBusBuilder
// ============================================================================

/// Builder for an [`EventBus`].
///
/// # Example
/// ```ignore
/// let bus = EventBus::builder()
///     .workers(4)
///     .queue(QueuePolicy::Reject { capacity: 1024 })
///     .observer(LoggingObserver)
///     .build()?;
/// ```
pub struct EventBusBuilder {
    config: BusConfig,
    observer: Arc<dyn FailureObserver>,
}

impl EventBusBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
            observer: Arc::new(DiscardObserver),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of worker threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the worker queue policy.
    pub fn queue(mut self, queue: QueuePolicy) -> Self {
        self.config.queue = queue;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Set the failure observer.
    pub fn observer<O: FailureObserver>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Validate the configuration and create the bus.
    pub fn build(self) -> Result<EventBus, ConfigError> {
        self.config.validate()?;
        Ok(EventBus::from_parts(self.config, self.observer))
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
