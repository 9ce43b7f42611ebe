//! # kairo-std
//!
//! Runtime for the Kairo event bus.
//!
//! This crate provides:
//! - **Registry**: [`Registry`], copy-on-write holder lists keyed by event type
//! - **Bus**: [`EventBus`], synchronous and worker-pool dispatch
//! - **Configuration**: [`BusConfig`], [`QueuePolicy`], [`EventBusBuilder`]
//! - **Observers**: [`FailureObserver`], [`DiscardObserver`], [`LoggingObserver`]
//! - **Testing**: [`testing`] helpers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use kairo_core;

// Modules
pub mod bus;
pub mod config;
mod dispatch;
pub mod holder;
pub mod observer;
mod pool;
pub mod registry;
pub mod testing;

pub use bus::{EventBus, EventBusBuilder};
pub use config::{BusConfig, DEFAULT_THREAD_NAME, DEFAULT_WORKERS, QueuePolicy};
pub use holder::{Holder, OwnerId};
pub use observer::{DiscardObserver, Failure, FailureObserver, LoggingObserver};
pub use registry::{HandlerList, Registry};
