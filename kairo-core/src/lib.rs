//! # kairo-core
//!
//! Core traits for the Kairo in-process event bus.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! libraries that only declare events and subscribers, without pulling in the
//! runtime from `kairo-std`.
//!
//! # Building Blocks
//!
//! ## Events ([`Message`])
//!
//! Any `Send + Sync + 'static` type. Its exact type is the routing key.
//! [`Message::PARALLEL`] marks types whose handlers should run on the bus
//! worker pool instead of the poster's thread. [`AnyMessage`] is the
//! object-safe view used to post heterogeneous batches.
//!
//! ## Subscribers ([`Subscriber`])
//!
//! Types that declare handlers through the [`Subscriptions`] visitor. Each
//! handler is a plain `fn(&self, &Event) -> R` where `R: IntoOutcome`,
//! declared with [`ListenerOptions`] (priority, async capability flag).
//!
//! # Error Types
//!
//! - [`DispatchError`] - isolated handler and submission failures
//! - [`ConfigError`] - invalid bus configuration

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod message;
mod outcome;
mod subscriber;

// Re-exports
pub use error::{BoxError, ConfigError, DispatchError};
pub use message::{AnyMessage, Message};
pub use outcome::IntoOutcome;
pub use subscriber::{Binding, ErasedHandler, ListenerOptions, Subscriber, Subscriptions};
