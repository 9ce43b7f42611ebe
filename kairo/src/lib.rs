//! # kairo - In-Process Event Bus
//!
//! `kairo` delivers typed events to subscriber objects that declared handlers
//! for them. Handlers run in priority order, a failing handler never stops the
//! ones after it, and event types marked parallel are dispatched on a shared
//! worker pool so the poster never waits for them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kairo::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Message)]
//! struct Login { user: u64 }
//!
//! struct Audit;
//!
//! #[subscriber]
//! impl Audit {
//!     #[listener(priority = -1)]
//!     fn on_login(&self, event: &Login) {
//!         println!("user {} logged in", event.user);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let audit = Arc::new(Audit);
//! bus.register(&audit);
//! kairo::post!(bus, Login { user: 7 });
//! bus.unregister(&audit);
//! ```
//!
//! ## Without macros
//!
//! ```rust,ignore
//! impl Message for Login {}
//!
//! impl Subscriber for Audit {
//!     fn subscribe(subscriptions: &mut Subscriptions<Self>) {
//!         subscriptions.on_with(ListenerOptions::new().priority(-1), Self::on_login);
//!     }
//! }
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use kairo_core::{
    // Message
    AnyMessage,
    // Subscriber
    Binding,
    // Error types
    BoxError,
    ConfigError,
    DispatchError,
    ErasedHandler,
    // Outcome
    IntoOutcome,
    ListenerOptions,
    Message,
    Subscriber,
    Subscriptions,
};

pub use kairo_std::{
    // Bus
    EventBus,
    EventBusBuilder,
    // Configuration
    BusConfig,
    DEFAULT_THREAD_NAME,
    DEFAULT_WORKERS,
    QueuePolicy,
    // Registry
    HandlerList,
    Holder,
    OwnerId,
    Registry,
    // Observers
    DiscardObserver,
    Failure,
    FailureObserver,
    LoggingObserver,
};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use kairo_std::testing::*;
}

/// Prelude module - common imports for Kairo.
///
/// # Usage
///
/// ```rust,ignore
/// use kairo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AnyMessage, BoxError, DispatchError, EventBus, IntoOutcome, ListenerOptions, Message,
        Subscriber, Subscriptions,
    };

    #[cfg(feature = "macros")]
    pub use crate::{listener, subscriber};
}

#[cfg(feature = "macros")]
pub use kairo_macros::{Message, listener, subscriber};

/// Post one or more events, in order, on a bus.
///
/// Expands to one [`EventBus::post`] call per event. The bus expression is
/// evaluated once.
///
/// ```rust,ignore
/// kairo::post!(bus, Login { user: 7 });
/// kairo::post!(bus, Login { user: 7 }, Logout { user: 7 });
/// ```
#[macro_export]
macro_rules! post {
    ($bus:expr, $($event:expr),+ $(,)?) => {{
        let bus: &$crate::EventBus = &$bus;
        $( bus.post($event); )+
    }};
}
