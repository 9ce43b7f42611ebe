//! Registry of handler holders, keyed by event type.
//!
//! Readers never lock: the whole type map is published through an
//! [`ArcSwap`], and every change builds a new map whose affected lists are
//! fresh copies. A dispatch that resolved a list keeps iterating that exact
//! snapshot regardless of concurrent registration changes.
//!
//! Writers are serialized by a mutex so that two concurrent registrations
//! cannot both copy the same map and lose one another's holders.

use crate::holder::{Holder, OwnerId};
use arc_swap::ArcSwap;
use kairo_core::Subscriber;
use parking_lot::Mutex;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock},
};

/// An immutable, ordered snapshot of the holders for one event type.
pub type HandlerList = Arc<[Holder]>;

type TypeMap = HashMap<TypeId, HandlerList>;

static EMPTY: LazyLock<HandlerList> = LazyLock::new(|| Arc::from(Vec::new()));

/// Mapping from event type to its priority-ordered holders.
pub struct Registry {
    types: ArcSwap<TypeMap>,
    writer: Mutex<()>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            types: ArcSwap::from_pointee(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Register every handler `subscriber` declares.
    ///
    /// Registering the same `Arc` twice adds a second set of holders.
    /// Returns the number of holders added.
    pub fn register<S: Subscriber>(&self, subscriber: &Arc<S>) -> usize {
        let bindings = S::bindings();
        if bindings.is_empty() {
            tracing::debug!(
                subscriber = std::any::type_name::<S>(),
                "subscriber declares no handlers"
            );
            return 0;
        }

        let mut added: HashMap<TypeId, Vec<Holder>> = HashMap::new();
        for binding in bindings {
            let holder = Holder::bind(subscriber, binding);
            added.entry(holder.event_type()).or_default().push(holder);
        }
        let count = added.values().map(Vec::len).sum();

        let _guard = self.writer.lock();
        let current = self.types.load_full();
        let mut next = TypeMap::clone(&current);
        for (event_type, holders) in added {
            let mut list: Vec<Holder> = next
                .get(&event_type)
                .map(|existing| existing.to_vec())
                .unwrap_or_default();
            list.extend(holders);
            // Stable: equal priorities keep registration order.
            list.sort_by_key(Holder::priority);
            next.insert(event_type, Arc::from(list));
        }
        self.types.store(Arc::new(next));

        tracing::debug!(
            subscriber = std::any::type_name::<S>(),
            owner = ?OwnerId::of(subscriber),
            holders = count,
            "registered subscriber"
        );
        count
    }

    /// Remove every holder owned by `owner`, across all event types.
    ///
    /// Unknown owners are a no-op. Returns the number of holders removed.
    pub fn unregister(&self, owner: OwnerId) -> usize {
        let _guard = self.writer.lock();
        let current = self.types.load_full();

        let mut removed = 0;
        let mut next: Option<TypeMap> = None;
        for (event_type, list) in current.iter() {
            let before = list.len();
            let kept: Vec<Holder> = list
                .iter()
                .filter(|holder| holder.owner() != owner)
                .cloned()
                .collect();
            if kept.len() == before {
                continue;
            }
            removed += before - kept.len();
            next.get_or_insert_with(|| TypeMap::clone(&current))
                .insert(*event_type, Arc::from(kept));
        }

        if let Some(next) = next {
            self.types.store(Arc::new(next));
            tracing::debug!(?owner, holders = removed, "unregistered subscriber");
        }
        removed
    }

    /// Snapshot of the holders for `event_type`, in dispatch order.
    ///
    /// Types that were never registered yield an empty list.
    pub fn lookup(&self, event_type: TypeId) -> HandlerList {
        self.types
            .load()
            .get(&event_type)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&EMPTY))
    }

    /// Number of holders currently registered for `event_type`.
    pub fn handler_count(&self, event_type: TypeId) -> usize {
        self.types.load().get(&event_type).map_or(0, |list| list.len())
    }

    /// Number of event types that have ever been registered.
    ///
    /// Types whose holders were all unregistered still count.
    pub fn event_types(&self) -> usize {
        self.types.load().len()
    }

    /// Check if `owner` has at least one holder.
    pub fn contains_owner(&self, owner: OwnerId) -> bool {
        self.types
            .load()
            .values()
            .any(|list| list.iter().any(|holder| holder.owner() == owner))
    }

    /// Check if no holders are registered at all.
    pub fn is_empty(&self) -> bool {
        self.types.load().values().all(|list| list.is_empty())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types = self.types.load();
        f.debug_struct("Registry")
            .field("event_types", &types.len())
            .field(
                "holders",
                &types.values().map(|list| list.len()).sum::<usize>(),
            )
            .finish()
    }
}
